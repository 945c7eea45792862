//! Per-record sync state machine
//!
//! Each record moves through lookup, payload building and upsert, then the
//! inventory step. Records are processed strictly one after another in input
//! order and every failure is recorded against its record; nothing escalates
//! out of [`CatalogSync::run`].

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::catalog::CatalogGateway;
use crate::models::{
    ExistingEntityIndex, InventoryOutcome, SyncOutcome, SyncReport, UpsertRecord, UserError,
};

use super::payload::{build_product_input, quantity_lines};

/// Run options
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Build payloads but perform no writes
    pub dry_run: bool,
    /// Location receiving inventory quantities, as a global id
    pub location_id: String,
    /// Process only the first N records
    pub limit: Option<usize>,
}

/// Drives records through the catalog gateway
pub struct CatalogSync {
    gateway: Arc<dyn CatalogGateway>,
    options: SyncOptions,
}

impl CatalogSync {
    pub fn new(gateway: Arc<dyn CatalogGateway>, options: SyncOptions) -> Self {
        Self { gateway, options }
    }

    /// Process records in order and fold the outcomes into a report
    pub async fn run(&self, records: &[UpsertRecord]) -> SyncReport {
        let mut report = SyncReport::start();
        let take = self.options.limit.unwrap_or(records.len());

        info!(
            records = records.len(),
            processing = take.min(records.len()),
            dry_run = self.options.dry_run,
            "Starting catalog sync"
        );

        for record in records.iter().take(take) {
            let outcome = self.sync_record(record).await;
            report.record(record.handle.clone(), outcome);
        }

        report.finish();

        info!(
            total = report.total(),
            upserted = report.upserted(),
            dry_run_skipped = report.dry_run_skipped(),
            user_errors = report.user_errors(),
            transport_failures = report.transport_failures(),
            inventory_problems = report.inventory_problems(),
            duration_ms = report.duration_ms().unwrap_or_default(),
            "Catalog sync finished"
        );

        report
    }

    /// Sync one record to its terminal outcome
    pub async fn sync_record(&self, record: &UpsertRecord) -> SyncOutcome {
        let handle = record.handle.as_str();

        let existing = match self.gateway.find_product(handle).await {
            Ok(existing) => existing,
            Err(e) => {
                error!(handle, error = %e, "Product lookup failed");
                return SyncOutcome::TransportFailed {
                    message: e.to_string(),
                };
            }
        };

        let index = ExistingEntityIndex::from_product(existing.as_ref());
        debug!(
            handle,
            exists = existing.is_some(),
            known_skus = index.len(),
            "Resolved existing product"
        );

        let input = build_product_input(record, &index);

        if self.options.dry_run {
            info!(
                handle,
                variants = input.variants.len(),
                images = input.files.len(),
                metafields = input.metafields.len(),
                "Dry run, skipping upsert"
            );
            return SyncOutcome::DryRunSkipped {
                variants: input.variants.len(),
                images: input.files.len(),
                metafields: input.metafields.len(),
            };
        }

        let result = match self.gateway.upsert_product(handle, &input).await {
            Ok(result) => result,
            Err(e) => {
                error!(handle, error = %e, "Product upsert failed");
                return SyncOutcome::TransportFailed {
                    message: e.to_string(),
                };
            }
        };

        if !result.user_errors.is_empty() {
            log_user_errors(handle, "Product rejected", &result.user_errors);
            return SyncOutcome::UserErrorReported {
                errors: result.user_errors,
            };
        }

        let Some(product) = result.product else {
            error!(handle, "Upsert returned neither a product nor user errors");
            return SyncOutcome::TransportFailed {
                message: "productSet returned no product".to_string(),
            };
        };

        info!(
            handle,
            product_id = %product.id,
            created = existing.is_none(),
            variants = input.variants.len(),
            "Product upserted"
        );

        let inventory = self.sync_inventory(record).await;

        SyncOutcome::Upserted {
            product_id: product.id,
            inventory,
        }
    }

    async fn sync_inventory(&self, record: &UpsertRecord) -> InventoryOutcome {
        let handle = record.handle.as_str();

        if !record.variants.iter().any(|row| row.get("quantity").is_some()) {
            debug!(handle, "No quantities to set");
            return InventoryOutcome::NothingToSet;
        }

        // New variants only get inventory items once the upsert has run
        let product = match self.gateway.find_product(handle).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                warn!(handle, "Product not found after upsert");
                return InventoryOutcome::Failed {
                    message: "product not found after upsert".to_string(),
                };
            }
            Err(e) => {
                warn!(handle, error = %e, "Re-fetch before inventory update failed");
                return InventoryOutcome::Failed {
                    message: e.to_string(),
                };
            }
        };

        let index = ExistingEntityIndex::from_product(Some(&product));
        let lines = quantity_lines(record, &index, &self.options.location_id);

        if lines.is_empty() {
            debug!(handle, "No resolvable inventory lines");
            return InventoryOutcome::NothingToSet;
        }

        match self.gateway.set_inventory(&lines).await {
            Ok(errors) if errors.is_empty() => {
                info!(handle, lines = lines.len(), "Inventory quantities set");
                InventoryOutcome::Applied { lines: lines.len() }
            }
            Ok(errors) => {
                log_user_errors(handle, "Inventory update rejected", &errors);
                InventoryOutcome::UserErrors { errors }
            }
            Err(e) => {
                warn!(handle, error = %e, "Inventory update failed");
                InventoryOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}

fn log_user_errors(handle: &str, message: &str, errors: &[UserError]) {
    for err in errors {
        warn!(
            handle,
            field = %err.field_path(),
            code = err.code.as_deref().unwrap_or(""),
            "{}: {}",
            message,
            err.message
        );
    }
}
