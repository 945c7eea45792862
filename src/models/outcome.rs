//! Per-record outcomes and the run report

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::product::UserError;

/// Result of the inventory step for an upserted product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InventoryOutcome {
    /// No variant row carried a usable quantity
    NothingToSet,
    Applied { lines: usize },
    UserErrors { errors: Vec<UserError> },
    Failed { message: String },
}

/// Terminal state of one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Upserted {
        product_id: String,
        inventory: InventoryOutcome,
    },
    DryRunSkipped {
        variants: usize,
        images: usize,
        metafields: usize,
    },
    UserErrorReported { errors: Vec<UserError> },
    TransportFailed { message: String },
}

impl SyncOutcome {
    /// Upserted or skipped by a dry run; the inventory step is not considered
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Upserted { .. } | Self::DryRunSkipped { .. })
    }
}

/// Aggregate of one pass over the input
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub records: Vec<(String, SyncOutcome)>,
}

impl SyncReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, handle: impl Into<String>, outcome: SyncOutcome) {
        self.records.push((handle.into(), outcome));
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn outcome(&self, handle: &str) -> Option<&SyncOutcome> {
        self.records
            .iter()
            .find(|(h, _)| h == handle)
            .map(|(_, o)| o)
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn upserted(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Upserted { .. }))
    }

    pub fn dry_run_skipped(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::DryRunSkipped { .. }))
    }

    pub fn user_errors(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::UserErrorReported { .. }))
    }

    pub fn transport_failures(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::TransportFailed { .. }))
    }

    /// Upserted records whose inventory step did not complete
    pub fn inventory_problems(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                SyncOutcome::Upserted {
                    inventory: InventoryOutcome::UserErrors { .. } | InventoryOutcome::Failed { .. },
                    ..
                }
            )
        })
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }

    fn count(&self, pred: impl Fn(&SyncOutcome) -> bool) -> usize {
        self.records.iter().filter(|(_, o)| pred(o)).count()
    }
}
