//! Remote catalog gateway trait definition
//!
//! The orchestrator talks to the store only through this trait, which keeps
//! the per-record state machine testable without a network.

use async_trait::async_trait;

use crate::error::SyncError;
use crate::models::{ExistingProduct, InventoryQuantity, ProductSetInput, UpsertResult, UserError};

/// Lookup, upsert and inventory operations against the store
///
/// Implementations return transport-level problems as `Err(SyncError)`;
/// store-side validation failures come back as data (`UserError`).
///
/// # Example
///
/// ```ignore
/// use catalog_sync::catalog::CatalogGateway;
///
/// async fn exists(gateway: &dyn CatalogGateway, handle: &str) -> bool {
///     matches!(gateway.find_product(handle).await, Ok(Some(_)))
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Look up a product and its variants by handle
    ///
    /// An unknown handle is `Ok(None)`, never an error.
    async fn find_product(&self, handle: &str) -> Result<Option<ExistingProduct>, SyncError>;

    /// Create or update the product identified by `handle`
    async fn upsert_product(
        &self,
        handle: &str,
        input: &ProductSetInput,
    ) -> Result<UpsertResult, SyncError>;

    /// Set absolute available quantities in one batched call
    async fn set_inventory(
        &self,
        quantities: &[InventoryQuantity],
    ) -> Result<Vec<UserError>, SyncError>;
}
