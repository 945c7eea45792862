//! Catalog synchronization
//!
//! # Components
//!
//! - [`payload`]: input rows → `productSet` payload and inventory lines
//! - [`orchestrator`]: per-record state machine folding outcomes into a report
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use catalog_sync::sync::{CatalogSync, SyncOptions};
//!
//! let sync = CatalogSync::new(Arc::new(gateway), SyncOptions {
//!     dry_run: false,
//!     location_id: settings.location_id.clone(),
//!     limit: None,
//! });
//! let report = sync.run(&records).await;
//! ```

pub mod orchestrator;
pub mod payload;

pub use orchestrator::{CatalogSync, SyncOptions};
pub use payload::{build_product_input, quantity_lines};
