//! Remote catalog access
//!
//! - [`traits`]: the `CatalogGateway` trait used by the orchestrator
//! - [`shopify`]: GraphQL Admin API implementation over the rate-limited executor
//! - [`queries`]: the GraphQL documents

pub mod queries;
pub mod shopify;
pub mod traits;

pub use shopify::ShopifyGateway;
pub use traits::CatalogGateway;

#[cfg(test)]
pub use traits::MockCatalogGateway;
