//! catalog-sync - Spreadsheet-to-Shopify product catalog synchronization
//!
//! This crate reads product, image and metafield CSV exports and upserts them
//! into a store through the GraphQL Admin API, pacing itself against the
//! store's cost-based rate limits.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod models;
pub mod sync;
