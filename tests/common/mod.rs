//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use wiremock::MockServer;

use catalog_sync::api::{HttpTransport, RateLimitedExecutor};
use catalog_sync::catalog::{CatalogGateway, ShopifyGateway};
use catalog_sync::config::{RetryConfig, ThrottleConfig};
use catalog_sync::error::SyncError;
use catalog_sync::models::{
    ExistingProduct, ExistingVariant, InventoryQuantity, ProductSetInput, UpsertResult,
    UpsertedProduct, UserError,
};
use catalog_sync::sync::SyncOptions;

pub const GRAPHQL_PATH: &str = "/admin/api/2024-07/graphql.json";
pub const LOCATION: &str = "gid://shopify/Location/1";

/// Write CSV content to a temporary file
pub fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Sync options writing to the test location
pub fn test_options() -> SyncOptions {
    SyncOptions {
        dry_run: false,
        location_id: LOCATION.to_string(),
        limit: None,
    }
}

/// Gateway against a wiremock server with millisecond backoff
pub fn create_test_gateway(server: &MockServer) -> ShopifyGateway<HttpTransport> {
    let transport = HttpTransport::with_client(
        reqwest::Client::new(),
        format!("{}{}", server.uri(), GRAPHQL_PATH),
        "shpat_test",
    );
    let retry = RetryConfig {
        max_retries: 3,
        initial_backoff_ms: 5,
    };
    ShopifyGateway::new(RateLimitedExecutor::new(
        transport,
        retry,
        ThrottleConfig::default(),
    ))
}

#[derive(Default)]
struct FakeState {
    products: HashMap<String, ExistingProduct>,
    next_id: u64,
    upserts: Vec<ProductSetInput>,
    inventory: Vec<Vec<InventoryQuantity>>,
}

impl FakeState {
    fn next(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("gid://shopify/{}/{}", kind, self.next_id)
    }
}

/// In-memory store with `productSet` list semantics
///
/// A variant without an id is created with fresh variant and inventory item
/// ids; a variant with an id must already exist. Variants missing from the
/// input are removed.
#[derive(Default)]
pub struct FakeCatalog {
    state: Mutex<FakeState>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product(&self, handle: &str) -> Option<ExistingProduct> {
        self.state.lock().unwrap().products.get(handle).cloned()
    }

    /// Every `productSet` input received, in call order
    pub fn upserts(&self) -> Vec<ProductSetInput> {
        self.state.lock().unwrap().upserts.clone()
    }

    /// Every inventory batch received, in call order
    pub fn inventory_calls(&self) -> Vec<Vec<InventoryQuantity>> {
        self.state.lock().unwrap().inventory.clone()
    }
}

#[async_trait]
impl CatalogGateway for FakeCatalog {
    async fn find_product(&self, handle: &str) -> Result<Option<ExistingProduct>, SyncError> {
        Ok(self.product(handle))
    }

    async fn upsert_product(
        &self,
        handle: &str,
        input: &ProductSetInput,
    ) -> Result<UpsertResult, SyncError> {
        let mut state = self.state.lock().unwrap();
        state.upserts.push(input.clone());

        let existing = state.products.get(handle).cloned();
        let mut variants = Vec::new();

        for (i, variant) in input.variants.iter().enumerate() {
            match &variant.id {
                Some(id) => {
                    let known = existing
                        .as_ref()
                        .and_then(|p| p.variants.iter().find(|v| &v.id == id).cloned());
                    match known {
                        Some(mut v) => {
                            v.sku = Some(variant.sku.clone());
                            variants.push(v);
                        }
                        None => {
                            let index = i.to_string();
                            return Ok(UpsertResult {
                                product: None,
                                user_errors: vec![UserError::new("Variant does not exist")
                                    .with_field(&["input", "variants", index.as_str(), "id"])],
                            });
                        }
                    }
                }
                None => {
                    let id = state.next("ProductVariant");
                    let item = state.next("InventoryItem");
                    variants.push(
                        ExistingVariant::new(id, variant.sku.clone()).with_inventory_item(item),
                    );
                }
            }
        }

        let product_id = match &existing {
            Some(p) => p.id.clone(),
            None => state.next("Product"),
        };

        state.products.insert(
            handle.to_string(),
            ExistingProduct {
                id: product_id.clone(),
                handle: handle.to_string(),
                title: input.title.clone(),
                variants,
            },
        );

        Ok(UpsertResult {
            product: Some(UpsertedProduct {
                id: product_id,
                handle: handle.to_string(),
            }),
            user_errors: vec![],
        })
    }

    async fn set_inventory(
        &self,
        quantities: &[InventoryQuantity],
    ) -> Result<Vec<UserError>, SyncError> {
        self.state
            .lock()
            .unwrap()
            .inventory
            .push(quantities.to_vec());
        Ok(vec![])
    }
}
