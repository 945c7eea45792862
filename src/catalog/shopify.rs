//! Shopify Admin API implementation of [`CatalogGateway`]

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::api::{GraphqlRequest, RateLimitedExecutor, Transport};
use crate::error::SyncError;
use crate::models::{
    ExistingProduct, ExistingVariant, InventoryQuantity, ProductSetInput, UpsertResult,
    UpsertedProduct, UserError,
};

use super::queries::{
    FIND_PRODUCT, INVENTORY_QUANTITY_NAME, INVENTORY_REASON, INVENTORY_SET_QUANTITIES,
    PRODUCT_SET, PRODUCT_VARIANTS,
};
use super::traits::CatalogGateway;

/// Gateway issuing every call through a [`RateLimitedExecutor`]
pub struct ShopifyGateway<T> {
    executor: RateLimitedExecutor<T>,
}

impl<T: Transport> ShopifyGateway<T> {
    pub fn new(executor: RateLimitedExecutor<T>) -> Self {
        Self { executor }
    }

    /// Execute a document and decode its `data` object
    ///
    /// Top-level errors only fail the call when no data came back; with
    /// partial data they are logged and the data is used.
    async fn call<D: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: Value,
    ) -> Result<D, SyncError> {
        let response = self
            .executor
            .execute(&GraphqlRequest::new(query, variables))
            .await?;

        let errors = (!response.errors.is_empty()).then(|| response.error_summary());

        let data = match (response.data, errors) {
            (Some(data), errors) if !data.is_null() => {
                if let Some(errors) = errors {
                    warn!(operation, errors = %errors, "GraphQL errors alongside data");
                }
                data
            }
            (_, Some(errors)) => {
                warn!(operation, errors = %errors, "GraphQL errors");
                return Err(SyncError::GraphQl(errors));
            }
            (_, None) => {
                return Err(SyncError::InvalidData(format!(
                    "{} response has no data",
                    operation
                )))
            }
        };

        serde_json::from_value(data).map_err(|e| {
            SyncError::InvalidData(format!("Failed to decode {} response: {}", operation, e))
        })
    }
}

#[async_trait]
impl<T: Transport> CatalogGateway for ShopifyGateway<T> {
    async fn find_product(&self, handle: &str) -> Result<Option<ExistingProduct>, SyncError> {
        let data: FindProductData = self
            .call(
                "productByIdentifier",
                FIND_PRODUCT,
                json!({ "identifier": { "handle": handle } }),
            )
            .await?;

        let Some(node) = data.product_by_identifier else {
            debug!(handle, found = false, "Looked up product");
            return Ok(None);
        };

        // Every variant id is needed, otherwise unmatched SKUs get recreated
        let (mut variants, mut page) = node.variants.into_parts();
        while page.has_next_page {
            let Some(cursor) = page.end_cursor.take() else {
                warn!(
                    handle,
                    loaded = variants.len(),
                    "Variant page has no cursor, remaining variants not loaded"
                );
                break;
            };

            let data: ProductVariantsData = self
                .call(
                    "productVariants",
                    PRODUCT_VARIANTS,
                    json!({ "id": node.id, "after": cursor }),
                )
                .await?;

            let Some(next) = data.product else {
                warn!(handle, "Product disappeared while paging variants");
                break;
            };
            let (more, next_page) = next.variants.into_parts();
            variants.extend(more);
            page = next_page;
        }

        debug!(handle, found = true, variants = variants.len(), "Looked up product");
        Ok(Some(ExistingProduct {
            id: node.id,
            handle: node.handle,
            title: node.title,
            variants,
        }))
    }

    async fn upsert_product(
        &self,
        handle: &str,
        input: &ProductSetInput,
    ) -> Result<UpsertResult, SyncError> {
        let data: ProductSetData = self
            .call(
                "productSet",
                PRODUCT_SET,
                json!({ "identifier": { "handle": handle }, "input": input }),
            )
            .await?;

        let payload = data
            .product_set
            .ok_or_else(|| SyncError::InvalidData("productSet returned no payload".into()))?;

        debug!(
            handle,
            product_id = payload.product.as_ref().map(|p| p.id.as_str()),
            user_errors = payload.user_errors.len(),
            "productSet completed"
        );

        Ok(UpsertResult {
            product: payload.product,
            user_errors: payload.user_errors,
        })
    }

    async fn set_inventory(
        &self,
        quantities: &[InventoryQuantity],
    ) -> Result<Vec<UserError>, SyncError> {
        let data: InventorySetData = self
            .call(
                "inventorySetQuantities",
                INVENTORY_SET_QUANTITIES,
                json!({
                    "input": {
                        "name": INVENTORY_QUANTITY_NAME,
                        "reason": INVENTORY_REASON,
                        "ignoreCompareQuantity": true,
                        "quantities": quantities,
                    }
                }),
            )
            .await?;

        let payload = data.inventory_set_quantities.ok_or_else(|| {
            SyncError::InvalidData("inventorySetQuantities returned no payload".into())
        })?;

        debug!(
            lines = quantities.len(),
            user_errors = payload.user_errors.len(),
            "inventorySetQuantities completed"
        );
        Ok(payload.user_errors)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindProductData {
    product_by_identifier: Option<ProductNode>,
}

#[derive(Debug, Deserialize)]
struct ProductNode {
    id: String,
    handle: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    variants: VariantConnection,
}

#[derive(Debug, Deserialize)]
struct ProductVariantsData {
    product: Option<ProductVariantsNode>,
}

#[derive(Debug, Deserialize)]
struct ProductVariantsNode {
    #[serde(default)]
    variants: VariantConnection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantConnection {
    #[serde(default)]
    nodes: Vec<VariantNode>,
    #[serde(default)]
    page_info: PageInfo,
}

impl VariantConnection {
    fn into_parts(self) -> (Vec<ExistingVariant>, PageInfo) {
        let variants = self
            .nodes
            .into_iter()
            .map(|v| ExistingVariant {
                id: v.id,
                sku: v.sku,
                inventory_item_id: v.inventory_item.map(|item| item.id),
            })
            .collect();
        (variants, self.page_info)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
    #[serde(default)]
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantNode {
    id: String,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    inventory_item: Option<IdNode>,
}

#[derive(Debug, Deserialize)]
struct IdNode {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductSetData {
    product_set: Option<ProductSetPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductSetPayload {
    #[serde(default)]
    product: Option<UpsertedProduct>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventorySetData {
    inventory_set_quantities: Option<InventorySetPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventorySetPayload {
    #[serde(default)]
    user_errors: Vec<UserError>,
}
