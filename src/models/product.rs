//! Remote product state and mutation results

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Product as returned by a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingProduct {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub variants: Vec<ExistingVariant>,
}

/// Variant as returned by a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingVariant {
    pub id: String,
    pub sku: Option<String>,
    pub inventory_item_id: Option<String>,
}

impl ExistingVariant {
    pub fn new(id: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sku: Some(sku.into()),
            inventory_item_id: None,
        }
    }

    pub fn with_inventory_item(mut self, inventory_item_id: impl Into<String>) -> Self {
        self.inventory_item_id = Some(inventory_item_id.into());
        self
    }
}

/// SKU-keyed view of an existing product's variants
///
/// Built fresh from every lookup. SKUs are the only matching criterion;
/// variant order on either side is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingEntityIndex {
    by_sku: HashMap<String, ExistingVariant>,
}

impl ExistingEntityIndex {
    /// Index a lookup result; `None` (product not found) gives an empty index
    pub fn from_product(product: Option<&ExistingProduct>) -> Self {
        let by_sku = product
            .map(|p| {
                p.variants
                    .iter()
                    .filter_map(|v| {
                        let sku = v.sku.as_deref()?.trim();
                        (!sku.is_empty()).then(|| (sku.to_string(), v.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { by_sku }
    }

    pub fn variant_id(&self, sku: &str) -> Option<&str> {
        self.by_sku.get(sku).map(|v| v.id.as_str())
    }

    pub fn inventory_item_id(&self, sku: &str) -> Option<&str> {
        self.by_sku
            .get(sku)
            .and_then(|v| v.inventory_item_id.as_deref())
    }

    pub fn len(&self) -> usize {
        self.by_sku.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sku.is_empty()
    }
}

/// Store-side validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    /// Path to the offending input field, if any
    #[serde(default)]
    pub field: Option<Vec<String>>,

    pub message: String,

    #[serde(default)]
    pub code: Option<String>,
}

impl UserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_field(mut self, path: &[&str]) -> Self {
        self.field = Some(path.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Dotted field path, e.g. `input.variants.0.price`
    pub fn field_path(&self) -> String {
        self.field
            .as_ref()
            .map(|f| f.join("."))
            .unwrap_or_default()
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(_) => write!(f, "{}: {}", self.field_path(), self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Product identity returned by an upsert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertedProduct {
    pub id: String,
    pub handle: String,
}

/// Result of an upsert call that reached the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertResult {
    pub product: Option<UpsertedProduct>,
    pub user_errors: Vec<UserError>,
}

/// Absolute quantity for one inventory item at one location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuantity {
    pub inventory_item_id: String,
    pub location_id: String,
    pub quantity: i64,
}
