//! Upsert payload sent with `productSet`

use serde::Serialize;
use std::fmt;

/// Publication status of a product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Active,
    Draft,
    Archived,
}

impl ProductStatus {
    /// Case-insensitive parse; `None` for unknown values
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "draft" => Some(Self::Draft),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Draft => write!(f, "DRAFT"),
            Self::Archived => write!(f, "ARCHIVED"),
        }
    }
}

/// `ProductSetInput`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSetInput {
    pub handle: String,
    pub title: String,
    pub description_html: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    pub status: ProductStatus,

    pub product_options: Vec<OptionInput>,

    pub variants: Vec<VariantSetInput>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileSetInput>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metafields: Vec<MetafieldInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionInput {
    pub name: String,
    pub values: Vec<OptionValueInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionValueInput {
    pub name: String,
}

/// Variant entry; `id` is present only for variants already in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSetInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub sku: String,

    pub price: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,

    pub option_values: Vec<VariantOptionValue>,

    pub inventory_item: InventoryItemInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantOptionValue {
    pub option_name: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InventoryItemInput {
    pub tracked: bool,
}

/// Image attached to the product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSetInput {
    pub original_source: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    pub content_type: &'static str,
}

impl FileSetInput {
    pub fn image(src: impl Into<String>, alt: Option<String>) -> Self {
        Self {
            original_source: src.into(),
            alt,
            content_type: "IMAGE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetafieldInput {
    pub namespace: String,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}
