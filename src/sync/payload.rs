//! Mapping from grouped input rows to the upsert payload and inventory lines
//!
//! Variant identity is carried by SKU alone: a variant gets its existing id
//! only when the [`ExistingEntityIndex`] knows its SKU. Row position never
//! matters.

use tracing::warn;

use crate::models::{
    ExistingEntityIndex, FileSetInput, InputRow, InventoryItemInput, InventoryQuantity,
    MetafieldInput, OptionInput, OptionValueInput, ProductSetInput, ProductStatus, UpsertRecord,
    VariantOptionValue, VariantSetInput,
};

/// Option name used when the input defines no options
pub const DEFAULT_OPTION_NAME: &str = "Title";

/// Value used for the default option when a row has no variant title
pub const DEFAULT_OPTION_VALUE: &str = "Default Title";

const MAX_OPTIONS: usize = 3;

/// Build the `productSet` input for one record
pub fn build_product_input(record: &UpsertRecord, index: &ExistingEntityIndex) -> ProductSetInput {
    let empty = InputRow::new();
    let primary = record.primary_row().unwrap_or(&empty);

    let option_names = option_names(primary);
    let variant_rows: Vec<&InputRow> = record
        .variants
        .iter()
        .filter(|row| {
            let has_sku = row.get("sku").is_some();
            if !has_sku {
                warn!(handle = %record.handle, "Skipping variant row without SKU");
            }
            has_sku
        })
        .collect();

    let variants: Vec<VariantSetInput> = variant_rows
        .iter()
        .map(|row| build_variant(&record.handle, row, &option_names, index))
        .collect();

    ProductSetInput {
        handle: record.handle.clone(),
        title: primary.get_or_empty("title").to_string(),
        description_html: primary.get_or_empty("description").to_string(),
        vendor: primary.get("vendor").map(str::to_string),
        product_type: primary.get("product_type").map(str::to_string),
        tags: parse_tags(primary.get_or_empty("tags")),
        status: parse_status(&record.handle, primary.get("status")),
        product_options: collect_options(&option_names, &variants),
        variants,
        files: record
            .images
            .iter()
            .filter_map(|row| {
                let src = row.get("src")?;
                Some(FileSetInput::image(src, row.get("alt").map(str::to_string)))
            })
            .collect(),
        metafields: record
            .metafields
            .iter()
            .filter_map(|row| build_metafield(&record.handle, row))
            .collect(),
    }
}

/// Absolute quantity lines for every variant row with a usable quantity
///
/// `index` must describe the product as it exists after the upsert.
/// Rows with an unparseable quantity or a SKU the store does not know
/// are skipped.
pub fn quantity_lines(
    record: &UpsertRecord,
    index: &ExistingEntityIndex,
    location_id: &str,
) -> Vec<InventoryQuantity> {
    record
        .variants
        .iter()
        .filter_map(|row| {
            let sku = row.get("sku")?;
            let raw = row.get("quantity")?;

            let quantity = match raw.parse::<i64>() {
                Ok(q) => q,
                Err(_) => {
                    warn!(handle = %record.handle, sku, quantity = raw, "Ignoring non-integer quantity");
                    return None;
                }
            };

            let Some(inventory_item_id) = index.inventory_item_id(sku) else {
                warn!(handle = %record.handle, sku, "No inventory item for SKU, skipping quantity");
                return None;
            };

            Some(InventoryQuantity {
                inventory_item_id: inventory_item_id.to_string(),
                location_id: location_id.to_string(),
                quantity,
            })
        })
        .collect()
}

fn option_names(primary: &InputRow) -> Vec<(usize, String)> {
    (1..=MAX_OPTIONS)
        .filter_map(|n| {
            primary
                .get(&format!("option{}_name", n))
                .map(|name| (n, name.to_string()))
        })
        .collect()
}

fn build_variant(
    handle: &str,
    row: &InputRow,
    option_names: &[(usize, String)],
    index: &ExistingEntityIndex,
) -> VariantSetInput {
    let sku = row.get_or_empty("sku");

    let option_values = if option_names.is_empty() {
        vec![VariantOptionValue {
            option_name: DEFAULT_OPTION_NAME.to_string(),
            name: row
                .get("variant_title")
                .unwrap_or(DEFAULT_OPTION_VALUE)
                .to_string(),
        }]
    } else {
        option_names
            .iter()
            .filter_map(|(n, name)| {
                let value = row.get(&format!("option{}_value", n));
                if value.is_none() {
                    warn!(handle, sku, option = %name, "Variant has no value for option");
                }
                value.map(|v| VariantOptionValue {
                    option_name: name.clone(),
                    name: v.to_string(),
                })
            })
            .collect()
    };

    VariantSetInput {
        id: index.variant_id(sku).map(str::to_string),
        sku: sku.to_string(),
        price: row.get_or_empty("price").to_string(),
        compare_at_price: row.get("compare_at_price").map(str::to_string),
        barcode: row.get("barcode").map(str::to_string),
        option_values,
        inventory_item: InventoryItemInput { tracked: true },
    }
}

/// One option per name, values deduplicated in first-seen order
fn collect_options(
    option_names: &[(usize, String)],
    variants: &[VariantSetInput],
) -> Vec<OptionInput> {
    let names: Vec<String> = if option_names.is_empty() {
        vec![DEFAULT_OPTION_NAME.to_string()]
    } else {
        option_names.iter().map(|(_, name)| name.clone()).collect()
    };

    names
        .into_iter()
        .map(|name| {
            let mut values: Vec<OptionValueInput> = Vec::new();
            for value in variants
                .iter()
                .flat_map(|v| &v.option_values)
                .filter(|ov| ov.option_name == name)
            {
                if !values.iter().any(|existing| existing.name == value.name) {
                    values.push(OptionValueInput {
                        name: value.name.clone(),
                    });
                }
            }
            OptionInput { name, values }
        })
        .collect()
}

fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_status(handle: &str, raw: Option<&str>) -> ProductStatus {
    match raw {
        None => ProductStatus::default(),
        Some(value) => ProductStatus::parse(value).unwrap_or_else(|| {
            warn!(handle, status = value, "Unknown status, using ACTIVE");
            ProductStatus::default()
        }),
    }
}

fn build_metafield(handle: &str, row: &InputRow) -> Option<MetafieldInput> {
    match (
        row.get("namespace"),
        row.get("key"),
        row.get("type"),
        row.get("value"),
    ) {
        (Some(namespace), Some(key), Some(kind), Some(value)) => Some(MetafieldInput {
            namespace: namespace.to_string(),
            key: key.to_string(),
            kind: kind.to_string(),
            value: value.to_string(),
        }),
        _ => {
            warn!(handle, "Skipping incomplete metafield row");
            None
        }
    }
}
