//! GraphQL documents for the catalog operations

/// Product with its variants, by handle
pub const FIND_PRODUCT: &str = r#"
query FindProduct($identifier: ProductIdentifierInput!) {
  productByIdentifier(identifier: $identifier) {
    id
    handle
    title
    variants(first: 250) {
      nodes {
        id
        sku
        inventoryItem {
          id
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

/// Following page of a product's variants
pub const PRODUCT_VARIANTS: &str = r#"
query ProductVariants($id: ID!, $after: String) {
  product(id: $id) {
    variants(first: 250, after: $after) {
      nodes {
        id
        sku
        inventoryItem {
          id
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

/// Synchronous create-or-update keyed by handle
pub const PRODUCT_SET: &str = r#"
mutation ProductSet($identifier: ProductSetIdentifiers, $input: ProductSetInput!) {
  productSet(identifier: $identifier, input: $input, synchronous: true) {
    product {
      id
      handle
    }
    userErrors {
      field
      message
      code
    }
  }
}
"#;

/// Absolute available quantities
pub const INVENTORY_SET_QUANTITIES: &str = r#"
mutation InventorySetQuantities($input: InventorySetQuantitiesInput!) {
  inventorySetQuantities(input: $input) {
    inventoryAdjustmentGroup {
      reason
    }
    userErrors {
      field
      message
      code
    }
  }
}
"#;

/// Quantity name written by `inventorySetQuantities`
pub const INVENTORY_QUANTITY_NAME: &str = "available";

/// Adjustment reason recorded with every quantity change
pub const INVENTORY_REASON: &str = "correction";
