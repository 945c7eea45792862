//! Domain models for catalog-sync
//!
//! Input records, remote product state, the upsert payload and per-record
//! outcomes.

pub mod outcome;
pub mod payload;
pub mod product;
pub mod record;

// Re-export commonly used types
pub use outcome::{InventoryOutcome, SyncOutcome, SyncReport};
pub use payload::{
    FileSetInput, InventoryItemInput, MetafieldInput, OptionInput, OptionValueInput,
    ProductSetInput, ProductStatus, VariantOptionValue, VariantSetInput,
};
pub use product::{
    ExistingEntityIndex, ExistingProduct, ExistingVariant, InventoryQuantity, UpsertResult,
    UpsertedProduct, UserError,
};
pub use record::{InputRow, UpsertRecord};
