//! Input records grouped by product handle

use std::collections::HashMap;

/// One spreadsheet row as a flat `column → value` mapping
///
/// Blank cells are indistinguishable from absent columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRow {
    fields: HashMap<String, String>,
}

impl InputRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly for tests
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Trimmed value, `None` when absent or blank
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Trimmed value, or the empty string
    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InputRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// All rows sharing one product handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertRecord {
    pub handle: String,
    /// Variant rows in input order; the first also carries product fields
    pub variants: Vec<InputRow>,
    pub images: Vec<InputRow>,
    pub metafields: Vec<InputRow>,
}

impl UpsertRecord {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            variants: Vec::new(),
            images: Vec::new(),
            metafields: Vec::new(),
        }
    }

    /// Row providing the product-level fields
    pub fn primary_row(&self) -> Option<&InputRow> {
        self.variants.first()
    }
}
