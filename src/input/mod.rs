//! CSV record source
//!
//! Reads the products export plus the optional images and metafields exports,
//! validates their header rows and groups every row under its product handle.
//! Any problem here is fatal and reported before a single remote call is made.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::InputError;
use crate::models::{InputRow, UpsertRecord};

/// Columns every products export must carry
pub const PRODUCT_COLUMNS: &[&str] = &["handle", "title", "description", "sku", "variant_title", "price"];

/// Columns every images export must carry
pub const IMAGE_COLUMNS: &[&str] = &["handle", "src"];

/// Columns every metafields export must carry
pub const METAFIELD_COLUMNS: &[&str] = &["handle", "namespace", "key", "type", "value"];

const HANDLE_COLUMN: &str = "handle";

/// Input file locations
#[derive(Debug, Clone, Default)]
pub struct InputFiles {
    pub products: PathBuf,
    pub images: Option<PathBuf>,
    pub metafields: Option<PathBuf>,
}

/// A data row with its 1-based line number in the source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub line: u64,
    pub handle: String,
    pub row: InputRow,
}

/// Read and group all input files
pub fn load_records(files: &InputFiles) -> Result<Vec<UpsertRecord>, InputError> {
    let products = read_rows(&files.products, PRODUCT_COLUMNS)?;
    let images = match &files.images {
        Some(path) => read_rows(path, IMAGE_COLUMNS)?,
        None => Vec::new(),
    };
    let metafields = match &files.metafields {
        Some(path) => read_rows(path, METAFIELD_COLUMNS)?,
        None => Vec::new(),
    };

    let records = group_records(products, images, metafields);
    info!(
        products = records.len(),
        variants = records.iter().map(|r| r.variants.len()).sum::<usize>(),
        "Loaded input records"
    );
    Ok(records)
}

/// Read one CSV file and check its header row
pub fn read_rows(path: &Path, required: &[&str]) -> Result<Vec<SourceRow>, InputError> {
    let file = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        file: file.clone(),
        source,
    })?;

    let rows = parse_rows(&file, &content, required)?;
    debug!(file = %file, rows = rows.len(), "Read CSV file");
    Ok(rows)
}

/// Parse CSV content
///
/// The header row may start with a byte order mark. Header names are
/// trimmed and lowercased. Fully blank lines are skipped.
pub fn parse_rows(file: &str, content: &str, required: &[&str]) -> Result<Vec<SourceRow>, InputError> {
    let csv_error = |err: csv::Error| InputError::Csv {
        file: file.to_string(),
        message: err.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_ascii_lowercase())
        .collect();

    let missing: Vec<String> = required
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(InputError::MissingColumns {
            file: file.to_string(),
            columns: missing,
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: InputRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.as_str(), value))
            .collect();

        let Some(handle) = row.get(HANDLE_COLUMN).map(str::to_string) else {
            return Err(InputError::MissingHandle {
                file: file.to_string(),
                line,
            });
        };

        rows.push(SourceRow { line, handle, row });
    }

    Ok(rows)
}

/// Group rows by handle in first-seen product order
///
/// Image and metafield rows whose handle has no product rows are dropped.
pub fn group_records(
    products: Vec<SourceRow>,
    images: Vec<SourceRow>,
    metafields: Vec<SourceRow>,
) -> Vec<UpsertRecord> {
    let mut records: Vec<UpsertRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for source in products {
        let idx = *positions.entry(source.handle.clone()).or_insert_with(|| {
            records.push(UpsertRecord::new(source.handle.clone()));
            records.len() - 1
        });
        records[idx].variants.push(source.row);
    }

    for source in images {
        match positions.get(&source.handle) {
            Some(&idx) => records[idx].images.push(source.row),
            None => warn!(handle = %source.handle, line = source.line, "Image row for unknown product ignored"),
        }
    }

    for source in metafields {
        match positions.get(&source.handle) {
            Some(&idx) => records[idx].metafields.push(source.row),
            None => warn!(handle = %source.handle, line = source.line, "Metafield row for unknown product ignored"),
        }
    }

    records
}
