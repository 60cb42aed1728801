//! CSV ingestion: raw text → [`Dataset`].
//!
//! ```text
//! bytes ──decode──▶ text ──parse──▶ headers + rows ──map──▶ records
//!        (BOM/enc)        (`;` or `,`)          (aliases + normalizer)
//! ```
//!
//! Failures are terminal for the attempt; nothing partial is returned.

pub mod fetch;

use std::collections::{BTreeMap, HashMap};

use crate::error::{IngestError, IngestResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{CsvInfo, Dataset, Record};
use crate::parser::{decode_bytes, parse_str_auto, ParseResult};
use crate::schema::{header_key, Schema};

pub use fetch::{fetch, load, Fetched, Source};

/// Canonical field → index of the source column it reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: Vec<(String, Option<usize>)>,
}

impl ColumnMapping {
    /// Resolve every schema field against the observed headers.
    ///
    /// Each field tries its aliases in order; the first header whose key
    /// matches wins. Unresolved required fields are reported together.
    pub fn resolve(headers: &[String], schema: &Schema) -> IngestResult<Self> {
        let mut lookup: HashMap<String, usize> = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            lookup.entry(header_key(header)).or_insert(i);
        }

        let mut columns = Vec::with_capacity(schema.fields.len());
        let mut missing = Vec::new();

        for field in &schema.fields {
            let index = field
                .candidates()
                .into_iter()
                .find_map(|alias| lookup.get(&header_key(alias)).copied());

            if index.is_none() && field.required {
                missing.push(field.name.clone());
            }
            columns.push((field.name.clone(), index));
        }

        if !missing.is_empty() {
            return Err(IngestError::MissingColumns {
                missing,
                found: headers.to_vec(),
            });
        }

        Ok(Self { columns })
    }

    /// Source column index for a canonical field.
    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, index)| *index)
    }

    fn describe(&self, headers: &[String]) -> BTreeMap<String, Option<String>> {
        self.columns
            .iter()
            .map(|(name, index)| (name.clone(), index.and_then(|i| headers.get(i).cloned())))
            .collect()
    }
}

/// Build a dataset from decoded text.
pub fn ingest(raw_text: &str, schema: &Schema) -> IngestResult<Dataset> {
    let parsed = parse_str_auto(raw_text)?;
    build_dataset(parsed, schema)
}

/// Build a dataset from raw bytes of unknown encoding.
pub fn ingest_bytes(bytes: &[u8], schema: &Schema) -> IngestResult<Dataset> {
    let (text, encoding) = decode_bytes(bytes);
    let mut parsed = parse_str_auto(&text)?;
    parsed.encoding = encoding;
    build_dataset(parsed, schema)
}

/// 1-based data rows with more fields than the header. Their extra fields
/// are dropped, usually because a cell holds an unquoted delimiter.
fn overlong_rows(parsed: &ParseResult) -> Vec<usize> {
    parsed
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.len() > parsed.headers.len())
        .map(|(i, _)| i + 1)
        .collect()
}

fn build_dataset(parsed: ParseResult, schema: &Schema) -> IngestResult<Dataset> {
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Detected separator: '{}'", parsed.delimiter));
    log_info(format!("Columns: {}", parsed.headers.join(", ")));

    if parsed.rows.is_empty() {
        log_warning("CSV parse produced no rows");
        return Err(IngestError::NoRows);
    }

    let mapping = ColumnMapping::resolve(&parsed.headers, schema).map_err(|err| {
        log_warning(format!(
            "Header mapping failed. Available headers: {}",
            parsed.headers.join(", ")
        ));
        err
    })?;

    for field in &schema.fields {
        match mapping.index_of(&field.name) {
            Some(i) => log_info_indent(format!("{} ← {}", field.name, parsed.headers[i]), 1),
            None => log_info_indent(format!("{} ← (absent, empty)", field.name), 1),
        }
    }

    let overlong = overlong_rows(&parsed);
    if !overlong.is_empty() {
        log_warning(format!(
            "{} row(s) have more fields than the header, extra fields dropped (data rows {})",
            overlong.len(),
            overlong
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    let records: Vec<Record> = parsed
        .rows
        .iter()
        .map(|row| {
            Record::from_pairs(schema.fields.iter().map(|field| {
                let raw = mapping
                    .index_of(&field.name)
                    .and_then(|i| row.get(i))
                    .map(String::as_str);
                (field.name.clone(), schema.normalizer.normalize(raw))
            }))
        })
        .collect();

    log_success(format!("CSV ok: {} rows", records.len()));

    let info = CsvInfo {
        encoding: parsed.encoding,
        delimiter: parsed.delimiter,
        columns: mapping.describe(&parsed.headers),
        headers: parsed.headers,
        row_count: records.len(),
        location: None,
        last_modified: None,
    };

    Ok(Dataset::new(records, info))
}
