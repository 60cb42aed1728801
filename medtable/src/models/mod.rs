//! Domain models shared by every stage.
//!
//! - [`Record`] - one normalized row keyed by canonical field name
//! - [`Dataset`] - all records of one load plus [`CsvInfo`]
//! - [`CsvInfo`] - what ingestion detected about the source

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::text::{href, split};

// =============================================================================
// Record
// =============================================================================

/// A normalized row. Fields missing from the source read as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of a canonical field, `""` when absent.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// A free-text field split into display clauses.
    pub fn clauses(&self, field: &str) -> Vec<String> {
        split(self.get(field))
    }

    /// A URL field as a link target.
    pub fn link(&self, field: &str) -> Option<String> {
        href(self.get(field))
    }
}

// =============================================================================
// CSV Info
// =============================================================================

/// Metadata about the loaded source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    /// Headers as they appear in the file
    pub headers: Vec<String>,
    pub row_count: usize,
    /// Canonical field → source header it was read from
    pub columns: BTreeMap<String, Option<String>>,
    /// Where the text was fetched from, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Last-Modified of the source, shown as "data updated"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

// =============================================================================
// Dataset
// =============================================================================

/// All records of one load, in file order. Never modified after creation;
/// a reload builds a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    records: Vec<Record>,
    info: CsvInfo,
}

impl Dataset {
    pub fn new(records: Vec<Record>, info: CsvInfo) -> Self {
        Self { records, info }
    }

    /// Attach fetch metadata.
    pub fn with_source(
        mut self,
        location: Option<String>,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        self.info.location = location;
        self.info.last_modified = last_modified;
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn info(&self) -> &CsvInfo {
        &self.info
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_reads_empty() {
        let record = Record::from_pairs([("name", "Aspirin")]);
        assert_eq!(record.get("name"), "Aspirin");
        assert_eq!(record.get("status"), "");
    }

    #[test]
    fn test_clauses_and_link() {
        let record = Record::from_pairs([
            ("indication", "Pain; fever. Inflammation"),
            ("url", "www.ema.europa.eu/x"),
        ]);
        assert_eq!(record.clauses("indication"), vec!["Pain", "fever", "Inflammation"]);
        assert_eq!(record.link("url").as_deref(), Some("https://www.ema.europa.eu/x"));
        assert_eq!(record.link("missing"), None);
    }

    #[test]
    fn test_record_serializes_as_map() {
        let record = Record::from_pairs([("b", "2"), ("a", "1")]);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({ "a": "1", "b": "2" }));
    }
}
