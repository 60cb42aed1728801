//! Deployment schema: canonical fields, header aliases and view settings.
//!
//! One [`Schema`] replaces the per-deployment copies of loading and
//! filtering code. Ingestion reads `fields` to map headers, the view
//! pipeline reads `searchable`, `filters`, `default_sort` and `group`.
//!
//! Schemas come from a built-in preset ([`Schema::preset`]) or a JSON file
//! ([`Schema::from_file`]).

pub mod presets;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::config::FALLBACK_GROUP_LABEL;
use crate::error::{ConfigError, ConfigResult};
use crate::text::Normalizer;

/// One canonical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Canonical name used by every later stage
    pub name: String,
    /// Accepted header spellings, tried in order
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Missing required fields fail the load; optional ones default to ""
    #[serde(default = "default_required")]
    pub required: bool,
    /// Column heading for display
    #[serde(default)]
    pub label: Option<String>,
}

fn default_required() -> bool {
    true
}

impl FieldSpec {
    pub fn required(name: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            required: true,
            label: None,
        }
    }

    pub fn optional(name: &str, aliases: &[&str]) -> Self {
        Self {
            required: false,
            ..Self::required(name, aliases)
        }
    }

    pub fn labelled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Header spellings to try; the canonical name when no alias is listed.
    pub fn candidates(&self) -> Vec<&str> {
        if self.aliases.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.aliases.iter().map(String::as_str).collect()
        }
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// A categorical filter offered as a selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub field: String,
    /// Preselected value, applied only when the dataset contains it
    #[serde(default)]
    pub default: Option<String>,
}

impl FilterSpec {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            default: None,
        }
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }
}

/// Grouped ("by category") rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub field: String,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_fallback() -> String {
    FALLBACK_GROUP_LABEL.to_string()
}

/// Full deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    /// Fields the free-text query looks into
    pub searchable: Vec<String>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    /// Sort applied when a dataset is first shown
    #[serde(default)]
    pub default_sort: Option<String>,
    #[serde(default)]
    pub group: Option<GroupSpec>,
    #[serde(default)]
    pub normalizer: Normalizer,
}

impl Schema {
    /// Look up a built-in deployment by name.
    pub fn preset(name: &str) -> ConfigResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "medications" => Ok(presets::medications()),
            "ema" => Ok(presets::ema()),
            "kmt" => Ok(presets::kmt()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// Parse and validate a schema from JSON.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Check that every referenced field exists and names are unique.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.fields.is_empty() {
            return Err(ConfigError::InvalidSchema("no fields defined".into()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(ConfigError::InvalidSchema("field with empty name".into()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ConfigError::InvalidSchema(format!(
                    "duplicate field '{}'",
                    field.name
                )));
            }
        }

        let referenced = self
            .searchable
            .iter()
            .map(|s| ("searchable", s))
            .chain(self.filters.iter().map(|f| ("filter", &f.field)))
            .chain(self.default_sort.iter().map(|s| ("defaultSort", s)))
            .chain(self.group.iter().map(|g| ("group", &g.field)));

        for (role, name) in referenced {
            if !seen.contains(name.as_str()) {
                return Err(ConfigError::InvalidSchema(format!(
                    "{} refers to unknown field '{}'",
                    role, name
                )));
            }
        }

        Ok(())
    }

    /// Required fields with their aliases, for the missing-columns message.
    pub fn describe_expected(&self) -> String {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.candidates().join("/"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Lookup key for a header: lowercase, no whitespace, no BOM.
pub fn header_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{feff}')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_key() {
        assert_eq!(header_key("Medication"), "medication");
        assert_eq!(header_key("MEDICATION"), "medication");
        assert_eq!(header_key("medication "), "medication");
        assert_eq!(header_key("\u{feff}Kategorie / Situation"), "kategorie/situation");
    }

    #[test]
    fn test_candidates_fall_back_to_name() {
        let field = FieldSpec::required("status", &[]);
        assert_eq!(field.candidates(), vec!["status"]);
    }

    #[test]
    fn test_unknown_preset() {
        let err = Schema::preset("nope").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset(ref p) if p == "nope"));
    }

    #[test]
    fn test_presets_are_valid() {
        for name in ["medications", "ema", "kmt", " EMA "] {
            let schema = Schema::preset(name).unwrap();
            schema.validate().unwrap();
        }
    }

    #[test]
    fn test_json_round_trip_and_defaults() {
        let json = r#"{
            "name": "custom",
            "fields": [
                { "name": "drug", "aliases": ["drug", "wirkstoff"] },
                { "name": "note", "required": false }
            ],
            "searchable": ["drug", "note"],
            "filters": [{ "field": "note" }]
        }"#;

        let schema = Schema::from_json(json).unwrap();
        assert!(schema.fields[0].required);
        assert!(!schema.fields[1].required);
        assert_eq!(schema.normalizer, Normalizer::default());
        assert!(schema.group.is_none());

        let again = Schema::from_json(&schema.to_json().unwrap()).unwrap();
        assert_eq!(again, schema);
    }

    #[test]
    fn test_validate_rejects_unknown_reference() {
        let json = r#"{
            "name": "broken",
            "fields": [{ "name": "drug" }],
            "searchable": ["drug", "missing"]
        }"#;
        let err = Schema::from_json(json).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let json = r#"{
            "name": "dup",
            "fields": [{ "name": "drug" }, { "name": "drug" }],
            "searchable": []
        }"#;
        assert!(Schema::from_json(json).is_err());
    }

    #[test]
    fn test_describe_expected_lists_required_only() {
        let schema = Schema::preset("ema").unwrap();
        let expected = schema.describe_expected();
        assert!(expected.contains("name/medication/medikament/arznei"));
        assert!(!expected.contains("status"));
    }
}
