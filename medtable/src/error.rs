//! Error types for the medtable pipeline.
//!
//! - [`IngestError`] - fetching, decoding and mapping a CSV export
//! - [`ConfigError`] - schema files and environment configuration
//!
//! Filtering, sorting and paging are total functions and have no error type.

use thiserror::Error;

// =============================================================================
// Ingestion Errors
// =============================================================================

/// Errors that end a load attempt. No partial dataset is ever built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    /// The raw text could not be retrieved.
    #[error("Failed to fetch '{location}': {reason}")]
    FetchFailed { location: String, reason: String },

    /// The text was readable but produced no data rows.
    #[error("CSV produced no rows")]
    NoRows,

    /// Required canonical fields had no matching header.
    #[error("Missing columns: {} (found: {})", missing.join(", "), found.join(", "))]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// The delimited text itself was malformed.
    #[error("Invalid CSV: {0}")]
    Csv(String),
}

impl IngestError {
    pub fn fetch(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::FetchFailed {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Message shown in place of the table body.
    ///
    /// `expected` lists the canonical fields (and their aliases) of the active
    /// schema, as produced by [`crate::schema::Schema::describe_expected`].
    pub fn user_message(&self, expected: &str) -> String {
        match self {
            Self::FetchFailed { reason, .. } => {
                format!("Fehler beim Laden/Parsen: {}", reason)
            }
            Self::NoRows => {
                "Keine Daten gefunden. Prüfe Trennzeichen (Komma vs. Semikolon) und Header."
                    .to_string()
            }
            Self::MissingColumns { found, .. } => format!(
                "Fehlende Spalten. Erwartet: {}. Gefunden: {}",
                expected,
                found.join(", ")
            ),
            Self::Csv(msg) => format!("Fehler beim Laden/Parsen: {}", msg),
        }
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while building a schema or reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown built-in preset name.
    #[error("Unknown preset '{0}' (available: medications, ema, kmt)")]
    UnknownPreset(String),

    /// Failed to read a schema file.
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    /// Schema file is not valid JSON for a schema.
    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema is structurally unusable.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// An environment variable had an unusable value.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: String, value: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;
