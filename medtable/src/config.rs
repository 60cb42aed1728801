//! Application configuration.
//!
//! Defaults are compiled in; `MEDTABLE_*` environment variables (optionally
//! from a `.env` file) override them for a deployment.

use crate::error::{ConfigError, ConfigResult};

/// Relative path of the CSV export served next to the page.
pub const DEFAULT_SOURCE: &str = "data/medications.csv";

/// Preset used when none is configured.
pub const DEFAULT_PRESET: &str = "medications";

/// Rows per page when the requested size is missing or unusable.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Label for records whose group field is empty.
pub const FALLBACK_GROUP_LABEL: &str = "Unkategorisiert";

pub const ENV_SOURCE: &str = "MEDTABLE_SOURCE";
pub const ENV_PRESET: &str = "MEDTABLE_PRESET";
pub const ENV_PAGE_SIZE: &str = "MEDTABLE_PAGE_SIZE";

/// Deployment settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// File path or http(s) URL of the CSV export
    pub source: String,
    /// Built-in schema preset name
    pub preset: String,
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(source) = lookup(ENV_SOURCE).filter(|s| !s.trim().is_empty()) {
            config.source = source.trim().to_string();
        }
        if let Some(preset) = lookup(ENV_PRESET).filter(|s| !s.trim().is_empty()) {
            config.preset = preset.trim().to_lowercase();
        }
        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            config.page_size = match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: ENV_PAGE_SIZE.to_string(),
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }
}
