//! Field value cleanup.
//!
//! Every cell coming out of the CSV parser passes through a [`Normalizer`]
//! before it becomes part of a record. The base cleanup (BOM, non-breaking
//! spaces, whitespace) always runs; abbreviation expansion and entity
//! decoding are switched on per schema.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const BOM: char = '\u{feff}';
const NBSP: char = '\u{a0}';

static NBSP_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)&nbsp;").expect("valid nbsp regex"));

static LT_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)&lt;?").expect("valid lt regex"));

static GT_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)&gt;?").expect("valid gt regex"));

/// Abbreviations rewritten to prose when expansion is enabled.
static EXPANSIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"(?i)\be\.g\.").expect("valid e.g. regex"), "for example"),
        (Regex::new(r"(?i)\bi\.e\.").expect("valid i.e. regex"), "that is"),
    ]
});

/// Per-schema cleanup switches. The default only does the base cleanup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Normalizer {
    /// Rewrite "e.g." / "i.e." as "for example" / "that is".
    #[serde(default)]
    pub expand_abbreviations: bool,
    /// Turn literal `&lt` / `&gt` into `<` / `>`.
    #[serde(default)]
    pub decode_entities: bool,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_abbreviations(mut self) -> Self {
        self.expand_abbreviations = true;
        self
    }

    pub fn with_entities(mut self) -> Self {
        self.decode_entities = true;
        self
    }

    /// Normalize a raw cell. Missing values become `""`.
    pub fn normalize(&self, raw: Option<&str>) -> String {
        let Some(raw) = raw else {
            return String::new();
        };

        let mut text = strip_invisible(raw);

        if self.decode_entities {
            text = LT_ENTITY.replace_all(&text, "<").into_owned();
            text = GT_ENTITY.replace_all(&text, ">").into_owned();
        }

        if self.expand_abbreviations {
            for (pattern, replacement) in EXPANSIONS.iter() {
                text = pattern.replace_all(&text, *replacement).into_owned();
            }
        }

        collapse_whitespace(&text)
    }
}

/// Base cleanup with no optional steps.
pub fn normalize(raw: Option<&str>) -> String {
    Normalizer::default().normalize(raw)
}

/// BOM removal, non-breaking space replacement and whitespace collapsing.
///
/// This is the part of normalization the sentence splitter reuses.
pub fn clean(text: &str) -> String {
    collapse_whitespace(&strip_invisible(text))
}

fn strip_invisible(text: &str) -> String {
    let text: String = text
        .chars()
        .filter(|&c| c != BOM)
        .map(|c| if c == NBSP { ' ' } else { c })
        .collect();
    NBSP_ENTITY.replace_all(&text, " ").into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(segment);
    }
    out
}

/// Link target for a stored URL cell.
///
/// Exports often omit the scheme, so bare hosts get `https://`.
pub fn href(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    let target = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    Some(target.replace('"', "%22"))
}
