//! Base-letter string comparison for the German-authored exports.
//!
//! Compares the way a `de` collator does at base sensitivity: case and
//! diacritics are ignored, so "Ärzte", "arzte" and "ARZTE" are equal and
//! sort next to "Arznei".

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Sort key with case and diacritics folded away.
pub fn collation_key(s: &str) -> String {
    let mut key = String::with_capacity(s.len());
    for c in s.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match c {
            'ß' | 'ẞ' => key.push_str("ss"),
            'æ' | 'Æ' => key.push_str("ae"),
            'œ' | 'Œ' => key.push_str("oe"),
            'ø' | 'Ø' => key.push('o'),
            _ => key.extend(c.to_lowercase()),
        }
    }
    key
}

/// Compare two values at base-letter sensitivity.
pub fn compare(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}
