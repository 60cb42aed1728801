//! Clause splitting for free-text indication fields.
//!
//! Indications are long run-on paragraphs; the table shows them one clause
//! per line. Known abbreviations are masked with placeholders first so their
//! periods never end a clause.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::normalize::clean;

const MASK_OPEN: char = '\u{e000}';
const MASK_CLOSE: char = '\u{e001}';

static ABBREVIATIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:e\.g\.|i\.e\.|d\.d\.|k\.s\.|z\.b\.|u\.a\.)")
        .expect("valid abbreviation regex")
});

static MASK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("{}([0-9]+){}", MASK_OPEN, MASK_CLOSE)).expect("valid mask regex")
});

/// Split `text` into trimmed, non-empty clauses in input order.
///
/// Clauses end at `;`, and at `.` when followed by whitespace, by a letter,
/// or by the end of the text.
pub fn split(text: &str) -> Vec<String> {
    // placeholder delimiters in the input would be mistaken for masks
    let unmasked: String = text
        .chars()
        .filter(|&c| c != MASK_OPEN && c != MASK_CLOSE)
        .collect();
    let cleaned = clean(&unmasked);
    if cleaned.is_empty() {
        return Vec::new();
    }

    let mut protected: Vec<String> = Vec::new();
    let masked = ABBREVIATIONS
        .replace_all(&cleaned, |caps: &Captures| {
            protected.push(caps[0].to_string());
            format!("{}{}{}", MASK_OPEN, protected.len() - 1, MASK_CLOSE)
        })
        .into_owned();

    let chars: Vec<char> = masked.chars().collect();
    let mut clauses = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let ends_clause = match c {
            ';' => true,
            '.' => match chars.get(i + 1) {
                None => true,
                // a masked abbreviation always starts with a letter
                Some(&MASK_OPEN) => true,
                Some(next) => next.is_whitespace() || next.is_alphabetic(),
            },
            _ => false,
        };

        if ends_clause {
            push_clause(&mut clauses, &current, &protected);
            current.clear();
        } else {
            current.push(c);
        }
    }
    push_clause(&mut clauses, &current, &protected);

    clauses
}

fn push_clause(clauses: &mut Vec<String>, raw: &str, protected: &[String]) {
    let restored = MASK.replace_all(raw, |caps: &Captures| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|i| protected.get(i))
            .cloned()
            .unwrap_or_default()
    });

    let clause = restored.trim();
    if !clause.is_empty() {
        clauses.push(clause.to_string());
    }
}
