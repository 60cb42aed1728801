//! Built-in deployments.

use super::{FieldSpec, FilterSpec, GroupSpec, Schema};
use crate::config::FALLBACK_GROUP_LABEL;
use crate::text::Normalizer;

/// medication / Category / Indication, with German header variants.
pub fn medications() -> Schema {
    Schema {
        name: "medications".to_string(),
        fields: vec![
            FieldSpec::required("medication", &["medication", "medikament", "arznei"])
                .labelled("Medication"),
            FieldSpec::required("category", &["category", "kategorie"]).labelled("Category"),
            FieldSpec::required("indication", &["indication", "indikation"])
                .labelled("Indication"),
        ],
        searchable: vec![
            "medication".to_string(),
            "category".to_string(),
            "indication".to_string(),
        ],
        filters: vec![FilterSpec::new("category"), FilterSpec::new("indication")],
        default_sort: None,
        group: None,
        normalizer: Normalizer::new(),
    }
}

/// EMA medicines export: Name / Tradename / Disease / Indication plus
/// optional Status, URL and Category. Opens on authorised human medicines.
pub fn ema() -> Schema {
    Schema {
        name: "ema".to_string(),
        fields: vec![
            FieldSpec::required("name", &["name", "medication", "medikament", "arznei"])
                .labelled("Name"),
            FieldSpec::optional("tradename", &["tradename", "handelsname", "brand", "marke"])
                .labelled("Tradename"),
            FieldSpec::required("disease", &["disease", "erkrankung", "krankheit", "diagnose"])
                .labelled("Disease"),
            FieldSpec::required("indication", &["indication", "indikation"])
                .labelled("Indication"),
            FieldSpec::optional("status", &["status"]).labelled("Status"),
            FieldSpec::optional("url", &["url"]).labelled("URL"),
            FieldSpec::optional("category", &["category"]).labelled("Category"),
        ],
        searchable: vec![
            "name".to_string(),
            "tradename".to_string(),
            "disease".to_string(),
            "indication".to_string(),
        ],
        filters: vec![
            FilterSpec::new("status").with_default("Authorised"),
            FilterSpec::new("category").with_default("Human"),
        ],
        default_sort: None,
        group: None,
        normalizer: Normalizer::new().with_abbreviations().with_entities(),
    }
}

/// Medikation / Kategorie / KMT-Std., shown sorted by medication or
/// grouped by category.
pub fn kmt() -> Schema {
    Schema {
        name: "kmt".to_string(),
        fields: vec![
            FieldSpec::required("medication", &["medikation", "medikament", "medication"])
                .labelled("Medikation"),
            FieldSpec::optional(
                "category",
                &["kategorie / situation", "kategorie", "situation", "category"],
            )
            .labelled("Kategorie"),
            FieldSpec::required("kmt", &["kmt-std.", "kmt-std", "kmt"]).labelled("KMT-Std."),
        ],
        searchable: vec![
            "medication".to_string(),
            "category".to_string(),
            "kmt".to_string(),
        ],
        filters: Vec::new(),
        default_sort: Some("medication".to_string()),
        group: Some(GroupSpec {
            field: "category".to_string(),
            fallback: FALLBACK_GROUP_LABEL.to_string(),
        }),
        normalizer: Normalizer::new(),
    }
}
