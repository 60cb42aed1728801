//! Filter and sort: (Dataset, ViewState) → View.
//!
//! Pure functions. The dataset is only borrowed, so the same dataset can
//! back any number of views.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Deref;

use super::state::{Selection, SortDirection, ViewState};
use crate::models::{Dataset, Record};
use crate::schema::Schema;
use crate::text::collation_key;

/// Filtered and sorted records, borrowed from a dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct View<'a> {
    records: Vec<&'a Record>,
}

impl<'a> View<'a> {
    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }
}

impl<'a> Deref for View<'a> {
    type Target = [&'a Record];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

/// Apply query, filters and sort from `state` to `dataset`.
pub fn apply<'a>(dataset: &'a Dataset, schema: &Schema, state: &ViewState) -> View<'a> {
    apply_records(dataset.records(), &schema.searchable, state)
}

/// [`apply`] over a plain record slice.
pub fn apply_records<'a>(
    records: &'a [Record],
    searchable: &[String],
    state: &ViewState,
) -> View<'a> {
    let query = state.query.trim().to_lowercase();
    let active: Vec<(&str, &str)> = state
        .filters
        .iter()
        .filter_map(|(field, selection)| match selection {
            Selection::Any => None,
            Selection::Exactly(value) => Some((field.as_str(), value.as_str())),
        })
        .collect();

    let matched: Vec<&Record> = records
        .iter()
        .filter(|record| active.iter().all(|(field, value)| record.get(field) == *value))
        .filter(|record| matches_query(record, searchable, &query))
        .collect();

    let records = match &state.sort_key {
        Some(key) => sort_records(matched, key, state.sort_direction),
        None => matched,
    };

    View { records }
}

/// `query` must already be trimmed and lowercased.
fn matches_query(record: &Record, searchable: &[String], query: &str) -> bool {
    query.is_empty()
        || searchable
            .iter()
            .any(|field| record.get(field).to_lowercase().contains(query))
}

/// Stable sort on the collation key of `key`.
fn sort_records<'a>(records: Vec<&'a Record>, key: &str, direction: SortDirection) -> Vec<&'a Record> {
    let mut keyed: Vec<(String, &'a Record)> = records
        .into_iter()
        .map(|record| (collation_key(record.get(key)), record))
        .collect();

    keyed.sort_by(|a, b| {
        let ord = a.0.cmp(&b.0);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}

// =============================================================================
// Filter options
// =============================================================================

/// Selectable values of one categorical filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub field: String,
    pub values: Vec<String>,
}

/// Selectable values for every filter of a schema, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterOptions {
    options: Vec<FilterOption>,
}

impl FilterOptions {
    pub fn new(options: Vec<FilterOption>) -> Self {
        Self { options }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterOption> {
        self.options.iter()
    }

    pub fn values(&self, field: &str) -> &[String] {
        self.options
            .iter()
            .find(|o| o.field == field)
            .map(|o| o.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, field: &str, value: &str) -> bool {
        self.values(field).iter().any(|v| v == value)
    }
}

/// Derive the selector values for the schema's filters. Run once per load.
pub fn filter_options(dataset: &Dataset, schema: &Schema) -> FilterOptions {
    FilterOptions::new(
        schema
            .filters
            .iter()
            .map(|filter| FilterOption {
                field: filter.field.clone(),
                values: distinct_values(dataset.records(), &filter.field),
            })
            .collect(),
    )
}

/// Non-empty values of `field`, de-duplicated and collated.
pub fn distinct_values(records: &[Record], field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keyed: Vec<(String, String)> = records
        .iter()
        .map(|record| record.get(field))
        .filter(|value| !value.is_empty() && seen.insert(*value))
        .map(|value| (collation_key(value), value.to_string()))
        .collect();

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, value)| value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, disease: &str, status: &str) -> Record {
        Record::from_pairs([("name", name), ("disease", disease), ("status", status)])
    }

    fn sample() -> Vec<Record> {
        vec![
            rec("Ibuprofen", "Pain", "Authorised"),
            rec("aspirin", "Pain", "Withdrawn"),
            rec("Äthinylestradiol", "Contraception", "Authorised"),
            rec("Zolpidem", "Insomnia", ""),
            rec("Baclofen", "Spasticity", "Authorised"),
        ]
    }

    fn searchable() -> Vec<String> {
        vec!["name".into(), "disease".into()]
    }

    fn names(view: &View) -> Vec<String> {
        view.iter().map(|r| r.get("name").to_string()).collect()
    }

    #[test]
    fn test_empty_state_keeps_everything_in_order() {
        let records = sample();
        let view = apply_records(&records, &searchable(), &ViewState::default());
        assert_eq!(
            names(&view),
            vec!["Ibuprofen", "aspirin", "Äthinylestradiol", "Zolpidem", "Baclofen"]
        );
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let records = sample();
        let mut state = ViewState::default();
        state.set_query("  PAIN ");
        let view = apply_records(&records, &searchable(), &state);
        assert_eq!(names(&view), vec!["Ibuprofen", "aspirin"]);
    }

    #[test]
    fn test_query_only_searches_searchable_fields() {
        let records = sample();
        let mut state = ViewState::default();
        state.set_query("withdrawn");
        let view = apply_records(&records, &searchable(), &state);
        assert!(view.is_empty());
    }

    #[test]
    fn test_filters_and_query_combine() {
        let records = sample();
        let mut state = ViewState::default();
        state.set_filter("status", Selection::Exactly("Authorised".into()));
        assert_eq!(
            names(&apply_records(&records, &searchable(), &state)),
            vec!["Ibuprofen", "Äthinylestradiol", "Baclofen"]
        );

        state.set_query("fen");
        assert_eq!(
            names(&apply_records(&records, &searchable(), &state)),
            vec!["Ibuprofen", "Baclofen"]
        );

        state.set_filter("status", Selection::Any);
        state.set_query("");
        assert_eq!(apply_records(&records, &searchable(), &state).len(), 5);
    }

    #[test]
    fn test_filter_is_exact_match() {
        let records = sample();
        let mut state = ViewState::default();
        state.set_filter("status", Selection::Exactly("authorised".into()));
        assert!(apply_records(&records, &searchable(), &state).is_empty());
    }

    #[test]
    fn test_sort_ascending_and_descending() {
        let records = sample();
        let mut state = ViewState::default();
        state.set_sort("name", SortDirection::Ascending);
        assert_eq!(
            names(&apply_records(&records, &searchable(), &state)),
            vec!["aspirin", "Äthinylestradiol", "Baclofen", "Ibuprofen", "Zolpidem"]
        );

        state.set_sort("name", SortDirection::Descending);
        assert_eq!(
            names(&apply_records(&records, &searchable(), &state)),
            vec!["Zolpidem", "Ibuprofen", "Baclofen", "Äthinylestradiol", "aspirin"]
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let records = sample();
        let mut state = ViewState::default();
        state.set_sort("disease", SortDirection::Ascending);
        let view = apply_records(&records, &searchable(), &state);
        // Ibuprofen and aspirin share "Pain" and keep their file order
        assert_eq!(
            names(&view),
            vec!["Äthinylestradiol", "Zolpidem", "Ibuprofen", "aspirin", "Baclofen"]
        );

        state.set_sort("disease", SortDirection::Descending);
        let view = apply_records(&records, &searchable(), &state);
        assert_eq!(
            names(&view),
            vec!["Baclofen", "Ibuprofen", "aspirin", "Zolpidem", "Äthinylestradiol"]
        );
    }

    #[test]
    fn test_apply_is_pure() {
        let records = sample();
        let mut state = ViewState::default();
        state.set_query("a");
        state.set_sort("disease", SortDirection::Descending);

        let first = apply_records(&records, &searchable(), &state);
        let second = apply_records(&records, &searchable(), &state);
        assert_eq!(first, second);
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn test_distinct_values() {
        let records = vec![
            rec("a", "Pain", "Withdrawn"),
            rec("b", "pain", "Authorised"),
            rec("c", "Pain", ""),
            rec("d", "Ödem", "Authorised"),
            rec("e", "Asthma", "Authorised"),
        ];
        assert_eq!(distinct_values(&records, "status"), vec!["Authorised", "Withdrawn"]);
        assert_eq!(
            distinct_values(&records, "disease"),
            vec!["Asthma", "Ödem", "Pain", "pain"]
        );
        assert!(distinct_values(&records, "missing").is_empty());
    }

    #[test]
    fn test_filter_options_lookup() {
        let options = FilterOptions::new(vec![FilterOption {
            field: "status".into(),
            values: vec!["Authorised".into()],
        }]);
        assert!(options.contains("status", "Authorised"));
        assert!(!options.contains("status", "Withdrawn"));
        assert!(options.values("category").is_empty());
    }
}
