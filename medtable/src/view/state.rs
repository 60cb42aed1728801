//! The query/filter/sort/page state owned by the UI.
//!
//! Mutators mirror the table controls: editing the search box, a filter or
//! the sort jumps back to the first page; changing the page size does not.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::pipeline::FilterOptions;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::schema::Schema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Selected value of a categorical filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    #[default]
    Any,
    Exactly(String),
}

impl Selection {
    /// Selector input: blank or `*` means no filtering.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "*" {
            Selection::Any
        } else {
            Selection::Exactly(trimmed.to_string())
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::Any => None,
            Selection::Exactly(v) => Some(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub query: String,
    /// Filter field → selection; absent fields are unfiltered
    pub filters: BTreeMap<String, Selection>,
    pub sort_key: Option<String>,
    pub sort_direction: SortDirection,
    /// 1-based; clamped by the pager
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            query: String::new(),
            filters: BTreeMap::new(),
            sort_key: None,
            sort_direction: SortDirection::Ascending,
            page_index: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewState {
    /// Initial state for a freshly loaded dataset.
    ///
    /// A schema's default filter value is only preselected when the
    /// dataset actually contains it; otherwise the filter starts at "any".
    pub fn for_schema(schema: &Schema, options: &FilterOptions) -> Self {
        let mut state = Self::default();

        for filter in &schema.filters {
            let selection = match &filter.default {
                Some(value) if options.contains(&filter.field, value) => {
                    Selection::Exactly(value.clone())
                }
                _ => Selection::Any,
            };
            state.filters.insert(filter.field.clone(), selection);
        }

        state.sort_key = schema.default_sort.clone();
        state
    }

    pub fn selection(&self, field: &str) -> &Selection {
        static ANY: Selection = Selection::Any;
        self.filters.get(field).unwrap_or(&ANY)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page_index = 1;
    }

    pub fn set_filter(&mut self, field: impl Into<String>, selection: Selection) {
        self.filters.insert(field.into(), selection);
        self.page_index = 1;
    }

    pub fn set_sort(&mut self, key: impl Into<String>, direction: SortDirection) {
        self.sort_key = Some(key.into());
        self.sort_direction = direction;
        self.page_index = 1;
    }

    /// Column header click: same column flips, another column starts ascending.
    pub fn toggle_sort(&mut self, key: &str) {
        if self.sort_key.as_deref() == Some(key) {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_key = Some(key.to_string());
            self.sort_direction = SortDirection::Ascending;
        }
        self.page_index = 1;
    }

    pub fn clear_sort(&mut self) {
        self.sort_key = None;
        self.sort_direction = SortDirection::Ascending;
        self.page_index = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
    }

    /// Page-size selector input; anything that is not a positive integer
    /// falls back to the default.
    pub fn parse_page_size(raw: &str) -> usize {
        match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    pub fn effective_page_size(&self) -> usize {
        if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }

    pub fn next_page(&mut self) {
        self.page_index = self.page_index.saturating_add(1);
    }

    pub fn previous_page(&mut self) {
        self.page_index = self.page_index.saturating_sub(1).max(1);
    }

    pub fn go_to_page(&mut self, page_index: usize) {
        self.page_index = page_index.max(1);
    }

    /// Pull `page_index` back into range after the pager clamped it.
    pub fn clamp_page(&mut self, total_pages: usize) {
        self.page_index = self.page_index.clamp(1, total_pages.max(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::presets;
    use crate::view::pipeline::FilterOption;

    #[test]
    fn test_defaults() {
        let state = ViewState::default();
        assert_eq!(state.page_index, 1);
        assert_eq!(state.page_size, 50);
        assert!(state.sort_key.is_none());
        assert_eq!(state.selection("status"), &Selection::Any);
    }

    #[test]
    fn test_selection_parse() {
        assert_eq!(Selection::parse(""), Selection::Any);
        assert_eq!(Selection::parse(" * "), Selection::Any);
        assert_eq!(Selection::parse(" Human "), Selection::Exactly("Human".into()));
    }

    #[test]
    fn test_toggle_sort() {
        let mut state = ViewState::default();
        state.page_index = 4;

        state.toggle_sort("name");
        assert_eq!(state.sort_key.as_deref(), Some("name"));
        assert_eq!(state.sort_direction, SortDirection::Ascending);
        assert_eq!(state.page_index, 1);

        state.toggle_sort("name");
        assert_eq!(state.sort_direction, SortDirection::Descending);

        state.toggle_sort("disease");
        assert_eq!(state.sort_key.as_deref(), Some("disease"));
        assert_eq!(state.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn test_query_and_filter_reset_page() {
        let mut state = ViewState::default();
        state.go_to_page(3);
        state.set_query("aspirin");
        assert_eq!(state.page_index, 1);

        state.go_to_page(3);
        state.set_filter("status", Selection::parse("Authorised"));
        assert_eq!(state.page_index, 1);
    }

    #[test]
    fn test_page_size_does_not_reset_page() {
        let mut state = ViewState::default();
        state.go_to_page(3);
        state.set_page_size(10);
        assert_eq!(state.page_index, 3);
        assert_eq!(state.page_size, 10);

        state.set_page_size(0);
        assert_eq!(state.page_size, 50);
    }

    #[test]
    fn test_parse_page_size() {
        assert_eq!(ViewState::parse_page_size("25"), 25);
        assert_eq!(ViewState::parse_page_size("abc"), 50);
        assert_eq!(ViewState::parse_page_size("0"), 50);
        assert_eq!(ViewState::parse_page_size("-5"), 50);
    }

    #[test]
    fn test_page_navigation() {
        let mut state = ViewState::default();
        state.previous_page();
        assert_eq!(state.page_index, 1);
        state.next_page();
        state.next_page();
        assert_eq!(state.page_index, 3);
        state.clamp_page(2);
        assert_eq!(state.page_index, 2);
        state.clamp_page(0);
        assert_eq!(state.page_index, 1);
    }

    #[test]
    fn test_for_schema_applies_present_defaults_only() {
        let schema = presets::ema();
        let options = FilterOptions::new(vec![
            FilterOption {
                field: "status".into(),
                values: vec!["Authorised".into(), "Withdrawn".into()],
            },
            FilterOption {
                field: "category".into(),
                values: vec!["Veterinary".into()],
            },
        ]);

        let state = ViewState::for_schema(&schema, &options);
        assert_eq!(state.selection("status"), &Selection::Exactly("Authorised".into()));
        assert_eq!(state.selection("category"), &Selection::Any);
    }

    #[test]
    fn test_for_schema_default_sort() {
        let schema = presets::kmt();
        let state = ViewState::for_schema(&schema, &FilterOptions::default());
        assert_eq!(state.sort_key.as_deref(), Some("medication"));
    }
}
