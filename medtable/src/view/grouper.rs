//! Grouped rendering: one collapsible section per category.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::Record;
use crate::text::collation_key;

/// Records sharing one value of the group field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group<'a> {
    pub label: String,
    pub records: Vec<&'a Record>,
}

/// Group `view` by `field`. Empty values land under `fallback`.
///
/// Sections are ordered by label using the same collation as sorting;
/// records inside a section keep their view order.
pub fn group_by<'a>(view: &[&'a Record], field: &str, fallback: &str) -> Vec<Group<'a>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Group<'a>> = Vec::new();

    for &record in view {
        let value = record.get(field);
        let label = if value.is_empty() { fallback } else { value };

        let slot = *index.entry(label).or_insert_with(|| {
            groups.push(Group {
                label: label.to_string(),
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record);
    }

    groups.sort_by_cached_key(|group| collation_key(&group.label));
    groups
}
