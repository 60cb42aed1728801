//! Fixed-size pages over a view.

use serde::Serialize;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::models::Record;

/// One page of a view plus what the pager controls need.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<'a> {
    pub items: Vec<&'a Record>,
    /// 1-based, always within `1..=total_pages`
    pub page_index: usize,
    pub total_pages: usize,
    /// Size of the whole view, not of this page
    pub total_count: usize,
    pub page_size: usize,
}

impl<'a> Page<'a> {
    pub fn has_previous(&self) -> bool {
        self.page_index > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.total_pages
    }

    /// 1-based position of the first item in the view, 0 when empty.
    pub fn first_item_number(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page_index - 1) * self.page_size + 1
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Page {} / {} - {} entries",
            self.page_index, self.total_pages, self.total_count
        )
    }
}

/// Slice `view` into the page at `page_index`.
///
/// Out-of-range indexes resolve to the nearest valid page and a zero
/// page size falls back to the default; this never fails.
pub fn paginate<'a>(view: &[&'a Record], page_index: usize, page_size: usize) -> Page<'a> {
    let page_size = if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
    let total_count = view.len();
    let total_pages = total_count.div_ceil(page_size).max(1);
    let page_index = page_index.clamp(1, total_pages);

    let start = (page_index - 1) * page_size;
    let items = view.iter().skip(start).take(page_size).copied().collect();

    Page {
        items,
        page_index,
        total_pages,
        total_count,
        page_size,
    }
}
