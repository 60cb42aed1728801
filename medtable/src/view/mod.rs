//! Everything between a loaded [`Dataset`](crate::models::Dataset) and what
//! the table renders.
//!
//! ```text
//! Dataset + ViewState ──apply──▶ View ──paginate──▶ Page
//!                                  └───group_by───▶ Vec<Group>
//! ```

pub mod grouper;
pub mod pager;
pub mod pipeline;
pub mod state;

pub use grouper::{group_by, Group};
pub use pager::{paginate, Page};
pub use pipeline::{apply, apply_records, distinct_values, filter_options, FilterOption, FilterOptions, View};
pub use state::{Selection, SortDirection, ViewState};
