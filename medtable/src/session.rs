//! Load lifecycle and view state for one table.
//!
//! A [`Session`] owns the active schema, the most recent dataset and the
//! [`ViewState`]. Loads are split into [`Session::begin_load`] and
//! [`Session::finish_load`] so a caller can fetch without holding the
//! session; a result that arrives after a newer load was started is
//! dropped.

use std::sync::Arc;

use crate::error::{IngestError, IngestResult};
use crate::ingest::{self, Source};
use crate::logs::{log_info, log_warning};
use crate::models::Dataset;
use crate::schema::Schema;
use crate::view::{apply, filter_options, group_by, paginate, FilterOptions, Group, Page, ViewState};

/// Handed out by [`Session::begin_load`]; only the newest one is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Ready,
    /// A newer load was started; the result was discarded.
    Stale,
    Failed(IngestError),
}

/// A dataset together with the selector values derived from it.
#[derive(Debug)]
pub struct Loaded {
    pub dataset: Dataset,
    pub options: FilterOptions,
}

#[derive(Debug)]
pub struct Session {
    schema: Schema,
    loaded: Option<Arc<Loaded>>,
    state: ViewState,
    generation: u64,
    last_error: Option<IngestError>,
    page_size: usize,
}

impl Session {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            loaded: None,
            state: ViewState::default(),
            generation: 0,
            last_error: None,
            page_size: crate::config::DEFAULT_PAGE_SIZE,
        }
    }

    /// Page size applied whenever a load resets the view state.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self.state.set_page_size(page_size);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    pub fn finish_load(&mut self, ticket: LoadTicket, result: IngestResult<Dataset>) -> LoadStatus {
        if ticket.0 != self.generation {
            log_warning(format!(
                "Discarding stale load #{} (current #{})",
                ticket.0, self.generation
            ));
            return LoadStatus::Stale;
        }

        match result {
            Ok(dataset) => {
                let options = filter_options(&dataset, &self.schema);
                let mut state = ViewState::for_schema(&self.schema, &options);
                state.set_page_size(self.page_size);

                self.loaded = Some(Arc::new(Loaded { dataset, options }));
                self.state = state;
                self.last_error = None;
                LoadStatus::Ready
            }
            Err(err) => {
                self.loaded = None;
                self.last_error = Some(err.clone());
                LoadStatus::Failed(err)
            }
        }
    }

    /// Fetch `source` and install the result.
    pub async fn load(&mut self, source: &Source) -> LoadStatus {
        let ticket = self.begin_load();
        log_info(format!("Load #{} started", ticket.0));
        let result = ingest::load(source, &self.schema).await;
        self.finish_load(ticket, result)
    }

    /// Shared handle on the current dataset, if any.
    pub fn snapshot(&self) -> Option<Arc<Loaded>> {
        self.loaded.clone()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.loaded.as_deref().map(|l| &l.dataset)
    }

    pub fn filter_options(&self) -> Option<&FilterOptions> {
        self.loaded.as_deref().map(|l| &l.options)
    }

    pub fn last_error(&self) -> Option<&IngestError> {
        self.last_error.as_ref()
    }

    /// Text shown in place of the table body after a failed load.
    pub fn error_message(&self) -> Option<String> {
        self.last_error
            .as_ref()
            .map(|err| err.user_message(&self.schema.describe_expected()))
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    /// Current page. The stored page index is pulled back into range.
    pub fn page(&mut self) -> Page<'_> {
        let page_size = self.state.effective_page_size();
        let page = match self.loaded.as_deref() {
            Some(loaded) => {
                let view = apply(&loaded.dataset, &self.schema, &self.state);
                paginate(&view, self.state.page_index, page_size)
            }
            None => paginate(&[], self.state.page_index, page_size),
        };
        self.state.page_index = page.page_index;
        page
    }

    /// The whole view grouped by the schema's group field.
    ///
    /// `None` when the schema has no group field or nothing is loaded.
    pub fn groups(&self) -> Option<Vec<Group<'_>>> {
        let spec = self.schema.group.as_ref()?;
        self.groups_by(&spec.field, &spec.fallback)
    }

    pub fn groups_by(&self, field: &str, fallback: &str) -> Option<Vec<Group<'_>>> {
        let loaded = self.loaded.as_deref()?;
        let view = apply(&loaded.dataset, &self.schema, &self.state);
        Some(group_by(&view, field, fallback))
    }
}
