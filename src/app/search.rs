// src/app/search.rs
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::api::MovieApi;
use crate::app::cancel::{Task, TaskState};
use crate::app::types::Movie;

/// Queries shorter than this (after trimming) never hit the network.
pub const MIN_QUERY_LEN: usize = 3;

/// Search-as-you-type state: `{results, is_loading, error}` for the latest query.
pub struct SearchHook {
    api: Arc<dyn MovieApi>,
    query: String,
    results: Vec<Movie>,
    is_loading: bool,
    error: Option<String>,
    task: Option<Task<Vec<Movie>>>,
}

impl SearchHook {
    pub fn new(api: Arc<dyn MovieApi>) -> Self {
        Self {
            api,
            query: String::new(),
            results: Vec::new(),
            is_loading: false,
            error: None,
            task: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Movie] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Feed the current text of the search box. Does nothing if it did not
    /// change. Any in-flight request is cancelled first; `on_new_search` runs
    /// only when a new request is actually issued. Returns whether one was.
    pub fn set_query<F: FnOnce()>(&mut self, query: &str, on_new_search: F) -> bool {
        if query == self.query {
            return false;
        }
        self.query = query.to_string();

        if let Some(prev) = self.task.take() {
            debug!("superseding in-flight search");
            prev.cancel();
        }

        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_LEN {
            self.results.clear();
            self.error = None;
            self.is_loading = false;
            return false;
        }

        on_new_search();

        self.is_loading = true;
        self.error = None;

        let api = Arc::clone(&self.api);
        let q = trimmed.to_string();
        info!(query = %q, "searching");
        self.task = Some(Task::spawn(move |token| api.search(&q, token)));
        true
    }

    /// Commit the current request's outcome, if it arrived. Returns true when
    /// state changed.
    pub fn poll(&mut self) -> bool {
        let state = match &self.task {
            Some(task) => task.state(),
            None => return false,
        };
        let TaskState::Finished(res) = state else {
            return false;
        };

        self.task = None;
        self.is_loading = false;
        match res {
            Ok(movies) => {
                debug!(count = movies.len(), "search results");
                self.results = movies;
                self.error = None;
            }
            Err(e) if e.is_cancelled() => {
                debug!("search cancelled");
            }
            Err(e) => {
                warn!("search for `{}` failed: {e}", self.query.trim());
                self.results.clear();
                self.error = Some(e.to_string());
            }
        }
        true
    }
}
