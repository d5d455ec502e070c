//! Per-session viewer and notebook state.
//!
//! Each user session owns its query, the currently displayed result rows,
//! the viewer state machine, and the notebook. Sessions are passed by
//! context into every handler; nothing here is process-global.
//!
//! The viewer has two states: `Unselected` (initial) and `Selected`,
//! holding one resolved document id. Running a search never changes
//! viewer state; only a successful row selection does.

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::config::SearchConfig;
use crate::corpus::Corpus;
use crate::highlight;
use crate::models::{NotebookEntry, SearchResult};
use crate::notebook::Notebook;
use crate::search;

/// Viewer state: nothing selected yet, or exactly one resolved document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerState {
    Unselected,
    Selected { id: String },
}

/// A document rendered for the viewer: canonical id plus the full body
/// with the current query's terms marked.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedDocument {
    pub id: String,
    pub marked_body: String,
}

/// One user's search, viewer, and notebook state.
pub struct Session {
    query: String,
    displayed: Vec<SearchResult>,
    viewer: ViewerState,
    notebook: Notebook,
}

impl Session {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            displayed: Vec::new(),
            viewer: ViewerState::Unselected,
            notebook: Notebook::new(),
        }
    }

    /// Run a search and replace the displayed result set.
    ///
    /// Viewer state is deliberately left untouched: a new search does not
    /// deselect the document being read.
    pub fn run_search(
        &mut self,
        corpus: &Corpus,
        query: &str,
        limits: &SearchConfig,
    ) -> &[SearchResult] {
        self.query = query.to_string();
        self.displayed = search::search(corpus, query, limits);
        &self.displayed
    }

    pub fn displayed(&self) -> &[SearchResult] {
        &self.displayed
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    /// Select a row of the displayed result set.
    ///
    /// The row index is resolved to a document id and the canonical body
    /// is re-fetched from the corpus, never taken from the truncated
    /// snippet. On any resolution failure the viewer keeps its prior
    /// state and the error carries a user-facing message.
    pub fn select(&mut self, corpus: &Corpus, row: usize) -> Result<RenderedDocument> {
        let id = self
            .displayed
            .get(row)
            .map(|r| r.id.clone())
            .ok_or_else(|| anyhow!("no result row at index {}", row))?;

        let doc = corpus
            .get(&id)
            .ok_or_else(|| anyhow!("document not found: {}", id))?;

        let terms = search::query_terms(&self.query);
        let marked_body = highlight::render(&doc.body, &terms);

        self.viewer = ViewerState::Selected { id: id.clone() };
        Ok(RenderedDocument { id, marked_body })
    }

    /// Save the selected document into the notebook.
    ///
    /// Returns the notebook preview rows. With nothing selected this is a
    /// no-op: the existing snapshot comes back unchanged, or a single
    /// placeholder row when the notebook is empty.
    pub fn save(&mut self, corpus: &Corpus, limits: &SearchConfig) -> Vec<NotebookEntry> {
        let id = match &self.viewer {
            ViewerState::Selected { id } => id.clone(),
            ViewerState::Unselected => return self.preview(),
        };

        let doc = match corpus.get(&id) {
            Some(d) => d,
            // Selection always came from this corpus; handled anyway so a
            // save can never panic.
            None => return self.preview(),
        };

        let terms = search::query_terms(&self.query);
        let snippet = search::make_snippet(&doc.body, &terms, limits);
        self.notebook.append(NotebookEntry {
            id: doc.id.clone(),
            snippet,
            body: doc.body.clone(),
        });
        self.notebook.snapshot().to_vec()
    }

    /// Notebook rows for display: the snapshot, or a placeholder row when
    /// nothing has been saved yet.
    pub fn preview(&self) -> Vec<NotebookEntry> {
        if self.notebook.is_empty() {
            vec![Notebook::placeholder_row("No document selected.")]
        } else {
            self.notebook.snapshot().to_vec()
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
