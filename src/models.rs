//! Core data models used throughout Corpus Desk.
//!
//! These types represent the documents, result rows, and notebook entries
//! that flow through the search and export pipeline.

use serde::Serialize;

/// A single corpus row after column resolution. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub body: String,
}

/// Resolved identifier and body column names, computed once at load time
/// and consumed by everything downstream.
#[derive(Debug, Clone)]
pub struct CorpusSchema {
    pub id_column: String,
    pub body_column: String,
}

/// A row in the displayed result table. Derived per query, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub snippet: String,
}

/// A document kept in the session notebook.
#[derive(Debug, Clone, Serialize)]
pub struct NotebookEntry {
    pub id: String,
    pub snippet: String,
    pub body: String,
}
