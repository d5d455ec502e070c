//! The session-scoped research notebook.
//!
//! An append-only list of saved documents. Entries are never removed or
//! reordered; the notebook lives exactly as long as its session.

use crate::models::NotebookEntry;

#[derive(Debug, Default)]
pub struct Notebook {
    entries: Vec<NotebookEntry>,
}

impl Notebook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: NotebookEntry) {
        self.entries.push(entry);
    }

    /// Read-only view of all saved entries, in save order.
    pub fn snapshot(&self) -> &[NotebookEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display-only preview row shown when the notebook is empty. Never
    /// appended to the notebook itself.
    pub fn placeholder_row(message: &str) -> NotebookEntry {
        NotebookEntry {
            id: "<none>".to_string(),
            snippet: message.to_string(),
            body: String::new(),
        }
    }
}
