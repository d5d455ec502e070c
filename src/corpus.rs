//! Corpus loading and lookup.
//!
//! Parses the fetched byte stream as headered CSV into an immutable,
//! ordered table of documents with an id index built at load time.
//! Column resolution happens exactly once and is recorded on the corpus
//! as a [`CorpusSchema`].
//!
//! A fetch or parse failure never propagates past
//! [`Corpus::load_or_sentinel`]: the corpus is replaced by a single
//! sentinel document carrying the error message, so search, selection,
//! and export keep working against a one-row table.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;

use crate::models::{CorpusSchema, Document};

/// Identifier of the sentinel document produced when loading fails.
pub const SENTINEL_ID: &str = "load-error";

/// The immutable, fully loaded set of documents available for search.
///
/// Order is preserved from the source table and used as the default
/// ordering for search results. Safe for unsynchronized concurrent reads.
pub struct Corpus {
    docs: Vec<Document>,
    index: HashMap<String, usize>,
    schema: CorpusSchema,
}

impl Corpus {
    /// Parse raw CSV bytes into a corpus.
    ///
    /// Rows that fail to parse, lack the resolved columns, or repeat an
    /// already-seen identifier are skipped. Errors only when the input has
    /// no header row or yields zero usable rows.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .context("Failed to read corpus header row")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            bail!("corpus has no header row");
        }

        let (schema, id_idx, body_idx) = resolve_schema(&headers);

        let mut docs: Vec<Document> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut skipped = 0usize;

        for record in reader.records() {
            let record = match record {
                Ok(r) => r,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            let id = match record.get(id_idx) {
                Some(v) if !v.trim().is_empty() => v.trim().to_string(),
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            let body = match record.get(body_idx) {
                Some(v) => v.to_string(),
                None => {
                    skipped += 1;
                    continue;
                }
            };
            if index.contains_key(&id) {
                skipped += 1;
                continue;
            }
            index.insert(id.clone(), docs.len());
            docs.push(Document { id, body });
        }

        if docs.is_empty() {
            bail!("corpus contains no parseable rows");
        }
        if skipped > 0 {
            eprintln!("Warning: skipped {} unparseable or duplicate rows", skipped);
        }

        Ok(Self {
            docs,
            index,
            schema,
        })
    }

    /// Load a corpus from a fetch result, falling back to a one-row
    /// sentinel corpus carrying the error message on any failure.
    pub fn load_or_sentinel(fetched: Result<Vec<u8>>) -> Self {
        match fetched.and_then(|bytes| Self::load(&bytes)) {
            Ok(corpus) => corpus,
            Err(e) => {
                let message = format!("{:#}", e);
                eprintln!("Error loading corpus: {}", message);
                Self::sentinel(&message)
            }
        }
    }

    /// A corpus holding exactly one document whose body is an error message.
    pub fn sentinel(message: &str) -> Self {
        let docs = vec![Document {
            id: SENTINEL_ID.to_string(),
            body: message.to_string(),
        }];
        let mut index = HashMap::new();
        index.insert(SENTINEL_ID.to_string(), 0);
        Self {
            docs,
            index,
            schema: CorpusSchema {
                id_column: "error".to_string(),
                body_column: "error".to_string(),
            },
        }
    }

    /// Look up a document by identifier through the index.
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.index.get(id).map(|&i| &self.docs[i])
    }

    /// All documents in source order.
    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn schema(&self) -> &CorpusSchema {
        &self.schema
    }
}

/// Resolve which columns carry the identifier and the body.
///
/// Matching is case-insensitive: the body column is the one named `text`
/// if present, else the last column; the identifier column is `filename`
/// if present, else the first column.
fn resolve_schema(headers: &[String]) -> (CorpusSchema, usize, usize) {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let body_idx = lowered
        .iter()
        .position(|h| h == "text")
        .unwrap_or(headers.len() - 1);
    let id_idx = lowered.iter().position(|h| h == "filename").unwrap_or(0);
    (
        CorpusSchema {
            id_column: headers[id_idx].clone(),
            body_column: headers[body_idx].clone(),
        },
        id_idx,
        body_idx,
    )
}
