//! Multi-term AND search over the corpus.
//!
//! A document matches when every whitespace-delimited query term is a
//! case-insensitive substring of its body. Matches keep corpus order (no
//! relevance scoring) and are truncated at the configured result cap.
//! Queries trimmed shorter than two characters fall back to a browse view
//! of the leading documents.
//!
//! Snippets are a fixed-width character window anchored before the
//! earliest matched term, with newlines flattened to spaces.

use crate::config::SearchConfig;
use crate::corpus::Corpus;
use crate::models::SearchResult;

/// Split a raw query into its whitespace-delimited terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(|t| t.to_string()).collect()
}

/// Evaluate `query` against the corpus.
pub fn search(corpus: &Corpus, query: &str, limits: &SearchConfig) -> Vec<SearchResult> {
    if query.trim().chars().count() < 2 {
        return browse(corpus, limits);
    }

    let terms: Vec<String> = query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();
    if terms.is_empty() {
        return browse(corpus, limits);
    }

    let mut results = Vec::new();
    for doc in corpus.docs() {
        let lowered = doc.body.to_lowercase();
        if terms.iter().all(|t| lowered.contains(t.as_str())) {
            results.push(SearchResult {
                id: doc.id.clone(),
                snippet: snippet_at(&doc.body, &lowered, &terms, limits),
            });
            if results.len() >= limits.result_cap {
                break;
            }
        }
    }
    results
}

/// Default view for empty or too-short queries: the first `browse_limit`
/// documents in corpus order with leading-window snippets.
pub fn browse(corpus: &Corpus, limits: &SearchConfig) -> Vec<SearchResult> {
    corpus
        .docs()
        .iter()
        .take(limits.browse_limit)
        .map(|doc| SearchResult {
            id: doc.id.clone(),
            snippet: window_chars(&doc.body, 0, limits.snippet_window),
        })
        .collect()
}

/// Build the snippet stored with a saved document.
///
/// With terms, the window is anchored before the earliest match; without,
/// it is the leading window of the body.
pub fn make_snippet(body: &str, terms: &[String], limits: &SearchConfig) -> String {
    if terms.is_empty() {
        return window_chars(body, 0, limits.snippet_window);
    }
    let lowered = body.to_lowercase();
    let lowered_terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
    snippet_at(body, &lowered, &lowered_terms, limits)
}

/// Snippet around the earliest occurrence of any term.
///
/// Terms absent from the body are ignored; when none is found the window
/// starts at the beginning (a matched document always has at least one
/// hit, but the caller may pass arbitrary terms).
fn snippet_at(body: &str, lowered: &str, lowered_terms: &[String], limits: &SearchConfig) -> String {
    let first_byte = lowered_terms
        .iter()
        .filter(|t| !t.is_empty())
        .filter_map(|t| lowered.find(t.as_str()))
        .min();

    let first_char = match first_byte {
        Some(pos) => lowered[..pos].chars().count(),
        None => 0,
    };
    let start = first_char.saturating_sub(limits.snippet_lead);
    window_chars(body, start, limits.snippet_window)
}

/// A window of `len` characters starting at character `start`, with
/// newlines replaced by spaces.
fn window_chars(body: &str, start: usize, len: usize) -> String {
    body.chars()
        .skip(start)
        .take(len)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

/// CLI entry point: run a search and print the result table.
pub fn run_search(corpus: &Corpus, query: &str, limits: &SearchConfig) {
    let results = search(corpus, query, limits);
    for (i, row) in results.iter().enumerate() {
        println!("{}. {}", i + 1, row.id);
        println!("    {}", row.snippet);
    }
    println!("{} results shown.", results.len());
}
