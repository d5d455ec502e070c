//! Notebook export as a flat text report.
//!
//! Rendering reads the notebook snapshot and never mutates it; repeated
//! exports of an unchanged notebook are byte-identical.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::corpus::Corpus;
use crate::models::NotebookEntry;
use crate::notebook::Notebook;
use crate::search;

/// Report body produced for an empty notebook.
pub const EMPTY_REPORT: &str = "No items saved.\n";

/// Render saved entries into the report text.
///
/// Each entry gets a numbered header, its filename, the citation line, a
/// blank line, the full body, and a blank separator before the next entry.
pub fn render_report(entries: &[NotebookEntry], citation_line: &str) -> String {
    if entries.is_empty() {
        return EMPTY_REPORT.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("=== Document {} ===", i + 1));
        lines.push(format!("Filename: {}", entry.id));
        lines.push(citation_line.to_string());
        lines.push(String::new());
        lines.push(entry.body.clone());
        lines.push(String::new());
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Serialize a notebook into the downloadable report artifact.
pub fn export(notebook: &Notebook, citation_line: &str) -> Vec<u8> {
    render_report(notebook.snapshot(), citation_line).into_bytes()
}

/// CLI entry point: build a one-shot notebook from document ids and write
/// the report to a file or stdout.
pub fn run_report(
    corpus: &Corpus,
    ids: &[String],
    query: Option<&str>,
    config: &Config,
    output: Option<&Path>,
) -> Result<()> {
    let terms = query.map(search::query_terms).unwrap_or_default();

    let mut notebook = Notebook::new();
    for id in ids {
        match corpus.get(id) {
            Some(doc) => {
                let snippet = search::make_snippet(&doc.body, &terms, &config.search);
                notebook.append(NotebookEntry {
                    id: doc.id.clone(),
                    snippet,
                    body: doc.body.clone(),
                });
            }
            None => eprintln!("Warning: no document with id '{}'", id),
        }
    }

    let content = render_report(notebook.snapshot(), &config.export.citation_line);
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content.as_bytes())?;
            eprintln!(
                "Exported {} saved documents to {}",
                notebook.len(),
                path.display()
            );
        }
        None => {
            print!("{}", content);
        }
    }

    Ok(())
}
