//! Single-document retrieval for the CLI.
//!
//! Prints the canonical body for an id, optionally highlighted with a
//! query's terms the same way the viewer renders a selected row.

use anyhow::{bail, Result};

use crate::corpus::Corpus;
use crate::highlight;
use crate::search;

pub fn run_get(corpus: &Corpus, id: &str, query: Option<&str>) -> Result<()> {
    let doc = match corpus.get(id) {
        Some(d) => d,
        None => bail!("no document with id '{}'", id),
    };

    println!("--- {} ---", doc.id);
    println!();
    match query {
        Some(q) => {
            let terms = search::query_terms(q);
            println!("{}", highlight::render(&doc.body, &terms));
        }
        None => println!("{}", doc.body),
    }

    Ok(())
}
