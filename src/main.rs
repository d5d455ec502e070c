//! # Corpus Desk CLI (`desk`)
//!
//! The `desk` binary is the primary interface for Corpus Desk. It provides
//! commands for searching the corpus, retrieving and highlighting single
//! documents, exporting reports, inspecting the configured byte source, and
//! starting the JSON HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! desk --config ./config/desk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `desk search "<query>"` | Search the corpus and print snippeted results |
//! | `desk get <id>` | Print a full document, optionally highlighted |
//! | `desk report <id>...` | Export the named documents as a text report |
//! | `desk sources` | Show the configured byte source and its health |
//! | `desk serve` | Start the JSON HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # Multi-term AND search (every term must appear in the body)
//! desk search "privacy audit" --config ./config/desk.toml
//!
//! # Read one document with the query's terms highlighted
//! desk get memo-041.txt --query "privacy audit"
//!
//! # Export a report for three documents
//! desk report memo-041.txt memo-042.txt notes.txt --output report.txt
//!
//! # Serve the corpus over HTTP
//! desk serve --config ./config/desk.toml
//! ```

mod config;
mod corpus;
mod fetch;
mod get;
mod highlight;
mod models;
mod notebook;
mod report;
mod search;
mod server;
mod session;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Corpus Desk CLI — search a fixed document corpus and export findings.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/desk.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "desk",
    about = "Corpus Desk — search a fixed document corpus, collect findings, export reports",
    version,
    long_about = "Corpus Desk loads a tabular corpus from a configured byte source (local file, \
    HTTP, or S3), answers multi-term AND queries with snippeted results, highlights matched terms \
    in full documents, and exports saved documents as a flat text report."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/desk.toml`. The corpus source, search limits,
    /// export, and server settings are read from this file.
    #[arg(long, global = true, default_value = "./config/desk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Search the corpus.
    ///
    /// Splits the query on whitespace; a document matches when every term
    /// is a case-insensitive substring of its body. Queries shorter than
    /// two characters browse the leading documents instead.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of result rows (overrides `search.result_cap`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print a full document by its identifier.
    Get {
        /// Document identifier (the resolved id column's value).
        id: String,

        /// Highlight this query's terms in the printed body.
        #[arg(long)]
        query: Option<String>,
    },

    /// Export the named documents as a flat text report.
    ///
    /// Builds a one-shot notebook from the given identifiers, in order,
    /// and renders it in report format. Unknown identifiers are skipped
    /// with a warning.
    Report {
        /// Document identifiers to include, in order.
        #[arg(required = true)]
        ids: Vec<String>,

        /// Anchor each entry's snippet on this query's terms.
        #[arg(long)]
        query: Option<String>,

        /// Write the report to this path instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the configured corpus byte source and its health.
    Sources,

    /// Start the JSON HTTP server.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// search/select/save/notebook/report endpoints with per-session state.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Sources => {
            fetch::run_sources(&cfg)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Search { query, limit } => {
            let corpus = load_corpus(&cfg).await;
            let mut limits = cfg.search.clone();
            if let Some(cap) = limit {
                limits.result_cap = cap;
            }
            search::run_search(&corpus, &query, &limits);
        }
        Commands::Get { id, query } => {
            let corpus = load_corpus(&cfg).await;
            get::run_get(&corpus, &id, query.as_deref())?;
        }
        Commands::Report { ids, query, output } => {
            let corpus = load_corpus(&cfg).await;
            report::run_report(&corpus, &ids, query.as_deref(), &cfg, output.as_deref())?;
        }
    }

    Ok(())
}

/// Fetch and parse the corpus, falling back to the sentinel on failure so
/// every command still produces readable output.
async fn load_corpus(cfg: &config::Config) -> corpus::Corpus {
    let corpus = corpus::Corpus::load_or_sentinel(fetch::fetch_corpus_bytes(cfg).await);
    let schema = corpus.schema();
    eprintln!(
        "Loaded {} documents (id column '{}', body column '{}').",
        corpus.len(),
        schema.id_column,
        schema.body_column
    );
    corpus
}
