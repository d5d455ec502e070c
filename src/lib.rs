//! # Corpus Desk
//!
//! A research desk for searching a fixed corpus of text documents.
//!
//! Corpus Desk loads a tabular corpus from a pluggable byte source
//! (local file, HTTP, S3), answers multi-term AND queries with snippeted
//! result rows, renders selected documents with matched terms highlighted,
//! collects chosen documents into a session-scoped notebook, and exports
//! that notebook as a flat text report.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌───────────────────┐
//! │ ByteSource  │──▶│   Corpus     │──▶│  Search/Highlight  │
//! │ File/HTTP/S3│   │ (immutable)  │   │  Session/Notebook  │
//! └─────────────┘   └──────────────┘   └────────┬──────────┘
//!                                               │
//!                              ┌────────────────┤
//!                              ▼                ▼
//!                         ┌──────────┐    ┌──────────┐
//!                         │   CLI    │    │   HTTP   │
//!                         │  (desk)  │    │  (JSON)  │
//!                         └──────────┘    └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! desk sources                          # check the configured byte source
//! desk search "privacy audit"           # multi-term AND search
//! desk get memo-041.txt --query audit   # full document, terms highlighted
//! desk report memo-041.txt --output report.txt
//! desk serve                            # start the JSON HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`fetch`] | Corpus byte sources (local, HTTP, S3) |
//! | [`corpus`] | Corpus loading, schema resolution, id index |
//! | [`search`] | AND search and snippet generation |
//! | [`get`] | Single-document retrieval for the CLI |
//! | [`highlight`] | Term highlighting for the viewer |
//! | [`notebook`] | Session-scoped append-only notebook |
//! | [`report`] | Notebook export as a text report |
//! | [`session`] | Per-session viewer state machine |
//! | [`server`] | JSON HTTP server |

pub mod config;
pub mod corpus;
pub mod fetch;
pub mod get;
pub mod highlight;
pub mod models;
pub mod notebook;
pub mod report;
pub mod search;
pub mod server;
pub mod session;
