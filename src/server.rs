//! JSON HTTP server for the research desk.
//!
//! Exposes the search/viewer/notebook workflow over a small JSON API. The
//! corpus is loaded once at startup and shared immutably across all
//! requests; everything mutable lives in per-session [`Session`] values
//! keyed by the `x-session-id` request header, so concurrent users never
//! see or corrupt one another's notebooks.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/search` | Run a search in the caller's session |
//! | `GET`  | `/documents/{id}` | Fetch one document, optional `?query=` highlight |
//! | `POST` | `/select` | Select a row of the session's displayed results |
//! | `POST` | `/save` | Save the selected document into the session notebook |
//! | `GET`  | `/notebook` | Session notebook snapshot |
//! | `GET`  | `/notebook/report` | Download the notebook as a text report |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "document not found: x.txt" } }
//! ```
//!
//! Malformed request bodies are rejected by the JSON extractor with 400;
//! resolution failures return `not_found` (404). Failed operations leave
//! session state exactly as it was.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::corpus::Corpus;
use crate::fetch;
use crate::highlight;
use crate::models::{NotebookEntry, SearchResult};
use crate::report;
use crate::search;
use crate::session::{RenderedDocument, Session};

/// Request header carrying the caller's session identifier. Requests
/// without it share the `"default"` session.
const SESSION_HEADER: &str = "x-session-id";

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    corpus: Arc<Corpus>,
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<Session>>>>>,
}

/// Fetch and load the corpus, then serve it.
///
/// A fetch or parse failure does not abort startup: the server comes up
/// with the one-row sentinel corpus so clients get a readable error row
/// instead of connection refusals.
///
/// This is the entry point used by the `desk serve` command.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let corpus = Corpus::load_or_sentinel(fetch::fetch_corpus_bytes(config).await);
    run_server_with_corpus(config, Arc::new(corpus)).await
}

/// Serve an already-loaded corpus.
///
/// Binds to the address configured in `[server].bind` and runs until the
/// process is terminated. Split out from [`run_server`] so tests can serve
/// an in-memory corpus without touching a byte source.
pub async fn run_server_with_corpus(config: &Config, corpus: Arc<Corpus>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();

    let state = AppState {
        config: Arc::new(config.clone()),
        corpus,
        sessions: Arc::new(RwLock::new(HashMap::new())),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/search", post(handle_search))
        .route("/documents/{id}", get(handle_document))
        .route("/select", post(handle_select))
        .route("/save", post(handle_save))
        .route("/notebook", get(handle_notebook))
        .route("/notebook/report", get(handle_report))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state.clone());

    println!(
        "Corpus desk server listening on http://{} ({} documents)",
        bind_addr,
        state.corpus.len()
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// The caller's session, created on first use.
async fn session_for(state: &AppState, headers: &HeaderMap) -> Arc<Mutex<Session>> {
    let id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("default")
        .to_string();

    if let Some(session) = state.sessions.read().await.get(&id) {
        return session.clone();
    }

    let mut sessions = state.sessions.write().await;
    sessions
        .entry(id)
        .or_insert_with(|| Arc::new(Mutex::new(Session::new())))
        .clone()
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"not_found"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /search ============

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
}

/// JSON response body for `POST /search`.
#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
    count: usize,
}

/// Handler for `POST /search`.
///
/// Runs the query and replaces the session's displayed result set. The
/// viewer keeps whatever document it had selected.
async fn handle_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let session = session_for(&state, &headers).await;
    let mut session = session.lock().await;

    let results = session
        .run_search(&state.corpus, &req.query, &state.config.search)
        .to_vec();
    Json(SearchResponse {
        count: results.len(),
        results,
    })
}

// ============ GET /documents/{id} ============

#[derive(Deserialize)]
struct DocumentParams {
    query: Option<String>,
}

/// JSON response body for `GET /documents/{id}`.
#[derive(Serialize)]
struct DocumentResponse {
    id: String,
    body: String,
}

/// Handler for `GET /documents/{id}`.
///
/// Returns the canonical body; with `?query=`, the body comes back with
/// the query's terms marked, the same rendering the viewer shows.
async fn handle_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DocumentParams>,
) -> Result<Json<DocumentResponse>, AppError> {
    let doc = state
        .corpus
        .get(&id)
        .ok_or_else(|| not_found(format!("document not found: {}", id)))?;

    let body = match params.query {
        Some(ref q) => highlight::render(&doc.body, &search::query_terms(q)),
        None => doc.body.clone(),
    };

    Ok(Json(DocumentResponse {
        id: doc.id.clone(),
        body,
    }))
}

// ============ POST /select ============

#[derive(Deserialize)]
struct SelectRequest {
    /// Index into the currently displayed result set.
    row: usize,
}

/// Handler for `POST /select`.
///
/// Resolves the row index against the session's displayed results, never
/// against corpus position. Resolution failures return 404 and leave the
/// viewer in its prior state.
async fn handle_select(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SelectRequest>,
) -> Result<Json<RenderedDocument>, AppError> {
    let session = session_for(&state, &headers).await;
    let mut session = session.lock().await;

    session
        .select(&state.corpus, req.row)
        .map(Json)
        .map_err(|e| not_found(e.to_string()))
}

// ============ POST /save, GET /notebook ============

/// JSON response body for `POST /save` and `GET /notebook`.
#[derive(Serialize)]
struct NotebookResponse {
    entries: Vec<NotebookEntry>,
    count: usize,
}

/// Handler for `POST /save`.
///
/// Appends the selected document to the session notebook and returns the
/// preview rows. With nothing selected this is a no-op returning the
/// existing snapshot, or the placeholder row when the notebook is empty.
async fn handle_save(State(state): State<AppState>, headers: HeaderMap) -> Json<NotebookResponse> {
    let session = session_for(&state, &headers).await;
    let mut session = session.lock().await;

    let entries = session.save(&state.corpus, &state.config.search);
    Json(NotebookResponse {
        count: entries.len(),
        entries,
    })
}

/// Handler for `GET /notebook`.
async fn handle_notebook(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<NotebookResponse> {
    let session = session_for(&state, &headers).await;
    let session = session.lock().await;

    let entries = session.notebook().snapshot().to_vec();
    Json(NotebookResponse {
        count: entries.len(),
        entries,
    })
}

// ============ GET /notebook/report ============

/// Handler for `GET /notebook/report`.
///
/// Serves the session notebook as a downloadable flat text artifact.
/// Exporting never mutates the notebook; repeated downloads of an
/// unchanged notebook are byte-identical.
async fn handle_report(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = session_for(&state, &headers).await;
    let session = session.lock().await;

    let bytes = report::export(session.notebook(), &state.config.export.citation_line);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"notebook-report.txt\"",
            ),
        ],
        bytes,
    )
        .into_response()
}
