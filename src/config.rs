use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    /// Which byte source backend to fetch the corpus from: `local`, `http`, or `s3`.
    pub backend: String,
    #[serde(default)]
    pub local: Option<LocalSourceConfig>,
    #[serde(default)]
    pub http: Option<HttpSourceConfig>,
    #[serde(default)]
    pub s3: Option<S3SourceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocalSourceConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSourceConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct S3SourceConfig {
    pub bucket: String,
    pub key: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, LocalStack).
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Maximum number of result rows a query may return.
    #[serde(default = "default_result_cap")]
    pub result_cap: usize,
    /// Number of documents shown for an empty or too-short query.
    #[serde(default = "default_browse_limit")]
    pub browse_limit: usize,
    /// Snippet length in characters.
    #[serde(default = "default_snippet_window")]
    pub snippet_window: usize,
    /// Characters of context kept before the first matched term.
    #[serde(default = "default_snippet_lead")]
    pub snippet_lead: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_cap: default_result_cap(),
            browse_limit: default_browse_limit(),
            snippet_window: default_snippet_window(),
            snippet_lead: default_snippet_lead(),
        }
    }
}

fn default_result_cap() -> usize {
    500
}
fn default_browse_limit() -> usize {
    50
}
fn default_snippet_window() -> usize {
    280
}
fn default_snippet_lead() -> usize {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    /// The citation line emitted under every entry's filename in the report.
    #[serde(default = "default_citation_line")]
    pub citation_line: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            citation_line: default_citation_line(),
        }
    }
}

fn default_citation_line() -> String {
    "Citation: internal research corpus".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7410".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    match config.corpus.backend.as_str() {
        "local" => {
            if config.corpus.local.is_none() {
                anyhow::bail!("backend is 'local' but [corpus.local] is missing");
            }
        }
        "http" => {
            if config.corpus.http.is_none() {
                anyhow::bail!("backend is 'http' but [corpus.http] is missing");
            }
        }
        "s3" => {
            if config.corpus.s3.is_none() {
                anyhow::bail!("backend is 's3' but [corpus.s3] is missing");
            }
        }
        other => anyhow::bail!(
            "Unknown corpus backend: '{}'. Must be local, http, or s3.",
            other
        ),
    }

    if config.search.result_cap < 1 {
        anyhow::bail!("search.result_cap must be >= 1");
    }
    if config.search.browse_limit < 1 {
        anyhow::bail!("search.browse_limit must be >= 1");
    }
    if config.search.snippet_window < 1 {
        anyhow::bail!("search.snippet_window must be >= 1");
    }
    if config.search.snippet_lead >= config.search.snippet_window {
        anyhow::bail!("search.snippet_lead must be smaller than search.snippet_window");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_minimal_local_config() {
        let file = write_config(
            r#"
[corpus]
backend = "local"

[corpus.local]
path = "./data/corpus.csv"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.corpus.backend, "local");
        assert_eq!(config.search.result_cap, 500);
        assert_eq!(config.search.browse_limit, 50);
        assert_eq!(config.search.snippet_window, 280);
        assert_eq!(config.search.snippet_lead, 120);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let file = write_config(
            r#"
[corpus]
backend = "ftp"
"#,
        );
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unknown corpus backend"));
    }

    #[test]
    fn test_backend_without_table_rejected() {
        let file = write_config(
            r#"
[corpus]
backend = "s3"
"#,
        );
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("[corpus.s3] is missing"));
    }

    #[test]
    fn test_lead_must_fit_in_window() {
        let file = write_config(
            r#"
[corpus]
backend = "local"

[corpus.local]
path = "x.csv"

[search]
snippet_window = 100
snippet_lead = 100
"#,
        );
        assert!(load_config(file.path()).is_err());
    }
}
