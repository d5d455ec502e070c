//! Corpus byte sources.
//!
//! Every ingestion backend reduces to one operation: fetch the raw bytes
//! of the named corpus source. The [`ByteSource`] trait has three
//! built-in implementations, selected by `[corpus].backend`:
//!
//! | Backend | Fetches |
//! |---------|---------|
//! | `local` | a file path |
//! | `http`  | a URL over HTTPS (rustls) |
//! | `s3`    | a single object via a SigV4-signed `GetObject` |
//!
//! The S3 backend signs requests with
//! [AWS Signature Version 4](https://docs.aws.amazon.com/AmazonS3/latest/API/sigv4-auth-using-authorization-header.html)
//! using pure-Rust primitives (`hmac`, `sha2`), reads credentials from
//! `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`,
//! and supports custom endpoints for S3-compatible services (MinIO,
//! LocalStack).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::{Config, HttpSourceConfig, LocalSourceConfig, S3SourceConfig};

type HmacSha256 = Hmac<Sha256>;

/// A corpus ingestion backend. The corpus loader is agnostic to which
/// implementation supplied the bytes.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Backend identifier: `"local"`, `"http"`, or `"s3"`.
    fn source_type(&self) -> &str;

    /// Human-readable location, for `desk sources` output.
    fn describe(&self) -> String;

    /// Cheap preflight check, without fetching anything.
    fn healthy(&self) -> bool;

    /// Fetch the raw bytes of the corpus source.
    async fn fetch_bytes(&self) -> Result<Vec<u8>>;
}

/// Select the configured backend.
pub fn resolve_source(config: &Config) -> Result<Box<dyn ByteSource>> {
    match config.corpus.backend.as_str() {
        "local" => {
            let cfg = config
                .corpus
                .local
                .clone()
                .ok_or_else(|| anyhow::anyhow!("local backend not configured"))?;
            Ok(Box::new(LocalSource { config: cfg }))
        }
        "http" => {
            let cfg = config
                .corpus
                .http
                .clone()
                .ok_or_else(|| anyhow::anyhow!("http backend not configured"))?;
            Ok(Box::new(HttpSource { config: cfg }))
        }
        "s3" => {
            let cfg = config
                .corpus
                .s3
                .clone()
                .ok_or_else(|| anyhow::anyhow!("s3 backend not configured"))?;
            Ok(Box::new(S3Source { config: cfg }))
        }
        other => bail!(
            "Unknown corpus backend: '{}'. Available: local, http, s3",
            other
        ),
    }
}

/// Fetch the corpus bytes through whichever backend the config names.
pub async fn fetch_corpus_bytes(config: &Config) -> Result<Vec<u8>> {
    resolve_source(config)?.fetch_bytes().await
}

/// CLI entry point: list the configured source and its health.
pub fn run_sources(config: &Config) -> Result<()> {
    let source = resolve_source(config)?;
    println!("{:<8} {:<48} HEALTHY", "BACKEND", "LOCATION");
    println!(
        "{:<8} {:<48} {}",
        source.source_type(),
        source.describe(),
        source.healthy()
    );
    Ok(())
}

// ============ Local file ============

struct LocalSource {
    config: LocalSourceConfig,
}

#[async_trait]
impl ByteSource for LocalSource {
    fn source_type(&self) -> &str {
        "local"
    }

    fn describe(&self) -> String {
        self.config.path.display().to_string()
    }

    fn healthy(&self) -> bool {
        self.config.path.is_file()
    }

    async fn fetch_bytes(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.config.path)
            .with_context(|| format!("Failed to read corpus file: {}", self.config.path.display()))
    }
}

// ============ HTTP ============

struct HttpSource {
    config: HttpSourceConfig,
}

#[async_trait]
impl ByteSource for HttpSource {
    fn source_type(&self) -> &str {
        "http"
    }

    fn describe(&self) -> String {
        self.config.url.clone()
    }

    fn healthy(&self) -> bool {
        self.config.url.starts_with("http://") || self.config.url.starts_with("https://")
    }

    async fn fetch_bytes(&self) -> Result<Vec<u8>> {
        let resp = reqwest::get(&self.config.url)
            .await
            .with_context(|| format!("Failed to fetch corpus from {}", self.config.url))?;

        if !resp.status().is_success() {
            bail!(
                "Corpus fetch failed (HTTP {}) for {}",
                resp.status(),
                self.config.url
            );
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

// ============ S3 ============

struct S3Source {
    config: S3SourceConfig,
}

#[async_trait]
impl ByteSource for S3Source {
    fn source_type(&self) -> &str {
        "s3"
    }

    fn describe(&self) -> String {
        format!("s3://{}/{}", self.config.bucket, self.config.key)
    }

    fn healthy(&self) -> bool {
        std::env::var("AWS_ACCESS_KEY_ID").is_ok() && std::env::var("AWS_SECRET_ACCESS_KEY").is_ok()
    }

    async fn fetch_bytes(&self) -> Result<Vec<u8>> {
        let creds = AwsCredentials::from_env()?;
        get_object(&self.config, &creds).await
    }
}

/// AWS credentials loaded from environment variables.
struct AwsCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl AwsCredentials {
    fn from_env() -> Result<Self> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID")
            .context("AWS_ACCESS_KEY_ID environment variable not set")?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .context("AWS_SECRET_ACCESS_KEY environment variable not set")?;
        let session_token = std::env::var("AWS_SESSION_TOKEN").ok();

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token,
        })
    }
}

/// Download the configured object with a signed `GetObject` request.
async fn get_object(s3_config: &S3SourceConfig, creds: &AwsCredentials) -> Result<Vec<u8>> {
    let (scheme, host) = s3_endpoint(s3_config);
    let encoded_key = s3_config
        .key
        .split('/')
        .map(uri_encode)
        .collect::<Vec<_>>()
        .join("/");
    let url = format!("{}://{}/{}", scheme, host, encoded_key);

    let now = Utc::now();
    let date_stamp = now.format("%Y%m%d").to_string();
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

    let payload_hash = hex_sha256(b"");

    let mut headers = vec![
        ("host".to_string(), host.clone()),
        ("x-amz-content-sha256".to_string(), payload_hash.clone()),
        ("x-amz-date".to_string(), amz_date.clone()),
    ];
    if let Some(ref token) = creds.session_token {
        headers.push(("x-amz-security-token".to_string(), token.clone()));
    }
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let signed_headers: String = headers
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_headers: String = headers
        .iter()
        .map(|(k, v)| format!("{}:{}\n", k, v))
        .collect();

    let canonical_uri = format!("/{}", encoded_key);
    let canonical_request = format!(
        "GET\n{}\n\n{}\n{}\n{}",
        canonical_uri, canonical_headers, signed_headers, payload_hash
    );

    let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, s3_config.region);
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        amz_date,
        credential_scope,
        hex_sha256(canonical_request.as_bytes())
    );

    let signing_key = derive_signing_key(
        &creds.secret_access_key,
        &date_stamp,
        &s3_config.region,
        "s3",
    );
    let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

    let authorization = format!(
        "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
        creds.access_key_id, credential_scope, signed_headers, signature
    );

    let client = reqwest::Client::new();
    let mut req_builder = client
        .get(&url)
        .header("Authorization", &authorization)
        .header("x-amz-content-sha256", &payload_hash)
        .header("x-amz-date", &amz_date);

    if let Some(ref token) = creds.session_token {
        req_builder = req_builder.header("x-amz-security-token", token);
    }

    let resp = req_builder.send().await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to get s3://{}/{}: {}",
            s3_config.bucket,
            s3_config.key,
            e
        )
    })?;

    if !resp.status().is_success() {
        bail!(
            "S3 GetObject failed (HTTP {}) for key '{}'",
            resp.status(),
            s3_config.key
        );
    }

    Ok(resp.bytes().await?.to_vec())
}

/// Compute the request scheme and host for the configured bucket.
///
/// A custom `endpoint_url` (MinIO, LocalStack, etc.) overrides the
/// standard `<bucket>.s3.<region>.amazonaws.com` virtual-hosted form.
fn s3_endpoint(s3_config: &S3SourceConfig) -> (&'static str, String) {
    if let Some(ref endpoint) = s3_config.endpoint_url {
        let scheme = if endpoint.starts_with("http://") {
            "http"
        } else {
            "https"
        };
        let host = endpoint
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();
        (scheme, host)
    } else {
        (
            "https",
            format!("{}.s3.{}.amazonaws.com", s3_config.bucket, s3_config.region),
        )
    }
}

/// Compute the hex-encoded SHA-256 hash of data.
fn hex_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute HMAC-SHA256 of data with the given key.
fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Compute hex-encoded HMAC-SHA256.
fn hex_hmac_sha256(key: &[u8], data: &[u8]) -> String {
    hex::encode(hmac_sha256(key, data))
}

/// Derive the AWS SigV4 signing key for a given date, region, and service.
///
/// ```text
/// kDate    = HMAC("AWS4" + secret, dateStamp)
/// kRegion  = HMAC(kDate, region)
/// kService = HMAC(kRegion, service)
/// kSigning = HMAC(kService, "aws4_request")
/// ```
fn derive_signing_key(secret_key: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(
        format!("AWS4{}", secret_key).as_bytes(),
        date_stamp.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// URI-encode a string per RFC 3986 (used in SigV4 canonical requests).
///
/// Encodes all characters except unreserved characters:
/// `A-Z a-z 0-9 - _ . ~`
fn uri_encode(s: &str) -> String {
    let mut result = String::new();
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => {
                result.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    result
}
