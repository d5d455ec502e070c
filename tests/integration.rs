use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn desk_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("desk");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(
        data_dir.join("corpus.csv"),
        "filename,author,text\n\
         alpha.txt,jane,The alpha memo covers Rust programming and cargo tooling.\n\
         beta.txt,joe,The beta memo discusses Python and machine learning.\n\
         gamma.txt,ada,\"Gamma notes about deployment infrastructure.\nKubernetes and Docker are mentioned here.\"\n",
    )
    .unwrap();

    let config_content = format!(
        r#"[corpus]
backend = "local"

[corpus.local]
path = "{}/data/corpus.csv"

[search]
result_cap = 500
browse_limit = 50
snippet_window = 280
snippet_lead = 120

[export]
citation_line = "Citation: internal research corpus"

[server]
bind = "127.0.0.1:7410"
"#,
        root.display()
    );

    let config_path = config_dir.join("desk.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_desk(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = desk_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run desk binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_search_finds_matching_document() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_desk(&config_path, &["search", "alpha"]);
    assert!(success, "search failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("1. alpha.txt"));
    assert!(stdout.contains("Rust programming"));
    assert!(stdout.contains("1 results shown."));
}

#[test]
fn test_search_requires_every_term() {
    let (_tmp, config_path) = setup_test_env();

    // "memo" appears in alpha and beta; "python" only in beta
    let (stdout, _, success) = run_desk(&config_path, &["search", "memo python"]);
    assert!(success);
    assert!(stdout.contains("beta.txt"));
    assert!(!stdout.contains("alpha.txt"));
    assert!(stdout.contains("1 results shown."));
}

#[test]
fn test_search_is_case_insensitive() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_desk(&config_path, &["search", "KUBERNETES docker"]);
    assert!(success);
    assert!(stdout.contains("gamma.txt"));
    assert!(stdout.contains("1 results shown."));
}

#[test]
fn test_search_absent_term_returns_nothing() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_desk(&config_path, &["search", "zzz_absent"]);
    assert!(success);
    assert!(stdout.contains("0 results shown."));
}

#[test]
fn test_search_short_query_browses_corpus_order() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_desk(&config_path, &["search", "a"]);
    assert!(success);
    assert!(stdout.contains("1. alpha.txt"));
    assert!(stdout.contains("2. beta.txt"));
    assert!(stdout.contains("3. gamma.txt"));
    assert!(stdout.contains("3 results shown."));
}

#[test]
fn test_search_snippet_flattens_newlines() {
    let (_tmp, config_path) = setup_test_env();

    // gamma.txt's body spans two lines; its snippet must not
    let (stdout, _, success) = run_desk(&config_path, &["search", "kubernetes"]);
    assert!(success);
    assert!(stdout.contains("infrastructure. Kubernetes"));
}

#[test]
fn test_search_limit_flag_caps_results() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_desk(&config_path, &["search", "memo", "--limit", "1"]);
    assert!(success);
    assert!(stdout.contains("1 results shown."));
}

#[test]
fn test_get_prints_full_document() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_desk(&config_path, &["get", "gamma.txt"]);
    assert!(success);
    assert!(stdout.contains("--- gamma.txt ---"));
    assert!(stdout.contains("Gamma notes about deployment infrastructure.\nKubernetes"));
}

#[test]
fn test_get_highlights_query_terms() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_desk(&config_path, &["get", "alpha.txt", "--query", "rust cargo"]);
    assert!(success);
    assert!(stdout.contains("**Rust**"));
    assert!(stdout.contains("**cargo**"));
}

#[test]
fn test_get_unknown_id_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_desk(&config_path, &["get", "missing.txt"]);
    assert!(!success);
    assert!(stderr.contains("no document with id 'missing.txt'"));
}

#[test]
fn test_report_to_stdout() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_desk(&config_path, &["report", "alpha.txt", "beta.txt"]);
    assert!(success);
    assert!(stdout.contains("=== Document 1 ===\nFilename: alpha.txt"));
    assert!(stdout.contains("=== Document 2 ===\nFilename: beta.txt"));
    assert_eq!(stdout.matches("Citation: internal research corpus").count(), 2);
    assert!(stdout.contains("The alpha memo covers Rust programming"));
}

#[test]
fn test_report_repeated_export_is_byte_identical() {
    let (tmp, config_path) = setup_test_env();
    let out_path = tmp.path().join("out").join("report.txt");
    let out_arg = out_path.to_str().unwrap();

    let (_, _, success1) = run_desk(
        &config_path,
        &["report", "alpha.txt", "--query", "rust", "--output", out_arg],
    );
    assert!(success1);
    let first = fs::read(&out_path).unwrap();

    let (_, _, success2) = run_desk(
        &config_path,
        &["report", "alpha.txt", "--query", "rust", "--output", out_arg],
    );
    assert!(success2);
    let second = fs::read(&out_path).unwrap();

    assert_eq!(first, second);
    assert!(String::from_utf8(first).unwrap().contains("Filename: alpha.txt"));
}

#[test]
fn test_report_skips_unknown_ids_with_warning() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_desk(&config_path, &["report", "alpha.txt", "missing.txt"]);
    assert!(success);
    assert!(stderr.contains("no document with id 'missing.txt'"));
    assert!(stdout.contains("=== Document 1 ==="));
    assert!(!stdout.contains("=== Document 2 ==="));
}

#[test]
fn test_sources_lists_local_backend() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_desk(&config_path, &["sources"]);
    assert!(success);
    assert!(stdout.contains("BACKEND"));
    assert!(stdout.contains("local"));
    assert!(stdout.contains("corpus.csv"));
    assert!(stdout.contains("true"));
}

#[test]
fn test_missing_corpus_falls_back_to_sentinel() {
    let (tmp, config_path) = setup_test_env();
    fs::remove_file(tmp.path().join("data").join("corpus.csv")).unwrap();

    // The load failure is reported once, then commands keep working
    // against the one-row sentinel corpus.
    let (stdout, stderr, success) = run_desk(&config_path, &["search", ""]);
    assert!(success, "search should not crash on a missing corpus");
    assert!(stderr.contains("Error loading corpus"));
    assert!(stdout.contains("1. load-error"));
    assert!(stdout.contains("1 results shown."));
}

#[test]
fn test_unparseable_corpus_falls_back_to_sentinel() {
    let (tmp, config_path) = setup_test_env();
    fs::write(tmp.path().join("data").join("corpus.csv"), "").unwrap();

    let (stdout, _, success) = run_desk(&config_path, &["search", ""]);
    assert!(success);
    assert!(stdout.contains("1. load-error"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let (tmp, _) = setup_test_env();
    let bad_config = tmp.path().join("config").join("bad.toml");
    fs::write(&bad_config, "[corpus]\nbackend = \"gopher\"\n").unwrap();

    let (_, stderr, success) = run_desk(&bad_config, &["sources"]);
    assert!(!success);
    assert!(stderr.contains("Unknown corpus backend"));
}
