//! Tests for configuration loading and the outcome document

use pretty_assertions::assert_eq;
use repoindex::{execute, load_config, Outcome};
use repoindex_core::OutputFormat;
use std::io::Cursor;
use tempfile::TempDir;

#[test]
fn test_load_config_from_stdin() {
    let stdin = Cursor::new(
        r#"{"owner": "octo", "repo": "demo", "branch": "main", "githubToken": "t",
            "outputFormat": "chunks", "maxFiles": 10}"#,
    );

    let config = load_config(None, stdin).unwrap();

    assert_eq!(config.full_name(), "octo/demo");
    assert_eq!(config.output_format, OutputFormat::Chunks);
    assert_eq!(config.file_limit(), Some(10));
    assert_eq!(config.file_extensions, vec![".py", ".js", ".ts", ".tsx"]);
}

#[test]
fn test_load_config_from_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.toml");
    std::fs::write(
        &path,
        r#"
owner = "octo"
repo = "demo"
branch = "dev"
githubToken = "t"
outputFormat = "metadata"
excludePatterns = ["vendor"]
"#,
    )
    .unwrap();

    // stdin is ignored when a file is given
    let config = load_config(Some(&path), Cursor::new("not json")).unwrap();

    assert_eq!(config.branch, "dev");
    assert_eq!(config.output_format, OutputFormat::MetadataOnly);
    assert_eq!(config.exclude_patterns, vec!["vendor"]);
}

#[test]
fn test_malformed_record_is_config_error() {
    let err = load_config(None, Cursor::new("{ owner: ")).unwrap_err();
    assert_eq!(err.kind(), "ConfigError");
}

#[tokio::test]
async fn test_missing_owner_yields_failure_document() {
    let stdin = Cursor::new(r#"{"repo": "demo", "branch": "main", "githubToken": "t"}"#);

    let outcome = execute(None, stdin, std::future::pending::<()>()).await;

    assert!(!outcome.is_success());
    let value: serde_json::Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["errorType"], "ConfigError");
    assert!(value["error"].as_str().unwrap().contains("owner"));
    assert!(matches!(outcome, Outcome::Failure(_)));
}

#[tokio::test]
async fn test_unreachable_repository_yields_fetch_failure() {
    let remote = TempDir::new().unwrap();
    let stdin = Cursor::new(format!(
        r#"{{"owner": "octo", "repo": "missing", "branch": "main", "githubToken": "t",
            "cloneBaseUrl": "file://{}"}}"#,
        remote.path().display()
    ));

    let outcome = execute(None, stdin, std::future::pending::<()>()).await;

    let value: serde_json::Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
    assert_eq!(value["errorType"], "FetchError");
}
