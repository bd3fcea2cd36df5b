//! Library interface for the repoindex CLI
//!
//! The binary reads one configuration record, runs the indexing pipeline, and writes
//! exactly one JSON document to standard output. Everything except process setup lives
//! here so it can be exercised from tests.

use repoindex_core::{Error, Result, RunConfig};
use repoindex_indexer::{FailureOutput, IndexOutput};
use std::future::Future;
use std::io::Read;
use std::path::Path;
use tracing::{error, info, warn};

/// Final state of one invocation
#[derive(Debug)]
pub enum Outcome {
    Success(Box<IndexOutput>),
    Failure(FailureOutput),
}

impl Outcome {
    pub fn from_result(result: Result<IndexOutput>) -> Self {
        match result {
            Ok(output) => Self::Success(Box::new(output)),
            Err(e) => Self::Failure(FailureOutput::from(&e)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Pretty-printed JSON document for standard output
    pub fn to_json(&self) -> anyhow::Result<String> {
        let json = match self {
            Self::Success(output) => serde_json::to_string_pretty(output)?,
            Self::Failure(failure) => serde_json::to_string_pretty(failure)?,
        };
        Ok(json)
    }

    /// The document to print and whether it reports success
    ///
    /// A document that cannot be serialized is replaced by an `InternalError` failure
    /// document, so exactly one JSON document is always produced.
    pub fn render(&self) -> (String, bool) {
        with_failure_fallback(self.to_json(), self.is_success())
    }
}

fn with_failure_fallback(json: anyhow::Result<String>, success: bool) -> (String, bool) {
    match json {
        Ok(json) => (json, success),
        Err(e) => {
            error!("Failed to serialize result document: {e:#}");
            let failure = FailureOutput::from(&Error::Other(e));
            let document = serde_json::json!({
                "success": failure.success,
                "error": failure.error,
                "errorType": failure.error_type,
            });
            (document.to_string(), false)
        }
    }
}

/// Load the run configuration from `path`, or from `stdin` when no path is given
///
/// Missing credentials are filled from the environment before validation.
pub fn load_config(path: Option<&Path>, stdin: impl Read) -> Result<RunConfig> {
    let mut config = match path {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::from_reader(stdin)?,
    };
    config.apply_env_fallbacks();
    config.validate()?;
    Ok(config)
}

/// Drive `run` to completion unless `shutdown` resolves first
///
/// Dropping the run future releases any snapshot it holds before this returns.
pub async fn run_until<F, S>(run: F, shutdown: S) -> Result<IndexOutput>
where
    F: Future<Output = Result<IndexOutput>>,
    S: Future,
{
    tokio::select! {
        result = run => result,
        _ = shutdown => {
            warn!("Interrupted, abandoning indexing run");
            Err(Error::cancelled("Interrupted by signal"))
        }
    }
}

/// Load configuration, index, and produce the outcome document
pub async fn execute<S>(config_path: Option<&Path>, stdin: impl Read, shutdown: S) -> Outcome
where
    S: Future,
{
    let config = match load_config(config_path, stdin) {
        Ok(config) => config,
        Err(e) => return Outcome::Failure(FailureOutput::from(&e)),
    };
    info!(
        "Indexing {} ({:?} output)",
        config.full_name(),
        config.output_format
    );

    Outcome::from_result(run_until(repoindex_indexer::index_repository(config), shutdown).await)
}
