//! repoindex - index a remote repository into chunks and dual embeddings
//!
//! Reads one JSON configuration record (stdin or `--config`), writes one JSON result
//! document to stdout. Logs go to stderr.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use clap::Parser;
use repoindex::execute;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repoindex")]
#[command(about = "Index a repository into code chunks with dual embeddings")]
#[command(version)]
struct Cli {
    /// Configuration file path (JSON or TOML); read from stdin when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let outcome = execute(
        cli.config.as_deref(),
        std::io::stdin().lock(),
        tokio::signal::ctrl_c(),
    )
    .await;

    let (document, success) = outcome.render();
    if let Err(e) = write_document(&document) {
        error!("Failed to write result document: {e:#}");
        return ExitCode::FAILURE;
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Initialize logging on stderr; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "repoindex={level},repoindex_core={level},repoindex_languages={level},\
             repoindex_embeddings={level},repoindex_indexer={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_document(document: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{document}")?;
    stdout.flush()
}
