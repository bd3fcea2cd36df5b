//! Repository indexing pipeline
//!
//! Fetches a repository snapshot, selects source files, parses and chunks each file with
//! per-file fault isolation, generates dual embeddings for the chunk list, and assembles
//! a single result document. The snapshot is released whether or not the run succeeds.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod coordinator;
pub mod discovery;
pub mod output;
pub mod source;
pub mod stats;

pub use coordinator::IndexCoordinator;
pub use discovery::{FileSelection, FileSelector, SelectedFile};
pub use output::{
    ChunkMetadata, ChunkRecord, EmbeddingSummary, FailureOutput, IndexOutput, IndexingWindow,
    RepositoryInfo,
};
pub use source::{GitRepositorySource, RepoSnapshot, RepositorySource};
pub use stats::{FileOutcome, Statistics};

// Re-export error types from core
pub use repoindex_core::error::{Error, Result};

use repoindex_core::RunConfig;
use std::sync::Arc;

/// Index the repository described by `config` with the default collaborators
///
/// Snapshots are shallow git clones from `config.clone_base_url`; embeddings come from
/// the provider `config.embedding_provider` selects.
pub async fn index_repository(config: RunConfig) -> Result<IndexOutput> {
    config.validate()?;

    let source = Arc::new(GitRepositorySource::new(
        config.clone_base_url.clone(),
        config.github_token.clone(),
    ));
    let engine = Arc::new(repoindex_embeddings::create_embedding_engine(&config));

    IndexCoordinator::new(config, source, engine).run().await
}
