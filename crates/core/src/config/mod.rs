//! Run configuration for a single indexing run
//!
//! The configuration record is read once at startup (JSON on stdin, or a JSON/TOML
//! file) and is immutable for the rest of the run. Keys are camelCase.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use crate::language::LanguageTable;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOCAL_API_BASE_URL, DEFAULT_OPENAI_API_BASE_URL, GITHUB_TOKEN_ENV, OPENAI_API_KEY_ENV,
};

use defaults::*;

/// Which embedding backend binds the NLP and code vector spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Self-hosted OpenAI-compatible server running sentence-transformer models
    #[default]
    Local,
    /// OpenAI embeddings API
    #[serde(rename = "openai")]
    OpenAi,
}

impl EmbeddingProviderKind {
    /// Tag reported in the embeddings summary
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::OpenAi => "openai",
        }
    }
}

/// Shape of the result document
///
/// Unrecognized values deserialize to [`OutputFormat::MetadataOnly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Chunks, embeddings summary, and per-chunk vectors
    #[default]
    Full,
    /// Chunks without embeddings
    Chunks,
    /// Same payload as `Full`
    ChunksEmbeddings,
    /// Repository, timing, and statistics only
    #[serde(other)]
    MetadataOnly,
}

impl OutputFormat {
    /// Whether the chunk list is part of the result
    pub fn includes_chunks(&self) -> bool {
        matches!(self, Self::Full | Self::Chunks | Self::ChunksEmbeddings)
    }

    /// Whether embeddings are generated and attached
    pub fn includes_embeddings(&self) -> bool {
        matches!(self, Self::Full | Self::ChunksEmbeddings)
    }
}

/// Configuration record for one indexing run
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Repository owner (required)
    #[serde(default)]
    pub owner: String,

    /// Repository name (required)
    #[serde(default)]
    pub repo: String,

    /// Branch to snapshot (required)
    #[serde(default)]
    pub branch: String,

    /// Credential used to retrieve the snapshot (required, or `GITHUB_TOKEN`)
    #[serde(default)]
    pub github_token: String,

    /// Credential for the `openai` provider (or `OPENAI_API_KEY`)
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Embedding provider selector
    #[serde(default)]
    pub embedding_provider: EmbeddingProviderKind,

    /// Output format selector
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Maximum number of files to process (0 or negative = unlimited)
    #[serde(default)]
    pub max_files: i64,

    /// Ordered list of file extensions to select
    #[serde(default = "default_file_extensions")]
    pub file_extensions: Vec<String>,

    /// Literal substrings; any relative path containing one is excluded
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// When false the docstring field is nulled in the output (extraction still runs)
    #[serde(default = "default_include_docstrings")]
    pub include_docstrings: bool,

    /// Chunking strategy tag (only function-level semantics are implemented)
    #[serde(default = "default_chunk_strategy")]
    pub chunk_strategy: String,

    /// Override for the OpenAI-compatible embeddings endpoint
    #[serde(default)]
    pub embedding_api_base_url: Option<String>,

    /// Base URL repositories are cloned from
    #[serde(default = "default_clone_base_url")]
    pub clone_base_url: String,

    /// Number of files read and parsed concurrently
    #[serde(default = "default_file_concurrency")]
    pub file_concurrency: usize,

    /// Files larger than this are skipped
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("github_token", &"[REDACTED]")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("embedding_provider", &self.embedding_provider)
            .field("output_format", &self.output_format)
            .field("max_files", &self.max_files)
            .field("file_extensions", &self.file_extensions)
            .field("exclude_patterns", &self.exclude_patterns)
            .field("include_docstrings", &self.include_docstrings)
            .field("chunk_strategy", &self.chunk_strategy)
            .field("embedding_api_base_url", &self.embedding_api_base_url)
            .field("clone_base_url", &self.clone_base_url)
            .field("file_concurrency", &self.file_concurrency)
            .field("max_file_size_mb", &self.max_file_size_mb)
            .finish()
    }
}

impl RunConfig {
    /// Create a configuration for a repository with every optional field at its default
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        github_token: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            github_token: github_token.into(),
            openai_api_key: None,
            embedding_provider: EmbeddingProviderKind::default(),
            output_format: OutputFormat::default(),
            max_files: 0,
            file_extensions: default_file_extensions(),
            exclude_patterns: default_exclude_patterns(),
            include_docstrings: default_include_docstrings(),
            chunk_strategy: default_chunk_strategy(),
            embedding_api_base_url: None,
            clone_base_url: default_clone_base_url(),
            file_concurrency: default_file_concurrency(),
            max_file_size_mb: default_max_file_size_mb(),
        }
    }

    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Maximum file count, `None` when unlimited
    pub fn file_limit(&self) -> Option<usize> {
        usize::try_from(self.max_files).ok().filter(|&n| n > 0)
    }

    /// Maximum file size in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Base URL of the embeddings endpoint for the selected provider
    pub fn embedding_api_base_url(&self) -> String {
        match (&self.embedding_api_base_url, self.embedding_provider) {
            (Some(url), _) => url.clone(),
            (None, EmbeddingProviderKind::Local) => DEFAULT_LOCAL_API_BASE_URL.to_string(),
            (None, EmbeddingProviderKind::OpenAi) => DEFAULT_OPENAI_API_BASE_URL.to_string(),
        }
    }

    /// Language table used for classification during this run
    pub fn language_table(&self) -> LanguageTable {
        LanguageTable::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("owner", &self.owner),
            ("repo", &self.repo),
            ("branch", &self.branch),
            ("githubToken", &self.github_token),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config(format!(
                    "Missing required configuration field: {key}"
                )));
            }
        }

        if let Some(bad) = self
            .file_extensions
            .iter()
            .find(|ext| !ext.starts_with('.') || ext.len() < 2)
        {
            return Err(Error::config(format!(
                "File extension {bad:?} must start with '.' and name an extension"
            )));
        }

        if self.file_concurrency == 0 {
            return Err(Error::config("fileConcurrency must be greater than 0"));
        }

        Ok(())
    }
}
