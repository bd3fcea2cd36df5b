//! Result and failure documents
//!
//! Exactly one of these is written to standard output per run. Field names are part of
//! the wire contract with downstream consumers: the envelope is camelCase while chunk
//! metadata keeps its snake_case keys.

use crate::stats::Statistics;
use chrono::{DateTime, Utc};
use repoindex_core::{Chunk, Error, RunConfig};
use repoindex_embeddings::EmbeddingPair;
use serde::{Deserialize, Serialize};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Repository descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    pub owner: String,
    pub name: String,
    pub branch: String,
    pub full_name: String,
}

impl RepositoryInfo {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            owner: config.owner.clone(),
            name: config.repo.clone(),
            branch: config.branch.clone(),
            full_name: config.full_name(),
        }
    }
}

/// Wall-clock window of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingWindow {
    /// UTC, second precision
    pub start_time: String,
    pub end_time: String,
    /// Seconds, rounded to two decimals
    pub duration: f64,
}

impl IndexingWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let millis = (end - start).num_milliseconds().max(0);
        Self {
            start_time: start.format(TIMESTAMP_FORMAT).to_string(),
            end_time: end.format(TIMESTAMP_FORMAT).to_string(),
            duration: (millis as f64 / 10.0).round() / 100.0,
        }
    }
}

/// Per-chunk metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub file_path: String,
    pub language: String,
    pub chunk_type: String,
    pub name: String,
    pub signature: Option<String>,
    /// Always present; `null` when docstrings are excluded or absent
    pub docstring: Option<String>,
    pub lines: [usize; 2],
    #[serde(rename = "linesOfCode")]
    pub lines_of_code: usize,
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub embeddings: Option<EmbeddingPair>,
}

/// One chunk as it appears in the result document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub code: String,
    pub metadata: ChunkMetadata,
}

impl ChunkRecord {
    pub fn from_chunk(chunk: Chunk, include_docstrings: bool) -> Self {
        Self {
            id: chunk.id,
            code: chunk.code,
            metadata: ChunkMetadata {
                file_path: chunk.file_path,
                language: chunk.language.as_str().to_string(),
                chunk_type: chunk.chunk_type.to_string(),
                name: chunk.name,
                signature: chunk.signature,
                docstring: chunk.docstring.filter(|_| include_docstrings),
                lines: [chunk.start_line, chunk.end_line],
                lines_of_code: chunk.lines_of_code,
                module: chunk.module,
                embeddings: None,
            },
        }
    }
}

/// Embedding summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingSummary {
    pub provider: String,
    pub nlp_dimension: usize,
    pub code_dimension: usize,
}

/// Successful run document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexOutput {
    pub success: bool,
    pub repository: RepositoryInfo,
    pub indexing: IndexingWindow,
    pub statistics: Statistics,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chunks: Option<Vec<ChunkRecord>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub embeddings: Option<EmbeddingSummary>,
}

/// Attach vectors to chunk records by position
///
/// Callers guarantee `pairs.len() == records.len()`.
pub(crate) fn attach_embeddings(records: &mut [ChunkRecord], pairs: Vec<EmbeddingPair>) {
    for (record, pair) in records.iter_mut().zip(pairs) {
        record.metadata.embeddings = Some(pair);
    }
}

/// Failed run document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureOutput {
    pub success: bool,
    pub error: String,
    pub error_type: String,
}

impl From<&Error> for FailureOutput {
    fn from(err: &Error) -> Self {
        Self {
            success: false,
            error: err.to_string(),
            error_type: err.kind().to_string(),
        }
    }
}
