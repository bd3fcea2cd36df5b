//! Run statistics
//!
//! Per-file outcomes are folded into [`Statistics`] in selection order after the
//! concurrent processing phase, so totals never depend on completion order.

use repoindex_core::{Chunk, Language};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters reported in the result document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Files matching a configured extension before exclusion and truncation
    pub total_files: usize,
    /// Files parsed and chunked successfully
    pub processed_files: usize,
    /// Files that failed to read, parse, or extract
    pub skipped_files: usize,
    pub total_chunks: usize,
    /// Sum of line counts over processed files
    pub total_lines: usize,
    /// Files attempted per language, whether or not they were processed
    pub language_breakdown: BTreeMap<String, usize>,
}

/// What happened to one selected file
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Processed {
        language: Language,
        chunks: Vec<Chunk>,
        lines: usize,
    },
    Skipped {
        language: Language,
        reason: String,
    },
}

impl FileOutcome {
    pub fn language(&self) -> Language {
        match self {
            Self::Processed { language, .. } | Self::Skipped { language, .. } => *language,
        }
    }
}

impl Statistics {
    /// Empty statistics for a selection of `total_files` matches
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            ..Default::default()
        }
    }

    /// Count one file outcome, moving its chunks onto `chunks`
    pub fn record(&mut self, outcome: FileOutcome, chunks: &mut Vec<Chunk>) {
        *self
            .language_breakdown
            .entry(outcome.language().as_str().to_string())
            .or_insert(0) += 1;

        match outcome {
            FileOutcome::Processed {
                chunks: file_chunks,
                lines,
                ..
            } => {
                self.processed_files += 1;
                self.total_lines += lines;
                self.total_chunks += file_chunks.len();
                chunks.extend(file_chunks);
            }
            FileOutcome::Skipped { .. } => {
                self.skipped_files += 1;
            }
        }
    }

    /// Files that reached the processing phase
    pub fn attempted_files(&self) -> usize {
        self.processed_files + self.skipped_files
    }
}
