//! Indexing run orchestration
//!
//! A run moves through fetch → select → process → embed → assemble → cleanup. Fetch,
//! selection, and embedding failures end the run; any failure while processing a single
//! file only marks that file as skipped.

use crate::discovery::{FileSelection, FileSelector, SelectedFile};
use crate::output::{
    attach_embeddings, ChunkRecord, EmbeddingSummary, IndexOutput, IndexingWindow,
    RepositoryInfo,
};
use crate::source::RepositorySource;
use crate::stats::{FileOutcome, Statistics};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use repoindex_core::error::{Error, Result, ResultExt};
use repoindex_core::{Chunk, Language, LanguageTable, RunConfig};
use repoindex_embeddings::{EmbeddingEngine, EmbeddingPair, EmbeddingRecord};
use repoindex_languages::{
    ChunkContext, ChunkExtractor, FunctionChunker, StructuralParser, TreeSitterParser,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Chunking strategy implemented by [`FunctionChunker`]
const FUNCTION_CHUNK_STRATEGY: &str = "function";

/// Drives one indexing run over its collaborators
pub struct IndexCoordinator {
    config: RunConfig,
    source: Arc<dyn RepositorySource>,
    parser: Arc<dyn StructuralParser>,
    extractor: Arc<dyn ChunkExtractor>,
    engine: Arc<dyn EmbeddingEngine>,
    languages: LanguageTable,
}

impl IndexCoordinator {
    /// Create a coordinator using the tree-sitter parser and function-level chunker
    pub fn new(
        config: RunConfig,
        source: Arc<dyn RepositorySource>,
        engine: Arc<dyn EmbeddingEngine>,
    ) -> Self {
        let languages = config.language_table();
        Self {
            config,
            source,
            parser: Arc::new(TreeSitterParser::new()),
            extractor: Arc::new(FunctionChunker::new()),
            engine,
            languages,
        }
    }

    /// Replace the structural parser
    pub fn with_parser(mut self, parser: Arc<dyn StructuralParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replace the chunk extractor
    pub fn with_extractor(mut self, extractor: Arc<dyn ChunkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Run the pipeline and assemble the result document
    ///
    /// The snapshot is released on every path once fetched. A cleanup failure after a
    /// successful run is logged and the result is kept; after a failed run the original
    /// error is returned.
    pub async fn run(&self) -> Result<IndexOutput> {
        let started = Utc::now();
        let full_name = self.config.full_name();
        info!("Indexing {full_name}@{}", self.config.branch);

        if self.config.chunk_strategy != FUNCTION_CHUNK_STRATEGY {
            warn!(
                "Unsupported chunk strategy {:?}, using function-level chunking",
                self.config.chunk_strategy
            );
        }

        let snapshot = self
            .source
            .fetch(&self.config.owner, &self.config.repo, &self.config.branch)
            .await
            .inspect_err(|e| error!("Failed to fetch {full_name}: {e}"))?;

        let result = self.index_snapshot(snapshot.root(), started).await;
        let cleanup = self.source.cleanup(snapshot).await;

        match (result, cleanup) {
            (Ok(output), Ok(())) => Ok(output),
            (Ok(output), Err(e)) => {
                warn!("Failed to release snapshot of {full_name}: {e}");
                Ok(output)
            }
            (Err(e), cleanup) => {
                error!("Indexing {full_name} failed: {e}");
                if let Err(cleanup_err) = cleanup {
                    warn!("Failed to release snapshot of {full_name}: {cleanup_err}");
                }
                Err(e)
            }
        }
    }

    async fn index_snapshot(&self, root: &Path, started: DateTime<Utc>) -> Result<IndexOutput> {
        let selection = self.select(root).await?;

        let (statistics, chunks) = self.process_files(&selection).await;
        info!(
            "Processed {} files ({} skipped), {} chunks",
            statistics.processed_files, statistics.skipped_files, statistics.total_chunks
        );

        let format = self.config.output_format;
        let pairs = if format.includes_embeddings() {
            Some(self.embed(&chunks).await?)
        } else {
            None
        };

        let chunk_records = format.includes_chunks().then(|| {
            let mut records: Vec<ChunkRecord> = chunks
                .into_iter()
                .map(|c| ChunkRecord::from_chunk(c, self.config.include_docstrings))
                .collect();
            if let Some(pairs) = pairs {
                attach_embeddings(&mut records, pairs);
            }
            records
        });

        let embeddings = format.includes_embeddings().then(|| {
            let (nlp_dimension, code_dimension) = self.engine.dimensions();
            EmbeddingSummary {
                provider: self.engine.provider_name().to_string(),
                nlp_dimension,
                code_dimension,
            }
        });

        let indexing = IndexingWindow::new(started, Utc::now());
        info!("Indexing finished in {:.2}s", indexing.duration);

        Ok(IndexOutput {
            success: true,
            repository: RepositoryInfo::from_config(&self.config),
            indexing,
            statistics,
            chunks: chunk_records,
            embeddings,
        })
    }

    async fn select(&self, root: &Path) -> Result<FileSelection> {
        let selector = FileSelector::from_config(&self.config);
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || selector.select(&root))
            .await
            .map_err(|e| Error::discovery(format!("File selection task failed: {e}")))?
    }

    /// Process selected files concurrently, folding outcomes in selection order
    async fn process_files(&self, selection: &FileSelection) -> (Statistics, Vec<Chunk>) {
        let concurrency = self.config.file_concurrency.max(1);
        let outcomes: Vec<FileOutcome> = stream::iter(&selection.files)
            .map(|file| self.process_file(file))
            .buffered(concurrency)
            .collect()
            .await;

        let mut statistics = Statistics::new(selection.total_matched);
        let mut chunks = Vec::new();
        for outcome in outcomes {
            statistics.record(outcome, &mut chunks);
        }
        (statistics, chunks)
    }

    async fn process_file(&self, file: &SelectedFile) -> FileOutcome {
        let language = self.languages.classify(&file.extension);
        match self.try_process_file(file, language).await {
            Ok((chunks, lines)) => {
                debug!(
                    "Extracted {} chunks from {}",
                    chunks.len(),
                    file.relative_path
                );
                FileOutcome::Processed {
                    language,
                    chunks,
                    lines,
                }
            }
            Err(e) => {
                warn!("Skipping {}: {e}", file.relative_path);
                FileOutcome::Skipped {
                    language,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Read, parse, and chunk one file; any error becomes the skip reason
    async fn try_process_file(
        &self,
        file: &SelectedFile,
        language: Language,
    ) -> Result<(Vec<Chunk>, usize)> {
        let metadata = tokio::fs::metadata(&file.path)
            .await
            .context("failed to stat file")?;
        let limit = self.config.max_file_size_bytes();
        if metadata.len() > limit {
            return Err(Error::invalid_input(format!(
                "file size {} bytes exceeds limit of {limit} bytes",
                metadata.len()
            )));
        }

        let content = tokio::fs::read_to_string(&file.path)
            .await
            .context("failed to read file")?;

        let parser = Arc::clone(&self.parser);
        let extractor = Arc::clone(&self.extractor);
        let repo_full_name = self.config.full_name();
        let relative_path = file.relative_path.clone();
        let extension = file.extension.clone();

        tokio::task::spawn_blocking(move || -> Result<(Vec<Chunk>, usize)> {
            let tree = parser
                .parse(&content, &extension)?
                .ok_or_else(|| Error::parse(relative_path.as_str(), "no usable syntax tree"))?;

            let ctx = ChunkContext {
                repo_full_name: &repo_full_name,
                file_path: &relative_path,
                language,
            };
            let chunks = extractor.extract(&tree, &content, &ctx)?;

            Ok((chunks, count_lines(&content)))
        })
        .await
        .map_err(|e| Error::extraction(format!("processing task failed: {e}")))?
    }

    /// Embed every chunk once, keeping positional correspondence
    async fn embed(&self, chunks: &[Chunk]) -> Result<Vec<EmbeddingPair>> {
        if chunks.is_empty() {
            debug!("No chunks to embed");
            return Ok(Vec::new());
        }

        let records: Vec<EmbeddingRecord> = chunks.iter().map(EmbeddingRecord::from).collect();
        info!(
            "Embedding {} chunks with provider {}",
            records.len(),
            self.engine.provider_name()
        );

        let pairs = self
            .engine
            .embed_batch(&records)
            .await
            .inspect_err(|e| error!("Embedding failed: {e}"))?;

        if pairs.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "Expected {} embedding pairs, received {}",
                chunks.len(),
                pairs.len()
            )));
        }
        Ok(pairs)
    }
}

/// Count lines, treating `\n`, `\r\n`, and a lone `\r` as terminators
fn count_lines(content: &str) -> usize {
    let bytes = content.as_bytes();
    let mut lines = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => lines += 1,
            b'\r' => {
                lines += 1;
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    if !content.is_empty() && !content.ends_with(['\n', '\r']) {
        lines += 1;
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("x = 1"), 1);
        assert_eq!(count_lines("a\nb\n"), 2);
        assert_eq!(count_lines("a\r\nb\r\nc"), 3);
        assert_eq!(count_lines("a\rb\rc\r"), 3);
        assert_eq!(count_lines("\n\n"), 2);
        assert_eq!(count_lines("a\r\n\rb"), 3);
    }
}
