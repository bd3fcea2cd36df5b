//! Structural parsing and chunk extraction
//!
//! Parsing and chunking sit behind two small capability traits so grammars can be
//! swapped without touching the indexing pipeline:
//!
//! - [`StructuralParser`]: file text → syntax tree, or `None` when the file cannot be
//!   parsed (unsupported extension, syntax errors)
//! - [`ChunkExtractor`]: syntax tree → ordered list of [`Chunk`]s

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use repoindex_core::{error::Result, Chunk, Language};

mod docs;
mod extractor;
mod module_path;
mod parser;

pub use extractor::FunctionChunker;
pub use module_path::derive_module_path;
pub use parser::{grammar_for_extension, TreeSitterParser};

/// Syntax tree produced by [`StructuralParser::parse`]
pub use tree_sitter::Tree;

/// Turns file text into a syntax tree
pub trait StructuralParser: Send + Sync {
    /// Parse `content` using the grammar selected by `extension` (e.g. `.py`)
    ///
    /// Returns `Ok(None)` for unsupported extensions and malformed input; `Err` is
    /// reserved for conditions such as a grammar failing to load.
    fn parse(&self, content: &str, extension: &str) -> Result<Option<Tree>>;
}

/// Per-file inputs to chunk extraction
#[derive(Debug, Clone, Copy)]
pub struct ChunkContext<'a> {
    /// Repository full name (`owner/name`)
    pub repo_full_name: &'a str,
    /// File path relative to the snapshot root
    pub file_path: &'a str,
    /// Classified language of the file
    pub language: Language,
}

/// Walks a syntax tree and emits chunks in discovery order
pub trait ChunkExtractor: Send + Sync {
    /// Extract chunks; an empty list is a valid result
    fn extract(&self, tree: &Tree, content: &str, ctx: &ChunkContext<'_>) -> Result<Vec<Chunk>>;
}
