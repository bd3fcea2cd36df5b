//! Core types and traits for the repository indexing pipeline
//!
//! This crate provides the foundational abstractions shared by every stage:
//!
//! - **Chunks**: semantic units of code with location and descriptive metadata
//! - **Languages**: the immutable extension → language table
//! - **Configuration**: the run configuration record and its loading
//! - **Error handling**: unified error types and the failure `kind` tags
//!

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod chunk;
pub mod chunk_id;
pub mod config;
pub mod error;
pub mod language;

// Re-export main types for convenience
pub use chunk::{Chunk, ChunkBuilder, ChunkType};
pub use chunk_id::generate_chunk_id;
pub use config::{EmbeddingProviderKind, OutputFormat, RunConfig};
pub use error::{Error, Result, ResultExt};
pub use language::{Language, LanguageTable};

