//! Dual embedding generation for code chunks
//!
//! Every chunk gets two vectors: one from a model tuned for natural-language similarity
//! (fed a textified description of the chunk) and one from a code model (fed the raw
//! source). Both spaces are served through OpenAI-compatible endpoints.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod api_provider;
mod code_tokenizer;
pub mod config;
mod dual;
pub mod error;
mod mock_provider;
pub mod provider;
mod textify;

pub use api_provider::{create_api_provider, OpenAiApiProvider};
pub use code_tokenizer::CodeTokenizer;
pub use config::{EmbeddingConfig, EmbeddingConfigBuilder, ModelBinding};
pub use dual::{DualEmbedder, EmbeddingEngine, EmbeddingPair, EmbeddingRecord};
pub use error::EmbeddingError;
pub use mock_provider::MockEmbeddingProvider;
pub use provider::EmbeddingProvider;
pub use textify::textify;

use repoindex_core::RunConfig;

/// Create the embedding engine for a run
///
/// No network access happens here; providers are created on the first embedding call.
pub fn create_embedding_engine(config: &RunConfig) -> DualEmbedder {
    DualEmbedder::from_config(EmbeddingConfig::from_run_config(config))
}
