//! Trait definition for embedding providers

use async_trait::async_trait;
use repoindex_core::error::Result;

/// Trait for embedding providers
///
/// One provider serves one model and therefore one vector space. Implementations must
/// return exactly one vector per input text, in input order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a list of texts
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimension
    fn embedding_dimension(&self) -> usize;

    /// Model identifier, used in logs and error messages
    fn model_name(&self) -> &str;
}
