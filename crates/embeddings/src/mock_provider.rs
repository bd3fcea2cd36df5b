//! Mock embedding provider for testing

use crate::provider::EmbeddingProvider;
use async_trait::async_trait;
use repoindex_core::error::Result;

/// Mock embedding provider that returns deterministic dummy embeddings
///
/// The first component of each vector is the character count of its text, so tests can
/// check that vectors line up with their inputs.
pub struct MockEmbeddingProvider {
    embedding_dim: usize,
    model: String,
}

impl MockEmbeddingProvider {
    /// Create a new mock provider with specified embedding dimension
    pub fn new(embedding_dim: usize) -> Self {
        Self {
            embedding_dim,
            model: format!("mock-{embedding_dim}"),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .into_iter()
            .map(|text| {
                let mut vector = vec![0.0; self.embedding_dim];
                if let Some(first) = vector.first_mut() {
                    *first = text.chars().count() as f32;
                }
                vector
            })
            .collect())
    }

    fn embedding_dimension(&self) -> usize {
        self.embedding_dim
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
