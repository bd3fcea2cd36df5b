//! Dual (NLP + code) embedding generation

use crate::api_provider::create_api_provider;
use crate::config::EmbeddingConfig;
use crate::error::EmbeddingError;
use crate::provider::EmbeddingProvider;
use crate::textify::textify;
use async_trait::async_trait;
use repoindex_core::error::Result;
use repoindex_core::Chunk;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// The chunk fields embedding needs
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    pub name: String,
    pub chunk_type: String,
    pub signature: Option<String>,
    pub docstring: Option<String>,
    pub file_path: String,
    pub module: Option<String>,
    pub code: String,
}

impl From<&Chunk> for EmbeddingRecord {
    fn from(chunk: &Chunk) -> Self {
        Self {
            name: chunk.name.clone(),
            chunk_type: chunk.chunk_type.to_string(),
            signature: chunk.signature.clone(),
            docstring: chunk.docstring.clone(),
            file_path: chunk.file_path.clone(),
            module: chunk.module.clone(),
            code: chunk.code.clone(),
        }
    }
}

/// One chunk's vectors: `nlp` has the NLP dimension, `code` the code dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingPair {
    pub nlp: Vec<f32>,
    pub code: Vec<f32>,
}

/// Produces one [`EmbeddingPair`] per record, in input order
#[async_trait]
pub trait EmbeddingEngine: Send + Sync {
    /// Provider tag reported in the embeddings summary
    fn provider_name(&self) -> &str;

    /// (NLP dimension, code dimension); constant for the engine's lifetime and
    /// available without any embedding call
    fn dimensions(&self) -> (usize, usize);

    /// Embed every record; the output has the same length and order as `records`
    async fn embed_batch(&self, records: &[EmbeddingRecord]) -> Result<Vec<EmbeddingPair>>;
}

struct ProviderPair {
    nlp: Arc<dyn EmbeddingProvider>,
    code: Arc<dyn EmbeddingProvider>,
}

/// Embedding engine backed by two providers, one per vector space
///
/// Providers built from configuration are created on the first embedding call, so a
/// run that never embeds never needs provider credentials.
pub struct DualEmbedder {
    provider_name: String,
    dimensions: (usize, usize),
    config: Option<EmbeddingConfig>,
    providers: OnceCell<ProviderPair>,
}

impl DualEmbedder {
    /// Create an embedder whose providers are built from `config` on first use
    pub fn from_config(config: EmbeddingConfig) -> Self {
        Self {
            provider_name: config.provider().as_str().to_string(),
            dimensions: config.dimensions(),
            config: Some(config),
            providers: OnceCell::new(),
        }
    }

    /// Create an embedder over explicit providers
    pub fn with_providers(
        provider_name: impl Into<String>,
        nlp: Arc<dyn EmbeddingProvider>,
        code: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let dimensions = (nlp.embedding_dimension(), code.embedding_dimension());
        Self {
            provider_name: provider_name.into(),
            dimensions,
            config: None,
            providers: OnceCell::new_with(Some(ProviderPair { nlp, code })),
        }
    }

    async fn providers(&self) -> Result<&ProviderPair> {
        self.providers
            .get_or_try_init(|| async {
                let config = self.config.as_ref().ok_or_else(|| {
                    EmbeddingError::ConfigError("No embedding providers configured".to_string())
                })?;
                let nlp = create_api_provider(config, config.nlp())?;
                let code = create_api_provider(config, config.code())?;
                Ok(ProviderPair {
                    nlp: Arc::from(nlp),
                    code: Arc::from(code),
                })
            })
            .await
    }
}

/// Check that a provider returned one vector of the right length per text
fn check_vectors(
    vectors: &[Vec<f32>],
    expected_count: usize,
    dimension: usize,
    model: &str,
) -> std::result::Result<(), EmbeddingError> {
    if vectors.len() != expected_count {
        return Err(EmbeddingError::CountMismatch {
            expected: expected_count,
            actual: vectors.len(),
        });
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
        return Err(EmbeddingError::DimensionMismatch {
            model: model.to_string(),
            expected: dimension,
            actual: bad.len(),
        });
    }
    Ok(())
}

#[async_trait]
impl EmbeddingEngine for DualEmbedder {
    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    async fn embed_batch(&self, records: &[EmbeddingRecord]) -> Result<Vec<EmbeddingPair>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let providers = self.providers().await?;
        let (nlp_dim, code_dim) = self.dimensions;

        let nlp_texts: Vec<String> = records.iter().map(textify).collect();
        let code_texts: Vec<String> = records.iter().map(|r| r.code.clone()).collect();

        info!(
            "Generating {} dual embeddings with {} / {}",
            records.len(),
            providers.nlp.model_name(),
            providers.code.model_name()
        );

        let (nlp_vectors, code_vectors) = futures::try_join!(
            providers.nlp.embed(nlp_texts),
            providers.code.embed(code_texts)
        )?;

        check_vectors(
            &nlp_vectors,
            records.len(),
            nlp_dim,
            providers.nlp.model_name(),
        )?;
        check_vectors(
            &code_vectors,
            records.len(),
            code_dim,
            providers.code.model_name(),
        )?;

        debug!("Received {} embedding pairs", nlp_vectors.len());

        Ok(nlp_vectors
            .into_iter()
            .zip(code_vectors)
            .map(|(nlp, code)| EmbeddingPair { nlp, code })
            .collect())
    }
}
