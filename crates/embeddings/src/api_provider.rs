//! OpenAI-compatible API provider for embeddings (OpenAI, self-hosted servers)

use crate::{
    config::{EmbeddingConfig, ModelBinding},
    error::EmbeddingError,
    provider::EmbeddingProvider,
};
use async_openai::types::{CreateEmbeddingRequest, EmbeddingInput};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use repoindex_core::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Maximum characters per API batch request
const MAX_BATCH_CHARS: usize = 131_072;

/// Texts longer than this are truncated before being sent.
/// Treating 1 char = 1 token to stay under the 8k-token context of the hosted models.
const MAX_TEXT_CHARS: usize = 8_000;

/// OpenAI-compatible API provider serving one model
pub struct OpenAiApiProvider {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
    batch_size: usize,
    max_concurrent: usize,
    concurrency_limiter: Arc<Semaphore>,
    retry_attempts: usize,
}

impl OpenAiApiProvider {
    /// Create a provider for one model binding of the configuration
    pub fn new(
        config: &EmbeddingConfig,
        binding: &ModelBinding,
    ) -> std::result::Result<Self, EmbeddingError> {
        config.validate()?;

        info!("Initializing OpenAI-compatible API embeddings");
        info!("  Model: {} ({} dims)", binding.model, binding.dimension);
        info!("  Base URL: {}", config.api_base_url);
        debug!("  Batch size: {}", config.texts_per_api_request);
        debug!(
            "  Max concurrent requests: {}",
            config.max_concurrent_api_requests
        );
        debug!("  Retry attempts: {}", config.retry_attempts);

        let mut openai_config = OpenAIConfig::new().with_api_base(&config.api_base_url);
        if let Some(ref api_key) = config.api_key {
            openai_config = openai_config.with_api_key(api_key);
        }

        Ok(Self {
            client: Client::with_config(openai_config),
            model: binding.model.clone(),
            dimensions: binding.dimension,
            batch_size: config.texts_per_api_request,
            max_concurrent: config.max_concurrent_api_requests,
            concurrency_limiter: Arc::new(Semaphore::new(config.max_concurrent_api_requests)),
            retry_attempts: config.retry_attempts,
        })
    }

    /// Cut a text to at most `MAX_TEXT_CHARS` characters
    fn clamp_text(index: usize, text: String) -> String {
        match text.char_indices().nth(MAX_TEXT_CHARS) {
            Some((byte_idx, _)) => {
                debug!("Text at index {index} exceeds {MAX_TEXT_CHARS} chars, truncating");
                text[..byte_idx].to_string()
            }
            None => text,
        }
    }

    /// Group texts into batches bounded by character count and `batch_size`
    fn build_batches(&self, texts: Vec<String>) -> Vec<Vec<(usize, String)>> {
        let mut batches: Vec<Vec<(usize, String)>> = Vec::new();
        let mut current_batch: Vec<(usize, String)> = Vec::new();
        let mut current_batch_chars: usize = 0;

        for (idx, text) in texts.into_iter().enumerate() {
            let text = Self::clamp_text(idx, text);
            let char_count = text.chars().count();

            if current_batch_chars + char_count > MAX_BATCH_CHARS && !current_batch.is_empty() {
                batches.push(std::mem::take(&mut current_batch));
                current_batch_chars = 0;
            }

            current_batch.push((idx, text));
            current_batch_chars += char_count;

            if current_batch.len() >= self.batch_size {
                batches.push(std::mem::take(&mut current_batch));
                current_batch_chars = 0;
            }
        }

        if !current_batch.is_empty() {
            batches.push(current_batch);
        }

        batches
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiApiProvider {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let total = texts.len();
        let batches = self.build_batches(texts);
        debug!(
            "Created {} batches for {total} texts with model {}",
            batches.len(),
            self.model
        );

        let results = stream::iter(batches)
            .map(|batch| {
                let limiter = self.concurrency_limiter.clone();
                let client = self.client.clone();
                let model = self.model.clone();
                let dimensions = self.dimensions;
                let retry_attempts = self.retry_attempts;

                async move {
                    let (indices, texts_to_embed): (Vec<usize>, Vec<String>) =
                        batch.into_iter().unzip();

                    let _permit = limiter.acquire_owned().await.map_err(|e| {
                        EmbeddingError::InferenceError(format!(
                            "Failed to acquire concurrency permit: {e}"
                        ))
                    })?;

                    let mut attempt = 0;

                    loop {
                        let request = CreateEmbeddingRequest {
                            model: model.clone(),
                            input: EmbeddingInput::StringArray(texts_to_embed.clone()),
                            encoding_format: None,
                            dimensions: None,
                            user: None,
                        };

                        match client.embeddings().create(request).await {
                            Ok(response) => {
                                // Sort by response index, the API does not promise order
                                let mut sorted: Vec<(usize, Vec<f32>)> = response
                                    .data
                                    .into_iter()
                                    .map(|emb| (emb.index as usize, emb.embedding))
                                    .collect();
                                sorted.sort_by_key(|(idx, _)| *idx);

                                if sorted.len() != indices.len() {
                                    return Err(EmbeddingError::CountMismatch {
                                        expected: indices.len(),
                                        actual: sorted.len(),
                                    });
                                }

                                for (_, embedding) in &sorted {
                                    if embedding.len() != dimensions {
                                        return Err(EmbeddingError::DimensionMismatch {
                                            model: model.clone(),
                                            expected: dimensions,
                                            actual: embedding.len(),
                                        });
                                    }
                                }

                                let results: Vec<(usize, Vec<f32>)> = indices
                                    .into_iter()
                                    .zip(sorted.into_iter().map(|(_, emb)| emb))
                                    .collect();

                                return Ok::<_, EmbeddingError>(results);
                            }
                            Err(e) if attempt < retry_attempts => {
                                attempt += 1;

                                // Exponential backoff: 1s, 2s, 4s, ... capped at 30s
                                let backoff_secs = (2u64.pow(attempt as u32 - 1)).min(30);
                                let backoff = Duration::from_secs(backoff_secs);
                                warn!(
                                    "Embedding request to {model} failed: {e}. Retrying in {backoff:?} (attempt {attempt}/{retry_attempts})"
                                );
                                tokio::time::sleep(backoff).await;
                            }
                            Err(e) => {
                                return Err(EmbeddingError::InferenceError(format!(
                                    "API request to {model} failed after {} attempts: {e}",
                                    attempt + 1
                                )));
                            }
                        }
                    }
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect::<Vec<_>>()
            .await;

        // Place results back into their original positions
        let mut slots: Vec<Option<Vec<f32>>> = vec![None; total];
        for result in results {
            for (orig_idx, embedding) in result? {
                if let Some(slot) = slots.get_mut(orig_idx) {
                    *slot = Some(embedding);
                }
            }
        }

        let embeddings: Vec<Vec<f32>> = slots.into_iter().flatten().collect();
        if embeddings.len() != total {
            return Err(EmbeddingError::CountMismatch {
                expected: total,
                actual: embeddings.len(),
            }
            .into());
        }

        Ok(embeddings)
    }

    fn embedding_dimension(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Create a boxed provider for one model binding
pub fn create_api_provider(
    config: &EmbeddingConfig,
    binding: &ModelBinding,
) -> Result<Box<dyn EmbeddingProvider>> {
    let provider = OpenAiApiProvider::new(config, binding)?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingConfigBuilder;
    use repoindex_core::EmbeddingProviderKind;

    fn provider(batch_size: usize) -> OpenAiApiProvider {
        let config = EmbeddingConfigBuilder::new(EmbeddingProviderKind::Local)
            .texts_per_api_request(batch_size)
            .build();
        let binding = config.nlp().clone();
        OpenAiApiProvider::new(&config, &binding).unwrap()
    }

    #[test]
    fn test_batches_respect_batch_size_and_order() {
        let provider = provider(2);
        let texts: Vec<String> = (0..5).map(|i| format!("text {i}")).collect();
        let batches = provider.build_batches(texts);

        assert_eq!(batches.len(), 3);
        let indices: Vec<usize> = batches.iter().flatten().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_long_text_is_truncated() {
        let long = "é".repeat(MAX_TEXT_CHARS + 10);
        let clamped = OpenAiApiProvider::clamp_text(0, long);
        assert_eq!(clamped.chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn test_openai_without_key_is_rejected() {
        let config = EmbeddingConfig::for_provider(EmbeddingProviderKind::OpenAi);
        let binding = config.nlp().clone();
        assert!(matches!(
            OpenAiApiProvider::new(&config, &binding),
            Err(EmbeddingError::MissingCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_request() {
        let provider = provider(8);
        let result = provider.embed(Vec::new()).await.unwrap();
        assert!(result.is_empty());
    }
}
