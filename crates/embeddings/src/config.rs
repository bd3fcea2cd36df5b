//! Configuration for embedding generation
//!
//! An [`EmbeddingConfig`] binds the two vector spaces (NLP and code) to concrete models.
//! It is built once per run, and the dimensions it reports never change afterwards.

use repoindex_core::config::{DEFAULT_LOCAL_API_BASE_URL, DEFAULT_OPENAI_API_BASE_URL};
use repoindex_core::{EmbeddingProviderKind, RunConfig};
use serde::{Deserialize, Serialize};

use crate::error::EmbeddingError;

/// Model used for the NLP space by the `local` provider
pub const LOCAL_NLP_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
const LOCAL_NLP_DIMENSION: usize = 384;

/// Model used for the code space by the `local` provider
pub const LOCAL_CODE_MODEL: &str = "jinaai/jina-embeddings-v2-base-code";
const LOCAL_CODE_DIMENSION: usize = 768;

/// Model used for both spaces by the `openai` provider
pub const OPENAI_MODEL: &str = "text-embedding-3-small";
const OPENAI_DIMENSION: usize = 1536;

/// A model and the length of the vectors it produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelBinding {
    pub model: String,
    pub dimension: usize,
}

impl ModelBinding {
    pub fn new(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            model: model.into(),
            dimension,
        }
    }
}

/// Configuration for dual embedding generation
#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider selector
    pub(crate) provider: EmbeddingProviderKind,

    /// Model for natural-language similarity
    pub(crate) nlp: ModelBinding,

    /// Model for code similarity
    pub(crate) code: ModelBinding,

    /// OpenAI-compatible endpoint
    pub(crate) api_base_url: String,

    /// API key for authentication
    pub(crate) api_key: Option<String>,

    /// Number of texts per API request
    pub(crate) texts_per_api_request: usize,

    /// Maximum number of concurrent API requests per model
    pub(crate) max_concurrent_api_requests: usize,

    /// Retries per failed request
    pub(crate) retry_attempts: usize,
}

impl EmbeddingConfig {
    /// Default model bindings for a provider
    pub fn for_provider(provider: EmbeddingProviderKind) -> Self {
        let (nlp, code, api_base_url) = match provider {
            EmbeddingProviderKind::Local => (
                ModelBinding::new(LOCAL_NLP_MODEL, LOCAL_NLP_DIMENSION),
                ModelBinding::new(LOCAL_CODE_MODEL, LOCAL_CODE_DIMENSION),
                DEFAULT_LOCAL_API_BASE_URL,
            ),
            EmbeddingProviderKind::OpenAi => (
                ModelBinding::new(OPENAI_MODEL, OPENAI_DIMENSION),
                ModelBinding::new(OPENAI_MODEL, OPENAI_DIMENSION),
                DEFAULT_OPENAI_API_BASE_URL,
            ),
        };

        Self {
            provider,
            nlp,
            code,
            api_base_url: api_base_url.to_string(),
            api_key: None,
            texts_per_api_request: 32,
            max_concurrent_api_requests: 4,
            retry_attempts: 3,
        }
    }

    /// Build the embedding configuration for a run
    pub fn from_run_config(config: &RunConfig) -> Self {
        let mut builder = EmbeddingConfigBuilder::new(config.embedding_provider)
            .api_base_url(config.embedding_api_base_url());
        if let Some(key) = config.openai_api_key.as_ref().filter(|k| !k.is_empty()) {
            builder = builder.api_key(key.clone());
        }
        builder.build()
    }

    pub fn provider(&self) -> EmbeddingProviderKind {
        self.provider
    }

    pub fn nlp(&self) -> &ModelBinding {
        &self.nlp
    }

    pub fn code(&self) -> &ModelBinding {
        &self.code
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// (NLP dimension, code dimension)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.nlp.dimension, self.code.dimension)
    }

    /// Check the configuration is usable for embedding calls
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.provider == EmbeddingProviderKind::OpenAi && self.api_key.is_none() {
            return Err(EmbeddingError::MissingCredential(
                "OpenAI API key required when embeddingProvider is 'openai'".to_string(),
            ));
        }
        if self.texts_per_api_request == 0 {
            return Err(EmbeddingError::ConfigError(
                "texts_per_api_request must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrent_api_requests == 0 {
            return Err(EmbeddingError::ConfigError(
                "max_concurrent_api_requests must be greater than 0".to_string(),
            ));
        }
        if self.nlp.model.is_empty() || self.code.model.is_empty() {
            return Err(EmbeddingError::ConfigError(
                "Model name cannot be empty".to_string(),
            ));
        }
        if self.nlp.dimension == 0 || self.code.dimension == 0 {
            return Err(EmbeddingError::ConfigError(
                "Embedding dimension must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("provider", &self.provider)
            .field("nlp", &self.nlp)
            .field("code", &self.code)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("texts_per_api_request", &self.texts_per_api_request)
            .field(
                "max_concurrent_api_requests",
                &self.max_concurrent_api_requests,
            )
            .field("retry_attempts", &self.retry_attempts)
            .finish()
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::for_provider(EmbeddingProviderKind::default())
    }
}

/// Builder for EmbeddingConfig
pub struct EmbeddingConfigBuilder {
    provider: EmbeddingProviderKind,
    nlp: Option<ModelBinding>,
    code: Option<ModelBinding>,
    api_base_url: Option<String>,
    api_key: Option<String>,
    texts_per_api_request: Option<usize>,
    max_concurrent_api_requests: Option<usize>,
    retry_attempts: Option<usize>,
}

impl EmbeddingConfigBuilder {
    /// Create a builder starting from the provider's default bindings
    pub fn new(provider: EmbeddingProviderKind) -> Self {
        Self {
            provider,
            nlp: None,
            code: None,
            api_base_url: None,
            api_key: None,
            texts_per_api_request: None,
            max_concurrent_api_requests: None,
            retry_attempts: None,
        }
    }

    /// Override the NLP model binding
    pub fn nlp_model(mut self, model: impl Into<String>, dimension: usize) -> Self {
        self.nlp = Some(ModelBinding::new(model, dimension));
        self
    }

    /// Override the code model binding
    pub fn code_model(mut self, model: impl Into<String>, dimension: usize) -> Self {
        self.code = Some(ModelBinding::new(model, dimension));
        self
    }

    /// Set the API base URL
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the number of texts per API request
    pub fn texts_per_api_request(mut self, count: usize) -> Self {
        self.texts_per_api_request = Some(count);
        self
    }

    /// Set the maximum number of concurrent API requests
    pub fn max_concurrent_api_requests(mut self, count: usize) -> Self {
        self.max_concurrent_api_requests = Some(count);
        self
    }

    /// Set the number of retry attempts
    pub fn retry_attempts(mut self, attempts: usize) -> Self {
        self.retry_attempts = Some(attempts);
        self
    }

    /// Build the configuration, using provider defaults for unset fields
    pub fn build(self) -> EmbeddingConfig {
        let defaults = EmbeddingConfig::for_provider(self.provider);

        EmbeddingConfig {
            provider: self.provider,
            nlp: self.nlp.unwrap_or(defaults.nlp),
            code: self.code.unwrap_or(defaults.code),
            api_base_url: self.api_base_url.unwrap_or(defaults.api_base_url),
            api_key: self.api_key.or(defaults.api_key),
            texts_per_api_request: self
                .texts_per_api_request
                .unwrap_or(defaults.texts_per_api_request),
            max_concurrent_api_requests: self
                .max_concurrent_api_requests
                .unwrap_or(defaults.max_concurrent_api_requests),
            retry_attempts: self.retry_attempts.unwrap_or(defaults.retry_attempts),
        }
    }
}
