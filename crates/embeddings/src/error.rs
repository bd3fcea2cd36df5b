//! Error types for the embeddings module

use std::fmt;

/// Errors that can occur during embedding operations
#[derive(Debug)]
pub enum EmbeddingError {
    /// A provider credential is required but was not supplied
    MissingCredential(String),

    /// Inference failed
    InferenceError(String),

    /// A vector came back with the wrong length
    DimensionMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },

    /// The provider returned a different number of vectors than texts sent
    CountMismatch { expected: usize, actual: usize },

    /// Configuration error
    ConfigError(String),
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential(msg) => write!(f, "Missing credential: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference failed: {msg}"),
            Self::DimensionMismatch {
                model,
                expected,
                actual,
            } => write!(
                f,
                "Dimension mismatch for {model}: expected {expected}, got {actual}"
            ),
            Self::CountMismatch { expected, actual } => {
                write!(f, "Expected {expected} embeddings, got {actual}")
            }
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for EmbeddingError {}

impl From<EmbeddingError> for repoindex_core::error::Error {
    fn from(err: EmbeddingError) -> Self {
        repoindex_core::error::Error::Embedding(err.to_string())
    }
}
