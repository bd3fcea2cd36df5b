use thiserror::Error;

/// Result type for indexing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for indexing operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The repository snapshot could not be acquired
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Candidate files could not be enumerated
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Parsing errors when processing source code
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// Chunk extraction errors
    #[error("Chunk extraction error: {0}")]
    Extraction(String),

    /// Embedding generation errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The repository snapshot could not be released
    #[error("Cleanup error: {0}")]
    Cleanup(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The run was interrupted before completion
    #[error("Indexing cancelled: {0}")]
    Cancelled(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a snapshot fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Creates a file discovery error
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Creates a parse error
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Creates a chunk extraction error
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Creates an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Creates a cleanup error
    pub fn cleanup(msg: impl Into<String>) -> Self {
        Self::Cleanup(msg.into())
    }

    /// Creates an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a cancellation error
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Stable tag written as `errorType` in the failure document
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "IoError",
            Self::Config(_) => "ConfigError",
            Self::Fetch(_) => "FetchError",
            Self::Discovery(_) => "DiscoveryError",
            Self::Parse { .. } => "ParseError",
            Self::Extraction(_) => "ExtractionError",
            Self::Embedding(_) => "EmbeddingError",
            Self::Cleanup(_) => "CleanupError",
            Self::InvalidInput(_) => "InvalidInput",
            Self::Cancelled(_) => "Cancelled",
            Self::WithContext { source, .. } => match source.downcast_ref::<Error>() {
                Some(inner) => inner.kind(),
                None => "InternalError",
            },
            Self::Other(_) => "InternalError",
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Error::config("x").kind(), "ConfigError");
        assert_eq!(Error::fetch("x").kind(), "FetchError");
        assert_eq!(Error::discovery("x").kind(), "DiscoveryError");
        assert_eq!(Error::embedding("x").kind(), "EmbeddingError");
        assert_eq!(Error::cleanup("x").kind(), "CleanupError");
        assert_eq!(Error::cancelled("x").kind(), "Cancelled");
        assert_eq!(
            Error::Other(anyhow::anyhow!("boom")).kind(),
            "InternalError"
        );
    }

    #[test]
    fn test_context_keeps_inner_kind() {
        let inner: std::result::Result<(), Error> = Err(Error::fetch("clone failed"));
        let err = inner.context("Failed to acquire snapshot").unwrap_err();
        assert_eq!(err.kind(), "FetchError");
        assert!(err.to_string().starts_with("Failed to acquire snapshot"));
    }

    #[test]
    fn test_context_on_io_error() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = io.context("Reading file").unwrap_err();
        assert_eq!(err.kind(), "InternalError");
        assert_eq!(err.to_string(), "Reading file: missing");
    }
}
