//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_CHUNK_STRATEGY: &str = "function";
pub(crate) const DEFAULT_CLONE_BASE_URL: &str = "https://github.com";
/// Embeddings endpoint of the self-hosted `local` provider
pub const DEFAULT_LOCAL_API_BASE_URL: &str = "http://localhost:8000/v1";
/// Embeddings endpoint of the `openai` provider
pub const DEFAULT_OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable consulted when `githubToken` is absent
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
/// Environment variable consulted when `openaiApiKey` is absent
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

pub(crate) fn default_file_extensions() -> Vec<String> {
    vec![
        ".py".to_string(),
        ".js".to_string(),
        ".ts".to_string(),
        ".tsx".to_string(),
    ]
}

pub(crate) fn default_exclude_patterns() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        "dist".to_string(),
        "__pycache__".to_string(),
    ]
}

pub(crate) fn default_include_docstrings() -> bool {
    true
}

pub(crate) fn default_chunk_strategy() -> String {
    DEFAULT_CHUNK_STRATEGY.to_string()
}

pub(crate) fn default_clone_base_url() -> String {
    DEFAULT_CLONE_BASE_URL.to_string()
}

pub(crate) fn default_file_concurrency() -> usize {
    8
}

pub(crate) fn default_max_file_size_mb() -> u64 {
    5
}
