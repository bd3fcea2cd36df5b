//! Configuration loading from JSON/TOML records and environment variables

use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use super::defaults::{GITHUB_TOKEN_ENV, OPENAI_API_KEY_ENV};
use super::RunConfig;

impl RunConfig {
    /// Parse a configuration record from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid configuration record: {e}")))
    }

    /// Parse a configuration record from TOML
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| Error::config(format!("Invalid configuration record: {e}")))
    }

    /// Read a JSON configuration record from a reader (typically stdin)
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|e| Error::config(format!("Failed to read configuration record: {e}")))?;
        Self::from_json_str(&buf)
    }

    /// Load a configuration file; `.toml` files are parsed as TOML, everything else as JSON
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        debug!(
            "Loading configuration from {} ({})",
            path.display(),
            if is_toml { "toml" } else { "json" }
        );

        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Fill absent credentials from `GITHUB_TOKEN` / `OPENAI_API_KEY`
    pub fn apply_env_fallbacks(&mut self) {
        self.apply_env_fallbacks_with(|key| std::env::var(key).ok());
    }

    /// Fill absent credentials using the given variable lookup
    pub fn apply_env_fallbacks_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.github_token.trim().is_empty() {
            if let Some(token) = lookup(GITHUB_TOKEN_ENV).filter(|t| !t.is_empty()) {
                debug!("Using repository credential from {GITHUB_TOKEN_ENV}");
                self.github_token = token;
            }
        }

        let has_key = self
            .openai_api_key
            .as_ref()
            .is_some_and(|k| !k.trim().is_empty());
        if !has_key {
            self.openai_api_key = lookup(OPENAI_API_KEY_ENV).filter(|k| !k.is_empty());
        }
    }
}
