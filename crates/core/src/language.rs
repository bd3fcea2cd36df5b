//! Extension → language classification
//!
//! Classification never fails: unknown extensions map to the table's default tag.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{AsRefStr, Display, EnumString};

/// Programming language enumeration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Language {
    Python,
    #[strum(serialize = "javascript")]
    #[serde(rename = "javascript")]
    JavaScript,
    #[strum(serialize = "typescript")]
    #[serde(rename = "typescript")]
    TypeScript,
    Rust,
    Go,
    Java,
    C,
    Cpp,
    Unknown,
}

impl Language {
    /// Lowercase tag used in statistics and chunk metadata
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

const DEFAULT_EXTENSIONS: &[(&str, Language)] = &[
    (".py", Language::Python),
    (".js", Language::JavaScript),
    (".jsx", Language::JavaScript),
    (".mjs", Language::JavaScript),
    (".cjs", Language::JavaScript),
    (".ts", Language::TypeScript),
    (".tsx", Language::TypeScript),
    (".rs", Language::Rust),
    (".go", Language::Go),
    (".java", Language::Java),
    (".c", Language::C),
    (".h", Language::C),
    (".cpp", Language::Cpp),
    (".cc", Language::Cpp),
    (".cxx", Language::Cpp),
    (".hpp", Language::Cpp),
];

/// Immutable extension → language table, built once per run
///
/// Extensions are stored with their leading dot and compared ASCII-case-insensitively,
/// the same policy file discovery uses.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    by_extension: HashMap<String, Language>,
    fallback: Language,
}

impl LanguageTable {
    /// Create a table from explicit entries
    pub fn new<I, S>(entries: I, fallback: Language) -> Self
    where
        I: IntoIterator<Item = (S, Language)>,
        S: AsRef<str>,
    {
        let by_extension = entries
            .into_iter()
            .map(|(ext, lang)| (normalize_extension(ext.as_ref()), lang))
            .collect();
        Self {
            by_extension,
            fallback,
        }
    }

    /// Classify an extension (with or without the leading dot)
    pub fn classify(&self, extension: &str) -> Language {
        self.by_extension
            .get(&normalize_extension(extension))
            .copied()
            .unwrap_or(self.fallback)
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied(), Language::Unknown)
    }
}

/// Normalize an extension to lowercase with a single leading dot
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim_start_matches('.');
    format!(".{}", trimmed.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_table() {
        let table = LanguageTable::default();
        assert_eq!(table.classify(".py"), Language::Python);
        assert_eq!(table.classify(".tsx"), Language::TypeScript);
        assert_eq!(table.classify(".jsx"), Language::JavaScript);
        assert_eq!(table.classify(".hpp"), Language::Cpp);
        assert_eq!(table.classify("rs"), Language::Rust);
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        let table = LanguageTable::default();
        assert_eq!(table.classify(".zig"), Language::Unknown);
        assert_eq!(table.classify(""), Language::Unknown);
    }

    #[test]
    fn test_case_insensitive() {
        let table = LanguageTable::default();
        assert_eq!(table.classify(".PY"), Language::Python);
        assert_eq!(table.classify("TSX"), Language::TypeScript);
    }

    #[test]
    fn test_custom_fallback() {
        let table = LanguageTable::new([(".py", Language::Python)], Language::Python);
        assert_eq!(table.classify(".weird"), Language::Python);
    }

    #[test]
    fn test_language_tags() {
        assert_eq!(Language::JavaScript.as_str(), "javascript");
        assert_eq!(Language::TypeScript.to_string(), "typescript");
        assert_eq!(Language::Cpp.as_str(), "cpp");
        assert_eq!(Language::from_str("python").ok(), Some(Language::Python));
        assert_eq!(
            serde_json::to_string(&Language::JavaScript).ok(),
            Some("\"javascript\"".to_string())
        );
    }
}
