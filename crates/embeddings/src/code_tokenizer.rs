//! Identifier-aware tokenizer used to humanize code names

use unicode_segmentation::UnicodeSegmentation;

/// Splits identifiers into lowercase words
///
/// Tokenization strategy:
/// 1. Split into unicode words (drops punctuation)
/// 2. Split on underscores (snake_case: get_user_name → ["get", "user", "name"])
/// 3. Split on camelCase boundaries (getUserName → ["get", "user", "name"])
/// 4. Normalize to lowercase
#[derive(Debug, Clone, Default)]
pub struct CodeTokenizer;

impl CodeTokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Split a camelCase or PascalCase string into components
    ///
    /// Examples (after lowercase normalization):
    /// - "getUserName" → ["get", "user", "name"]
    /// - "HTTPResponse" → ["http", "response"]
    /// - "IOError" → ["io", "error"]
    fn split_camel_case(s: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut current = String::new();
        let mut chars = s.chars().peekable();
        let mut prev_char: Option<char> = None;

        while let Some(ch) = chars.next() {
            let should_split = if let Some(prev) = prev_char {
                // Split on lowercase → uppercase transition (camelCase)
                (prev.is_lowercase() && ch.is_uppercase())
                    // Split on multiple uppercase followed by lowercase (HTTPResponse)
                    || (prev.is_uppercase()
                        && ch.is_uppercase()
                        && chars.peek().is_some_and(|next| next.is_lowercase()))
            } else {
                false
            };

            if should_split && !current.is_empty() {
                result.push(std::mem::take(&mut current));
            }

            current.push(ch);
            prev_char = Some(ch);
        }

        if !current.is_empty() {
            result.push(current);
        }

        result
    }

    /// Tokenize text into lowercase words
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .flat_map(|word| word.split('_'))
            .filter(|part| !part.is_empty())
            .flat_map(Self::split_camel_case)
            .map(|token| token.to_lowercase())
            .collect()
    }

    /// Turn an identifier or signature into a sentence fragment
    ///
    /// `parseHTTPRequest` → `Parse http request`
    pub fn humanize(&self, text: &str) -> String {
        let joined = self.tokenize(text).join(" ");
        let mut chars = joined.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
