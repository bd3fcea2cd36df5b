//! Natural-language rendering of chunks for the NLP vector space

use crate::code_tokenizer::CodeTokenizer;
use crate::dual::EmbeddingRecord;

/// Describe a chunk as a plain sentence
///
/// Names and signatures are humanized (`getUserName` → `Get user name`), the docstring,
/// file name and module are appended, punctuation is replaced by spaces, and runs of
/// whitespace are collapsed.
pub fn textify(record: &EmbeddingRecord) -> String {
    let tokenizer = CodeTokenizer::new();

    let mut parts = vec![format!(
        "{} {}",
        record.chunk_type,
        tokenizer.humanize(&record.name)
    )];

    if let Some(doc) = record.docstring.as_deref().filter(|d| !d.is_empty()) {
        parts.push(format!("that does {doc}"));
    }

    if let Some(signature) = record.signature.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("defined as {}", tokenizer.humanize(signature)));
    }

    let file_name = record.file_path.rsplit('/').next().unwrap_or_default();
    parts.push(format!("in file {file_name}"));

    if let Some(module) = record.module.as_deref().filter(|m| !m.is_empty()) {
        parts.push(format!("module {module}"));
    }

    let text: String = parts
        .join(" ")
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> EmbeddingRecord {
        EmbeddingRecord {
            name: "greetUser".to_string(),
            chunk_type: "function".to_string(),
            signature: Some("def greetUser(name):".to_string()),
            docstring: Some("Say hi.".to_string()),
            file_path: "src/app.py".to_string(),
            module: Some("src.app".to_string()),
            code: "def greetUser(name):\n    return name".to_string(),
        }
    }

    #[test]
    fn test_textify_full_record() {
        assert_eq!(
            textify(&record()),
            "function Greet user that does Say hi defined as Def greet user name in file app py module src app"
        );
    }

    #[test]
    fn test_textify_without_optional_parts() {
        let mut rec = record();
        rec.docstring = None;
        rec.signature = Some(String::new());
        rec.module = None;
        rec.chunk_type = "class".to_string();
        rec.name = "HTTPServer".to_string();
        assert_eq!(textify(&rec), "class Http server in file app py");
    }

    #[test]
    fn test_textify_keeps_underscore_words() {
        let mut rec = record();
        rec.docstring = Some("Uses max_retries (see __init__)!".to_string());
        let text = textify(&rec);
        assert!(text.contains("Uses max_retries see __init__"));
    }
}
