//! Documentation extraction
//!
//! Python documents definitions with a leading string literal in the body; every other
//! supported language uses comments immediately above the definition.

use repoindex_core::Language;
use tree_sitter::Node;

/// Maximum number of documentation lines to collect for one definition
const MAX_DOC_LINES: usize = 200;

/// Extract the documentation attached to a definition node
pub(crate) fn extract_docstring(node: Node, source: &str, language: Language) -> Option<String> {
    let doc = match language {
        Language::Python => python_docstring(node, source),
        _ => preceding_doc_comments(doc_anchor(node, language), source, language),
    }?;

    if doc.is_empty() {
        None
    } else {
        Some(doc)
    }
}

/// Python docstrings are the first expression in the body if it's a string literal
fn python_docstring(node: Node, source: &str) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let first_stmt = body.named_child(0)?;

    if first_stmt.kind() != "expression_statement" {
        return None;
    }
    let expr = first_stmt.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }

    let text = expr.utf8_text(source.as_bytes()).ok()?;
    Some(normalize_docstring(text))
}

/// Strip string prefixes and quotes, then trim surrounding whitespace
fn normalize_docstring(text: &str) -> String {
    text.trim_start_matches(['r', 'R', 'u', 'U', 'b', 'B'])
        .trim_start_matches("\"\"\"")
        .trim_start_matches("'''")
        .trim_start_matches('"')
        .trim_start_matches('\'')
        .trim_end_matches("\"\"\"")
        .trim_end_matches("'''")
        .trim_end_matches('"')
        .trim_end_matches('\'')
        .trim()
        .to_string()
}

/// The node whose preceding siblings hold the documentation
///
/// `export function f()` is wrapped in an `export_statement`, so its doc comment sits
/// before the wrapper rather than before the function itself.
fn doc_anchor(node: Node, language: Language) -> Node {
    if matches!(language, Language::JavaScript | Language::TypeScript) {
        if let Some(parent) = node.parent() {
            if parent.kind() == "export_statement" {
                return parent;
            }
        }
    }
    node
}

fn is_comment_kind(kind: &str) -> bool {
    matches!(kind, "comment" | "line_comment" | "block_comment")
}

/// Collect adjacent comments directly above `node`, top to bottom
fn preceding_doc_comments(node: Node, source: &str, language: Language) -> Option<String> {
    let mut doc_lines = Vec::new();
    let mut expected_row = node.start_position().row;
    let mut current = node.prev_sibling();

    while let Some(sibling) = current {
        if doc_lines.len() >= MAX_DOC_LINES {
            break;
        }

        // A blank line separates unrelated comments from the definition
        if sibling.end_position().row + 1 < expected_row {
            break;
        }

        let kind = sibling.kind();
        if language == Language::Rust && kind == "attribute_item" {
            expected_row = sibling.start_position().row;
            current = sibling.prev_sibling();
            continue;
        }
        if !is_comment_kind(kind) {
            break;
        }

        let text = sibling.utf8_text(source.as_bytes()).ok()?;
        match comment_text(text, language) {
            Some(lines) => doc_lines.extend(lines.into_iter().rev()),
            None => break,
        }

        expected_row = sibling.start_position().row;
        current = sibling.prev_sibling();
    }

    if doc_lines.is_empty() {
        return None;
    }

    doc_lines.reverse();
    Some(doc_lines.join("\n").trim().to_string())
}

/// Strip comment markers; `None` means the comment is not documentation
fn comment_text(text: &str, language: Language) -> Option<Vec<String>> {
    let text = text.trim_end();

    if language == Language::Rust {
        if text.starts_with("////") {
            return None;
        }
        if let Some(rest) = text.strip_prefix("///") {
            return Some(vec![rest.trim().to_string()]);
        }
        if text.starts_with("/**") && !text.starts_with("/***") {
            return Some(block_lines(text));
        }
        return None;
    }

    if text.starts_with("/*") {
        return Some(block_lines(text));
    }
    if let Some(rest) = text.strip_prefix("//") {
        return Some(vec![rest.trim_start_matches('/').trim().to_string()]);
    }
    None
}

/// Clean a `/* ... */` or `/** ... */` block into its text lines
fn block_lines(text: &str) -> Vec<String> {
    let inner = text
        .trim_start_matches("/**")
        .trim_start_matches("/*")
        .trim_end_matches("*/");

    inner
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
