//! Tree-sitter backed structural parser

use crate::StructuralParser;
use repoindex_core::error::{Error, Result};
use repoindex_core::language::normalize_extension;
use tree_sitter::{Parser, Tree};
use tracing::debug;

/// Get the tree-sitter grammar for an extension, if one is bundled
pub fn grammar_for_extension(extension: &str) -> Option<tree_sitter::Language> {
    let grammar = match normalize_extension(extension).as_str() {
        ".py" => tree_sitter_python::LANGUAGE.into(),
        ".js" | ".jsx" | ".mjs" | ".cjs" => tree_sitter_javascript::LANGUAGE.into(),
        ".ts" => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        ".tsx" => tree_sitter_typescript::LANGUAGE_TSX.into(),
        ".rs" => tree_sitter_rust::LANGUAGE.into(),
        ".go" => tree_sitter_go::LANGUAGE.into(),
        ".java" => tree_sitter_java::LANGUAGE.into(),
        ".c" | ".h" => tree_sitter_c::LANGUAGE.into(),
        ".cpp" | ".cc" | ".cxx" | ".hpp" => tree_sitter_cpp::LANGUAGE.into(),
        _ => return None,
    };
    Some(grammar)
}

/// Multi-language parser using tree-sitter
///
/// A fresh `tree_sitter::Parser` is created per call, so one instance can be shared
/// across concurrent file workers. Trees containing syntax errors are treated as
/// unparseable.
#[derive(Debug, Clone, Default)]
pub struct TreeSitterParser;

impl TreeSitterParser {
    pub fn new() -> Self {
        Self
    }
}

impl StructuralParser for TreeSitterParser {
    fn parse(&self, content: &str, extension: &str) -> Result<Option<Tree>> {
        let Some(grammar) = grammar_for_extension(extension) else {
            debug!("No grammar bundled for extension {extension}");
            return Ok(None);
        };

        let mut parser = Parser::new();
        parser.set_language(&grammar).map_err(|e| {
            Error::parse(extension, format!("Failed to load grammar: {e}"))
        })?;

        let Some(tree) = parser.parse(content, None) else {
            debug!("Parser produced no tree for {extension} content");
            return Ok(None);
        };

        if tree.root_node().has_error() {
            debug!("Rejecting {extension} tree containing syntax errors");
            return Ok(None);
        }

        Ok(Some(tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_supported_languages() {
        let parser = TreeSitterParser::new();
        let samples = [
            (".py", "def f(x):\n    return x\n"),
            (".js", "function f(x) { return x; }\n"),
            (".jsx", "const App = () => <div>hi</div>;\n"),
            (".ts", "function f(x: number): number { return x; }\n"),
            (".tsx", "const App = (): JSX.Element => <div>hi</div>;\n"),
            (".rs", "fn f(x: i32) -> i32 { x }\n"),
            (".go", "package main\n\nfunc f(x int) int { return x }\n"),
            (".java", "class A { int f(int x) { return x; } }\n"),
            (".c", "int f(int x) { return x; }\n"),
            (".cpp", "class A { public: int f(int x) { return x; } };\n"),
        ];

        for (ext, source) in samples {
            let tree = parser.parse(source, ext).unwrap();
            assert!(tree.is_some(), "expected a tree for {ext}");
        }
    }

    #[test]
    fn test_unsupported_extension_returns_none() {
        let parser = TreeSitterParser::new();
        assert!(parser.parse("fn main() {}", ".zig").unwrap().is_none());
        assert!(parser.parse("", "").unwrap().is_none());
    }

    #[test]
    fn test_syntax_errors_return_none() {
        let parser = TreeSitterParser::new();
        let broken = "def broken(:\n    pass\n";
        assert!(parser.parse(broken, ".py").unwrap().is_none());
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert!(grammar_for_extension(".PY").is_some());
        assert!(grammar_for_extension("tsx").is_some());
        assert!(grammar_for_extension(".md").is_none());
    }

    #[test]
    fn test_empty_file_parses() {
        let parser = TreeSitterParser::new();
        let tree = parser.parse("", ".py").unwrap().unwrap();
        assert_eq!(tree.root_node().named_child_count(), 0);
    }
}
