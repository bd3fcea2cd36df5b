//! Function-level chunk extraction
//!
//! Walks a syntax tree in pre-order and turns every definition node (functions,
//! methods, classes, structs, interfaces, traits, impl blocks) into a [`Chunk`].
//! Nested definitions are emitted after their parent, so a class precedes its methods.

use crate::docs::extract_docstring;
use crate::module_path::derive_module_path;
use crate::{ChunkContext, ChunkExtractor, Tree};
use repoindex_core::error::{Error, Result};
use repoindex_core::{generate_chunk_id, Chunk, ChunkType};
use tree_sitter::Node;
use tracing::debug;

/// Extracts one chunk per function/class-like definition
#[derive(Debug, Clone, Default)]
pub struct FunctionChunker;

impl FunctionChunker {
    pub fn new() -> Self {
        Self
    }
}

/// Map a definition node to its chunk type, ignoring enclosing scope
fn definition_type(node: Node) -> Option<ChunkType> {
    let chunk_type = match node.kind() {
        "function_definition"
        | "function_declaration"
        | "generator_function_declaration"
        | "function_item" => ChunkType::Function,
        "method_definition" | "method_declaration" | "constructor_declaration" => {
            ChunkType::Method
        }
        "class_definition" | "class_declaration" | "abstract_class_declaration" => {
            ChunkType::Class
        }
        // C++ forward declarations have no body
        "class_specifier" if node.child_by_field_name("body").is_some() => ChunkType::Class,
        "struct_specifier" if node.child_by_field_name("body").is_some() => ChunkType::Struct,
        "struct_item" => ChunkType::Struct,
        "interface_declaration" => ChunkType::Interface,
        "trait_item" => ChunkType::Trait,
        "impl_item" => ChunkType::Impl,
        // Go: `type Name struct {...}` / `type Name interface {...}`
        "type_spec" => match node.child_by_field_name("type").map(|t| t.kind()) {
            Some("struct_type") => ChunkType::Struct,
            Some("interface_type") => ChunkType::Interface,
            _ => return None,
        },
        _ => return None,
    };
    Some(chunk_type)
}

fn is_container(chunk_type: ChunkType) -> bool {
    matches!(
        chunk_type,
        ChunkType::Class
            | ChunkType::Struct
            | ChunkType::Interface
            | ChunkType::Trait
            | ChunkType::Impl
    )
}

fn node_text<'s>(node: Node, source: &'s str) -> Option<&'s str> {
    source.get(node.start_byte()..node.end_byte())
}

/// Resolve the name of a definition node
fn definition_name(node: Node, source: &str) -> Option<String> {
    if node.kind() == "impl_item" {
        let ty = node_text(node.child_by_field_name("type")?, source)?;
        return Some(match node.child_by_field_name("trait") {
            Some(trait_node) => format!("{} for {ty}", node_text(trait_node, source)?),
            None => ty.to_string(),
        });
    }

    if let Some(name) = node.child_by_field_name("name") {
        return node_text(name, source).map(str::to_string);
    }

    // C/C++ functions: function_definition -> declarator -> ... -> identifier
    let mut declarator = node.child_by_field_name("declarator");
    while let Some(d) = declarator {
        match d.kind() {
            "identifier" | "field_identifier" | "qualified_identifier" | "destructor_name"
            | "operator_name" | "type_identifier" => {
                return node_text(d, source).map(str::to_string);
            }
            _ => declarator = d.child_by_field_name("declarator"),
        }
    }

    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| matches!(c.kind(), "identifier" | "type_identifier"));
    found.and_then(|c| node_text(c, source)).map(str::to_string)
}

/// Name the scope a container establishes for the methods nested in it
fn scope_name(node: Node, name: &str, source: &str) -> String {
    if node.kind() == "impl_item" {
        if let Some(ty) = node.child_by_field_name("type").and_then(|t| node_text(t, source)) {
            return ty.to_string();
        }
    }
    name.to_string()
}

/// Go methods declare their owner through the receiver
fn go_receiver_type(node: Node, source: &str) -> Option<String> {
    let receiver = node.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    let param = receiver
        .named_children(&mut cursor)
        .find(|c| c.kind() == "parameter_declaration")?;
    let ty = node_text(param.child_by_field_name("type")?, source)?;
    Some(ty.trim_start_matches('*').to_string())
}

impl FunctionChunker {
    fn build_chunk(
        &self,
        node: Node,
        chunk_type: ChunkType,
        name: String,
        parent_class: Option<String>,
        content: &str,
        ctx: &ChunkContext<'_>,
    ) -> Result<Chunk> {
        let code = node_text(node, content).ok_or_else(|| {
            Error::extraction(format!(
                "Byte range {}..{} of {} is outside the file content",
                node.start_byte(),
                node.end_byte(),
                ctx.file_path
            ))
        })?;

        let start = node.start_position();
        let start_line = start.row + 1;
        let end_line = node.end_position().row + 1;

        let signature = code
            .lines()
            .next()
            .map(|line| line.trim_end().to_string());

        let id = generate_chunk_id(
            ctx.repo_full_name,
            ctx.file_path,
            &name,
            start_line,
            start.column,
            node.kind(),
        );

        Chunk::builder()
            .id(id)
            .code(code)
            .repo(ctx.repo_full_name)
            .file_path(ctx.file_path)
            .language(ctx.language)
            .chunk_type(chunk_type)
            .name(name)
            .signature(signature)
            .docstring(extract_docstring(node, content, ctx.language))
            .start_line(start_line)
            .end_line(end_line)
            .start_byte(node.start_byte())
            .end_byte(node.end_byte())
            .parent_class(parent_class)
            .module(derive_module_path(ctx.file_path, ctx.language))
            .lines_of_code(end_line - start_line + 1)
            .build()
            .map_err(|e| Error::extraction(format!("Invalid chunk in {}: {e}", ctx.file_path)))
    }
}

impl ChunkExtractor for FunctionChunker {
    fn extract(&self, tree: &Tree, content: &str, ctx: &ChunkContext<'_>) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();

        // (node, name of the enclosing class-like scope when the node sits directly in one)
        let mut stack: Vec<(Node, Option<String>)> = vec![(tree.root_node(), None)];

        while let Some((node, enclosing)) = stack.pop() {
            let mut child_scope = enclosing.clone();

            if let Some(base_type) = definition_type(node) {
                let name = definition_name(node, content)
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| format!("<anonymous_{}>", node.kind()));

                let (chunk_type, parent_class) = match base_type {
                    ChunkType::Function | ChunkType::Method => {
                        let owner = if node.kind() == "method_declaration" {
                            go_receiver_type(node, content).or(enclosing.clone())
                        } else {
                            enclosing.clone()
                        };
                        match owner {
                            Some(owner) => (ChunkType::Method, Some(owner)),
                            None => (base_type, None),
                        }
                    }
                    other => (other, None),
                };

                child_scope = if is_container(chunk_type) {
                    Some(scope_name(node, &name, content))
                } else {
                    // Functions nested in functions are not methods
                    None
                };

                chunks.push(self.build_chunk(
                    node,
                    chunk_type,
                    name,
                    parent_class,
                    content,
                    ctx,
                )?);
            }

            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            for child in children.into_iter().rev() {
                stack.push((child, child_scope.clone()));
            }
        }

        debug!("Extracted {} chunks from {}", chunks.len(), ctx.file_path);
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StructuralParser, TreeSitterParser};
    use pretty_assertions::assert_eq;
    use repoindex_core::Language;

    fn extract(source: &str, file_path: &str, language: Language) -> Vec<Chunk> {
        let ext = format!(".{}", file_path.rsplit('.').next().unwrap());
        let tree = TreeSitterParser::new()
            .parse(source, &ext)
            .unwrap()
            .expect("source should parse");
        let ctx = ChunkContext {
            repo_full_name: "octo/demo",
            file_path,
            language,
        };
        FunctionChunker::new().extract(&tree, source, &ctx).unwrap()
    }

    fn summary(chunks: &[Chunk]) -> Vec<(String, ChunkType, usize, usize, Option<String>)> {
        chunks
            .iter()
            .map(|c| {
                (
                    c.name.clone(),
                    c.chunk_type,
                    c.start_line,
                    c.end_line,
                    c.parent_class.clone(),
                )
            })
            .collect()
    }

    const PYTHON_SAMPLE: &str = "\"\"\"Module doc.\"\"\"\n\nclass Greeter:\n    \"\"\"Greets people.\"\"\"\n\n    def greet(self, name):\n        \"\"\"Return a greeting.\"\"\"\n        return f\"Hello {name}\"\n\n\ndef helper(x):\n    return x * 2\n";

    #[test]
    fn test_python_definitions_in_preorder() {
        let chunks = extract(PYTHON_SAMPLE, "pkg/greeting.py", Language::Python);

        assert_eq!(
            summary(&chunks),
            vec![
                ("Greeter".to_string(), ChunkType::Class, 3, 8, None),
                (
                    "greet".to_string(),
                    ChunkType::Method,
                    6,
                    8,
                    Some("Greeter".to_string())
                ),
                ("helper".to_string(), ChunkType::Function, 11, 12, None),
            ]
        );
    }

    #[test]
    fn test_python_chunk_metadata() {
        let chunks = extract(PYTHON_SAMPLE, "pkg/greeting.py", Language::Python);
        let greet = &chunks[1];

        assert_eq!(greet.signature.as_deref(), Some("def greet(self, name):"));
        assert_eq!(greet.docstring.as_deref(), Some("Return a greeting."));
        assert_eq!(greet.module.as_deref(), Some("pkg.greeting"));
        assert_eq!(greet.lines_of_code, 3);
        assert_eq!(greet.repo, "octo/demo");
        assert!(greet.code.starts_with("def greet(self, name):"));
        assert!(greet.code.ends_with("return f\"Hello {name}\""));
        assert_eq!(&PYTHON_SAMPLE[greet.start_byte..greet.end_byte], greet.code);

        let helper = &chunks[2];
        assert_eq!(helper.docstring, None);
        assert_eq!(helper.code, "def helper(x):\n    return x * 2");
    }

    #[test]
    fn test_chunk_ids_unique_and_stable() {
        let first = extract(PYTHON_SAMPLE, "pkg/greeting.py", Language::Python);
        let second = extract(PYTHON_SAMPLE, "pkg/greeting.py", Language::Python);

        let ids: Vec<_> = first.iter().map(|c| c.id.clone()).collect();
        let again: Vec<_> = second.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, again);

        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_nested_function_is_not_method() {
        let source = "class A:\n    def outer(self):\n        def inner():\n            pass\n        return inner\n";
        let chunks = extract(source, "a.py", Language::Python);
        let types: Vec<_> = chunks.iter().map(|c| (c.name.as_str(), c.chunk_type)).collect();
        assert_eq!(
            types,
            vec![
                ("A", ChunkType::Class),
                ("outer", ChunkType::Method),
                ("inner", ChunkType::Function),
            ]
        );
    }

    #[test]
    fn test_empty_and_definition_free_files() {
        assert!(extract("", "empty.py", Language::Python).is_empty());
        assert!(extract("x = 1\nprint(x)\n", "script.py", Language::Python).is_empty());
    }

    #[test]
    fn test_javascript_class_and_function() {
        let source = "class Counter {\n  increment() {\n    this.n += 1;\n  }\n}\n\n/** Builds a counter. */\nexport function makeCounter() {\n  return new Counter();\n}\n";
        let chunks = extract(source, "src/counter.js", Language::JavaScript);

        assert_eq!(
            summary(&chunks),
            vec![
                ("Counter".to_string(), ChunkType::Class, 1, 5, None),
                (
                    "increment".to_string(),
                    ChunkType::Method,
                    2,
                    4,
                    Some("Counter".to_string())
                ),
                ("makeCounter".to_string(), ChunkType::Function, 8, 10, None),
            ]
        );
        assert_eq!(chunks[2].docstring.as_deref(), Some("Builds a counter."));
        assert_eq!(chunks[2].module.as_deref(), Some("src/counter"));
    }

    #[test]
    fn test_typescript_interface() {
        let source = "interface Shape {\n  area(): number;\n}\n\nfunction unit(): number {\n  return 1;\n}\n";
        let chunks = extract(source, "shape.ts", Language::TypeScript);
        let types: Vec<_> = chunks.iter().map(|c| (c.name.as_str(), c.chunk_type)).collect();
        assert_eq!(
            types,
            vec![("Shape", ChunkType::Interface), ("unit", ChunkType::Function)]
        );
    }

    #[test]
    fn test_rust_items() {
        let source = "/// A point.\nstruct Point {\n    x: i32,\n}\n\ntrait Shape {\n    fn area(&self) -> f64;\n}\n\nimpl Shape for Point {\n    fn area(&self) -> f64 {\n        0.0\n    }\n}\n\nfn main() {}\n";
        let chunks = extract(source, "src/geo.rs", Language::Rust);

        assert_eq!(
            summary(&chunks),
            vec![
                ("Point".to_string(), ChunkType::Struct, 2, 4, None),
                ("Shape".to_string(), ChunkType::Trait, 6, 8, None),
                ("Shape for Point".to_string(), ChunkType::Impl, 10, 14, None),
                (
                    "area".to_string(),
                    ChunkType::Method,
                    11,
                    13,
                    Some("Point".to_string())
                ),
                ("main".to_string(), ChunkType::Function, 16, 16, None),
            ]
        );
        assert_eq!(chunks[0].docstring.as_deref(), Some("A point."));
        assert_eq!(chunks[0].module.as_deref(), Some("geo"));
    }

    #[test]
    fn test_go_struct_and_receiver_method() {
        let source = "package main\n\ntype Server struct {\n\tport int\n}\n\nfunc (s *Server) Start() error {\n\treturn nil\n}\n";
        let chunks = extract(source, "server.go", Language::Go);

        assert_eq!(
            summary(&chunks),
            vec![
                ("Server".to_string(), ChunkType::Struct, 3, 5, None),
                (
                    "Start".to_string(),
                    ChunkType::Method,
                    7,
                    9,
                    Some("Server".to_string())
                ),
            ]
        );
    }

    #[test]
    fn test_java_class_members() {
        let source = "public class App {\n    public App() {}\n\n    /** Runs the app. */\n    public void run() {}\n}\n";
        let chunks = extract(source, "src/main/java/com/acme/App.java", Language::Java);
        let types: Vec<_> = chunks.iter().map(|c| (c.name.as_str(), c.chunk_type)).collect();
        assert_eq!(
            types,
            vec![
                ("App", ChunkType::Class),
                ("App", ChunkType::Method),
                ("run", ChunkType::Method),
            ]
        );
        assert_eq!(chunks[2].docstring.as_deref(), Some("Runs the app."));
        assert_eq!(chunks[0].module.as_deref(), Some("com.acme.App"));
    }

    #[test]
    fn test_c_and_cpp_declarator_names() {
        let chunks = extract("int add(int a, int b) {\n  return a + b;\n}\n", "math.c", Language::C);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].name, "add");
        assert_eq!(chunks[0].chunk_type, ChunkType::Function);

        let source = "class Box {\npublic:\n  int size() { return 1; }\n};\n";
        let chunks = extract(source, "box.cpp", Language::Cpp);
        let types: Vec<_> = chunks.iter().map(|c| (c.name.as_str(), c.chunk_type)).collect();
        assert_eq!(types, vec![("Box", ChunkType::Class), ("size", ChunkType::Method)]);
    }
}
