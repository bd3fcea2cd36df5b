//! Module path derivation from repository-relative file paths

use repoindex_core::Language;

/// Derive a module path from a `/`-separated file path relative to the snapshot root
///
/// # Examples
/// - Python `pkg/utils/helpers.py` -> `Some("pkg.utils.helpers")`
/// - Python `pkg/__init__.py` -> `Some("pkg")`, root `__init__.py` -> `None`
/// - Rust `src/net/client.rs` -> `Some("net::client")`, `src/lib.rs` -> `Some("crate")`
/// - Java `src/main/java/com/acme/App.java` -> `Some("com.acme.App")`
/// - JS/TS `src/models/index.ts` -> `Some("src/models")`
/// - anything else: path without extension, e.g. `cmd/server/main.go` -> `Some("cmd/server/main")`
pub fn derive_module_path(file_path: &str, language: Language) -> Option<String> {
    let (dirs, stem) = split_path(file_path)?;

    match language {
        Language::Python => python_module(dirs, stem),
        Language::Rust => Some(rust_module(dirs, stem)),
        Language::Java => Some(java_module(dirs, stem)),
        Language::JavaScript | Language::TypeScript => Some(js_module(dirs, stem)),
        _ => Some(join_slash(dirs, Some(stem))),
    }
}

/// Split into directory components and the file stem (last extension removed)
fn split_path(file_path: &str) -> Option<(Vec<&str>, &str)> {
    let mut components: Vec<&str> = file_path
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();
    let file_name = components.pop()?;
    let stem = match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(idx) => &file_name[..idx],
    };
    Some((components, stem))
}

fn python_module<'a>(mut dirs: Vec<&'a str>, stem: &'a str) -> Option<String> {
    // __init__.py marks a package, not a separate module
    if stem != "__init__" {
        dirs.push(stem);
    }
    if dirs.is_empty() {
        None
    } else {
        Some(dirs.join("."))
    }
}

fn rust_module(dirs: Vec<&str>, stem: &str) -> String {
    // Paths are relative to the nearest `src` directory
    let start = dirs
        .iter()
        .rposition(|c| *c == "src")
        .map_or(0, |idx| idx + 1);
    let mut parts: Vec<&str> = dirs[start..].to_vec();

    // `mod.rs` names its directory; `lib.rs`/`main.rs` at the source root are the crate root
    let is_crate_root = parts.is_empty() && matches!(stem, "lib" | "main");
    if stem != "mod" && !is_crate_root {
        parts.push(stem);
    }

    if parts.is_empty() {
        "crate".to_string()
    } else {
        parts.join("::")
    }
}

fn java_module(dirs: Vec<&str>, stem: &str) -> String {
    // Maven/Gradle layout keeps packages under `src/{main,test}/java`
    let start = dirs
        .iter()
        .rposition(|c| *c == "java")
        .map_or(0, |idx| idx + 1);
    let mut parts: Vec<&str> = dirs[start..].to_vec();
    parts.push(stem);
    parts.join(".")
}

fn js_module(dirs: Vec<&str>, stem: &str) -> String {
    // `.d.ts` declaration files describe the module of the same name
    let stem = stem.strip_suffix(".d").unwrap_or(stem);

    // index files act as the folder's entry point
    if stem == "index" {
        if dirs.is_empty() {
            return "index".to_string();
        }
        return join_slash(dirs, None);
    }
    join_slash(dirs, Some(stem))
}

fn join_slash<'a>(mut dirs: Vec<&'a str>, stem: Option<&'a str>) -> String {
    dirs.extend(stem);
    dirs.join("/")
}
