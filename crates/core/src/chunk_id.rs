//! Chunk ID generation utilities for unique, deterministic IDs

use twox_hash::XxHash3_128;

/// Generate a chunk ID from its repository, file, name, and start position
///
/// The start position plus node kind is unique within a file, so the ID is unique
/// within a run and stable across runs over the same snapshot.
pub fn generate_chunk_id(
    repo_full_name: &str,
    file_path: &str,
    name: &str,
    start_line: usize,
    start_column: usize,
    node_kind: &str,
) -> String {
    let unique_str =
        format!("{repo_full_name}:{file_path}:{name}:L{start_line}:C{start_column}:{node_kind}");
    format!("chunk-{:032x}", XxHash3_128::oneshot(unique_str.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_generation() {
        let id1 = generate_chunk_id("octo/demo", "src/a.py", "run", 3, 0, "function_definition");
        assert!(id1.starts_with("chunk-"));
        assert_eq!(id1.len(), "chunk-".len() + 32);

        // Stable
        let id2 = generate_chunk_id("octo/demo", "src/a.py", "run", 3, 0, "function_definition");
        assert_eq!(id1, id2);

        // Different file path produces different ID
        let id3 = generate_chunk_id("octo/demo", "src/b.py", "run", 3, 0, "function_definition");
        assert_ne!(id1, id3);

        // Paths that collapse to the same string when separators are replaced stay distinct
        let id4 = generate_chunk_id("octo/demo", "a/b_c.py", "run", 3, 0, "function_definition");
        let id5 = generate_chunk_id("octo/demo", "a_b/c.py", "run", 3, 0, "function_definition");
        assert_ne!(id4, id5);

        // Same line, different column
        let id6 = generate_chunk_id("octo/demo", "src/a.py", "run", 3, 12, "function_definition");
        assert_ne!(id1, id6);
    }
}
