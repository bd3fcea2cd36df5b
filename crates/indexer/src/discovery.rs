//! Candidate file enumeration and filtering
//!
//! Selection order: files are grouped by extension in the configured order, and within
//! a group follow a depth-first walk with directory entries sorted by file name. The
//! order is therefore the same on every platform.

use repoindex_core::error::{Error, Result};
use repoindex_core::language::normalize_extension;
use repoindex_core::RunConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// A file chosen for processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the snapshot root, `/`-separated
    pub relative_path: String,
    /// The file's own final extension with its leading dot (original case)
    pub extension: String,
}

/// Output of [`FileSelector::select`]
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    /// Files matching a configured extension, before exclusion and truncation
    pub total_matched: usize,
    /// Files to process, in selection order
    pub files: Vec<SelectedFile>,
}

/// Enumerates files by extension, drops excluded paths, and applies the file cap
#[derive(Debug, Clone)]
pub struct FileSelector {
    extensions: Vec<String>,
    exclude_patterns: Vec<String>,
    max_files: Option<usize>,
}

impl FileSelector {
    pub fn new(
        extensions: Vec<String>,
        exclude_patterns: Vec<String>,
        max_files: Option<usize>,
    ) -> Self {
        Self {
            extensions,
            exclude_patterns,
            max_files,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(
            config.file_extensions.clone(),
            config.exclude_patterns.clone(),
            config.file_limit(),
        )
    }

    /// Index of the first configured extension the file name ends with
    ///
    /// Matching is ASCII-case-insensitive; a file joins only the first matching group.
    fn extension_group(&self, file_name: &str) -> Option<usize> {
        let lowered = file_name.to_ascii_lowercase();
        self.extensions
            .iter()
            .position(|ext| lowered.ends_with(&normalize_extension(ext)))
    }

    fn is_excluded(&self, relative_path: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && relative_path.contains(pattern.as_str()))
    }

    /// Select files under `root`
    pub fn select(&self, root: &Path) -> Result<FileSelection> {
        if !root.is_dir() {
            return Err(Error::discovery(format!(
                "Snapshot root {} is not a directory",
                root.display()
            )));
        }

        let mut groups: Vec<Vec<SelectedFile>> = vec![Vec::new(); self.extensions.len()];

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git");

        for entry in walker {
            let entry = entry.map_err(|e| {
                Error::discovery(format!("Failed to enumerate {}: {e}", root.display()))
            })?;

            // Symlinks are not followed and never selected
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str() else {
                debug!("Skipping non UTF-8 file name {}", entry.path().display());
                continue;
            };
            let Some(group) = self.extension_group(file_name) else {
                continue;
            };

            let Some(relative_path) = relative_path(root, entry.path()) else {
                debug!("Skipping non UTF-8 path {}", entry.path().display());
                continue;
            };

            let extension = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{e}"))
                .unwrap_or_default();

            if let Some(files) = groups.get_mut(group) {
                files.push(SelectedFile {
                    path: entry.path().to_path_buf(),
                    relative_path,
                    extension,
                });
            }
        }

        let matched: Vec<SelectedFile> = groups.into_iter().flatten().collect();
        let total_matched = matched.len();

        let mut files: Vec<SelectedFile> = matched
            .into_iter()
            .filter(|f| !self.is_excluded(&f.relative_path))
            .collect();
        let after_exclusion = files.len();

        if let Some(max) = self.max_files {
            files.truncate(max);
        }

        info!(
            "Selected {} of {total_matched} matching files ({} excluded)",
            files.len(),
            total_matched - after_exclusion
        );

        Ok(FileSelection {
            total_matched,
            files,
        })
    }
}

/// `/`-joined path of `path` relative to `root`
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x = 1\n").unwrap();
    }

    fn selector(exts: &[&str], excludes: &[&str], max: Option<usize>) -> FileSelector {
        FileSelector::new(
            exts.iter().map(|s| s.to_string()).collect(),
            excludes.iter().map(|s| s.to_string()).collect(),
            max,
        )
    }

    fn rel_paths(selection: &FileSelection) -> Vec<&str> {
        selection
            .files
            .iter()
            .map(|f| f.relative_path.as_str())
            .collect()
    }

    #[test]
    fn test_groups_by_configured_extension_order() {
        let dir = TempDir::new().unwrap();
        for rel in ["b.py", "a.ts", "src/c.py", "src/d.ts", "README.md"] {
            write(dir.path(), rel);
        }

        let selection = selector(&[".ts", ".py"], &[], None)
            .select(dir.path())
            .unwrap();

        assert_eq!(selection.total_matched, 4);
        assert_eq!(
            rel_paths(&selection),
            vec!["a.ts", "src/d.ts", "b.py", "src/c.py"]
        );
        assert_eq!(selection.files[0].extension, ".ts");
    }

    #[test]
    fn test_exclude_is_literal_substring() {
        let dir = TempDir::new().unwrap();
        for rel in ["src/test_utils.py", "src/testing/main.py", "src/app.py"] {
            write(dir.path(), rel);
        }

        let selection = selector(&[".py"], &["test"], None)
            .select(dir.path())
            .unwrap();

        assert_eq!(selection.total_matched, 3);
        assert_eq!(rel_paths(&selection), vec!["src/app.py"]);
    }

    #[test]
    fn test_max_files_truncates_after_exclusion() {
        let dir = TempDir::new().unwrap();
        for rel in ["a.py", "b.py", "c.py", "node_modules/x.py"] {
            write(dir.path(), rel);
        }

        let limited = selector(&[".py"], &["node_modules"], Some(2))
            .select(dir.path())
            .unwrap();
        assert_eq!(limited.total_matched, 4);
        assert_eq!(rel_paths(&limited), vec!["a.py", "b.py"]);

        let unlimited = selector(&[".py"], &["node_modules"], None)
            .select(dir.path())
            .unwrap();
        assert_eq!(rel_paths(&unlimited), vec!["a.py", "b.py", "c.py"]);
    }

    #[test]
    fn test_extension_match_is_case_insensitive_and_skips_git() {
        let dir = TempDir::new().unwrap();
        for rel in ["Main.PY", ".git/hooks/x.py", "lib.py"] {
            write(dir.path(), rel);
        }

        let selection = selector(&[".py"], &[], None).select(dir.path()).unwrap();
        assert_eq!(rel_paths(&selection), vec!["Main.PY", "lib.py"]);
        assert_eq!(selection.files[0].extension, ".PY");
    }

    #[test]
    fn test_file_listed_once_for_overlapping_extensions() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "types/api.d.ts");
        write(dir.path(), "src/app.ts");

        let selection = selector(&[".d.ts", ".ts"], &[], None)
            .select(dir.path())
            .unwrap();
        assert_eq!(selection.total_matched, 2);
        assert_eq!(rel_paths(&selection), vec!["types/api.d.ts", "src/app.ts"]);
    }

    #[test]
    fn test_empty_repository() {
        let dir = TempDir::new().unwrap();
        let selection = selector(&[".py"], &[], None).select(dir.path()).unwrap();
        assert_eq!(selection.total_matched, 0);
        assert!(selection.files.is_empty());
    }

    #[test]
    fn test_missing_root_is_discovery_error() {
        let dir = TempDir::new().unwrap();
        let err = selector(&[".py"], &[], None)
            .select(&dir.path().join("missing"))
            .unwrap_err();
        assert_eq!(err.kind(), "DiscoveryError");
    }
}
