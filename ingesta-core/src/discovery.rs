//! Source tree enumeration.
//!
//! Walks the source root recursively and yields every regular file as a
//! [`DiscoveredFile`]. Siblings are visited in file-name order so repeated
//! runs over an unchanged tree see the same sequence. Symbolic links to
//! files are yielded; links to directories are not descended into.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::PipelineConfig;
use crate::utils::lowercase_extension;

/// A regular file found under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Path relative to the source root
    pub relative_path: PathBuf,
    /// Lowercase extension with a leading dot, or `""`
    pub extension: String,
}

impl DiscoveredFile {
    /// Builds an entry for `path` found under `root`.
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(path.file_name().unwrap_or_default()));
        let extension = lowercase_extension(&path);
        Self {
            path,
            relative_path,
            extension,
        }
    }

    /// Original file name, as written to the reports.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Lazy, single-pass iterator over the files of a source tree.
pub struct SourceWalker {
    root: PathBuf,
    inner: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + Send>,
}

impl SourceWalker {
    /// Walks `root`, skipping the directory `exclude` (and everything under
    /// it) when it lies inside the tree.
    pub fn new(root: &Path, exclude: Option<&Path>) -> Self {
        let excluded = exclude.map(Path::to_path_buf);
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| match &excluded {
                Some(dir) if entry.depth() > 0 && entry.file_type().is_dir() => {
                    entry.path() != dir.as_path()
                }
                _ => true,
            });

        Self {
            root: root.to_path_buf(),
            inner: Box::new(walker),
        }
    }

    /// Walks the configured source root, skipping the destination root.
    pub fn for_config(config: &PipelineConfig) -> Self {
        Self::new(&config.source_root, Some(&config.destination_root))
    }
}

impl Iterator for SourceWalker {
    type Item = DiscoveredFile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    // `is_file` follows symlinks, `file_type` does not.
                    if entry.file_type().is_dir() || !entry.path().is_file() {
                        continue;
                    }
                    log::debug!("Discovered: {}", entry.path().display());
                    return Some(DiscoveredFile::new(&self.root, entry.into_path()));
                }
                Err(e) => {
                    log::warn!("Walk error: {e}");
                    continue;
                }
            }
        }
    }
}

/// Counts the files a [`SourceWalker`] with the same arguments would yield.
pub fn count_files(root: &Path, exclude: Option<&Path>) -> usize {
    SourceWalker::new(root, exclude).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_directory() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        fs::write(base.join("a.mp4"), b"a").unwrap();
        fs::write(base.join("b.MOV"), b"b").unwrap();
        fs::write(base.join("README"), b"r").unwrap();
        fs::create_dir_all(base.join("c/deeper")).unwrap();
        fs::write(base.join("c/d.mp4"), b"d").unwrap();
        fs::write(base.join("c/deeper/e.mp4"), b"e").unwrap();
        dir
    }

    #[test]
    fn test_walk_finds_nested_files_in_order() {
        let dir = create_test_directory();
        let files: Vec<_> = SourceWalker::new(dir.path(), None)
            .map(|f| f.relative_path)
            .collect();

        assert_eq!(
            files,
            vec![
                PathBuf::from("README"),
                PathBuf::from("a.mp4"),
                PathBuf::from("b.MOV"),
                PathBuf::from("c/d.mp4"),
                PathBuf::from("c/deeper/e.mp4"),
            ]
        );
    }

    #[test]
    fn test_extensions_are_lowercased() {
        let dir = create_test_directory();
        let extensions: Vec<_> = SourceWalker::new(dir.path(), None)
            .map(|f| (f.file_name(), f.extension))
            .collect();

        assert!(extensions.contains(&("b.MOV".to_string(), ".mov".to_string())));
        assert!(extensions.contains(&("README".to_string(), String::new())));
    }

    #[test]
    fn test_excluded_directory_is_skipped() {
        let dir = create_test_directory();
        let excluded = dir.path().join("c");
        let files: Vec<_> = SourceWalker::new(dir.path(), Some(&excluded))
            .map(|f| f.file_name())
            .collect();

        assert_eq!(files, vec!["README", "a.mp4", "b.MOV"]);
        assert_eq!(count_files(dir.path(), Some(&excluded)), 3);
        assert_eq!(count_files(dir.path(), None), 5);
    }

    #[test]
    fn test_empty_directory_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(SourceWalker::new(dir.path(), None).count(), 0);
    }
}
