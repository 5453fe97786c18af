use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use rhizome_core::{CorpusEntry, IndexError, ScannedDocument, SiteConfig};

/// Enumerates and reads the document corpus.
///
/// Listing is synchronous; content reads fan out as one task per file
/// and are awaited as a batch, since documents are independent.
pub struct CorpusScanner {
    root: PathBuf,
    extension: String,
    recursive: bool,
}

impl CorpusScanner {
    pub fn new(root: PathBuf, extension: &str, recursive: bool) -> Self {
        Self {
            root,
            extension: extension.to_string(),
            recursive,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            config.content.root.clone(),
            &config.content.extension,
            config.content.recursive,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate corpus files with their modification times, sorted by
    /// path for a stable scan order. No contents are read.
    pub fn list_entries(&self) -> Result<Vec<CorpusEntry>, IndexError> {
        let paths = if self.recursive {
            self.list_recursive()?
        } else {
            self.list_flat()?
        };

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            match std::fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(modified_at) => entries.push(CorpusEntry { path, modified_at }),
                Err(err) => warn!("skipping {:?}: cannot stat: {}", path, err),
            }
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    /// Enumerate and read the whole corpus. One unreadable file is
    /// logged and skipped; only an unlistable root is fatal.
    pub async fn scan(&self) -> Result<Vec<ScannedDocument>, IndexError> {
        let entries = self.list_entries()?;

        let mut handles = Vec::with_capacity(entries.len());
        for entry in entries {
            let handle = tokio::spawn(tokio::fs::read_to_string(entry.path.clone()));
            handles.push((entry, handle));
        }

        let mut documents = Vec::with_capacity(handles.len());
        for (entry, handle) in handles {
            match handle.await {
                Ok(Ok(content)) => documents.push(ScannedDocument {
                    path: entry.path,
                    content,
                    modified_at: entry.modified_at,
                }),
                Ok(Err(err)) => {
                    let err = IndexError::DocumentRead {
                        path: entry.path,
                        source: err,
                    };
                    warn!("{}", err);
                }
                Err(err) => warn!("read task for {:?} failed: {}", entry.path, err),
            }
        }
        Ok(documents)
    }

    fn list_flat(&self) -> Result<Vec<PathBuf>, IndexError> {
        let dir = std::fs::read_dir(&self.root).map_err(|source| IndexError::CorpusUnavailable {
            path: self.root.clone(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in dir.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() && self.has_extension(&path) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    fn list_recursive(&self) -> Result<Vec<PathBuf>, IndexError> {
        // walkdir swallows the root error into its iterator; probe first
        // so a missing root is distinguishable from an empty corpus.
        std::fs::metadata(&self.root).map_err(|source| IndexError::CorpusUnavailable {
            path: self.root.clone(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && self.has_extension(path) {
                paths.push(path.to_path_buf());
            }
        }
        Ok(paths)
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext == self.extension.as_str())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scanner(root: &Path, recursive: bool) -> CorpusScanner {
        CorpusScanner::new(root.to_path_buf(), "org", recursive)
    }

    #[test]
    fn test_list_entries_filters_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.org"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();

        let entries = scanner(dir.path(), false).list_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].path.ends_with("a.org"));
    }

    #[test]
    fn test_list_entries_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.org"), "b").unwrap();
        fs::write(dir.path().join("a.org"), "a").unwrap();

        let entries = scanner(dir.path(), false).list_entries().unwrap();
        assert!(entries[0].path.ends_with("a.org"));
        assert!(entries[1].path.ends_with("b.org"));
    }

    #[test]
    fn test_flat_listing_ignores_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/deep.org"), "deep").unwrap();
        fs::write(dir.path().join("top.org"), "top").unwrap();

        let flat = scanner(dir.path(), false).list_entries().unwrap();
        assert_eq!(flat.len(), 1);

        let recursive = scanner(dir.path(), true).list_entries().unwrap();
        assert_eq!(recursive.len(), 2);
    }

    #[test]
    fn test_missing_root_is_corpus_unavailable() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        for recursive in [false, true] {
            let err = scanner(&missing, recursive).list_entries().unwrap_err();
            assert!(matches!(err, IndexError::CorpusUnavailable { .. }));
        }
    }

    #[tokio::test]
    async fn test_scan_reads_contents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.org"), "hello").unwrap();
        fs::write(dir.path().join("b.org"), "world").unwrap();

        let docs = scanner(dir.path(), false).scan().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "hello");
        assert_eq!(docs[1].content, "world");
    }

    #[tokio::test]
    async fn test_scan_survives_removed_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.org"), "ok").unwrap();
        let doomed = dir.path().join("doomed.org");
        fs::write(&doomed, "gone").unwrap();

        let s = scanner(dir.path(), false);
        assert_eq!(s.list_entries().unwrap().len(), 2);

        fs::remove_file(&doomed).unwrap();
        let docs = s.scan().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "ok");
    }

    #[tokio::test]
    async fn test_scan_empty_corpus() {
        let dir = TempDir::new().unwrap();
        let docs = scanner(dir.path(), true).scan().await.unwrap();
        assert!(docs.is_empty());
    }
}
