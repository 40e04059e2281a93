//! Flat-directory document store.
//!
//! Lists and reads plain-text files from the configured document directory.
//! Every call re-reads from disk — there is no cache to invalidate, at the
//! cost of O(corpus) reads per request. Acceptable for the handful of files
//! this service is designed around.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::DocumentsConfig;
use crate::models::{Document, StoredDocument};

/// Read/write access to the document directory.
///
/// Reading is fail-soft: an unreadable directory yields an empty listing and
/// a warning, never an error — an empty store is a valid (if degenerate)
/// state. Writing is used only by the upload path.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
    extensions: Vec<String>,
}

impl DocumentStore {
    pub fn new(config: &DocumentsConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            extensions: config.extensions.clone(),
        }
    }

    /// List all documents with a recognized extension, fully loaded,
    /// sorted by filename for a stable order within a process run.
    pub fn list(&self) -> Vec<Document> {
        if !self.dir.is_dir() {
            tracing::warn!(dir = %self.dir.display(), "document directory not readable");
            return Vec::new();
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !self.has_recognized_extension(path) {
                continue;
            }
            let name = match path.file_name() {
                Some(n) => n.to_string_lossy().to_string(),
                None => continue,
            };
            match std::fs::read_to_string(path) {
                Ok(content) => documents.push(Document { name, content }),
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping unreadable document");
                }
            }
        }

        documents.sort_by(|a, b| a.name.cmp(&b.name));
        documents
    }

    /// Read a single document by filename. Returns `None` when the name is
    /// not a plain filename, has an unrecognized extension, or is absent.
    pub fn get(&self, name: &str) -> Option<Document> {
        let file_name = Path::new(name).file_name()?;
        if file_name != name {
            return None;
        }
        let path = self.dir.join(file_name);
        if !self.has_recognized_extension(&path) {
            return None;
        }
        let content = std::fs::read_to_string(&path).ok()?;
        Some(Document {
            name: name.to_string(),
            content,
        })
    }

    /// Write an uploaded file into the document directory.
    ///
    /// The stored name is the final path component of `name`; a name without
    /// a recognized extension gets the first configured extension appended.
    /// Concurrent uploads of the same name are last-write-wins.
    pub fn save(&self, name: &str, bytes: &[u8]) -> Result<StoredDocument> {
        let file_name = Path::new(name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty() && n != "." && n != "..")
            .ok_or_else(|| anyhow::anyhow!("invalid upload filename: {:?}", name))?;

        let file_name = if self.has_recognized_extension(Path::new(&file_name)) {
            file_name
        } else {
            format!("{}.{}", file_name, self.extensions[0])
        };

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create document directory: {}", self.dir.display()))?;

        let path = self.dir.join(&file_name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write upload: {}", path.display()))?;

        Ok(StoredDocument {
            name: file_name,
            size: bytes.len() as u64,
        })
    }

    /// Whether the filename carries one of the configured text extensions.
    pub fn has_recognized_extension(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy().to_lowercase();
                self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
            }
            None => false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// First `max_chars` characters of `text`, on char boundaries.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_in(dir: &Path) -> DocumentStore {
        DocumentStore {
            dir: dir.to_path_buf(),
            extensions: vec!["txt".to_string()],
        }
    }

    #[test]
    fn test_list_filters_extensions_and_sorts() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("beta.txt"), "b").unwrap();
        fs::write(tmp.path().join("alpha.txt"), "a").unwrap();
        fs::write(tmp.path().join("image.png"), [0u8, 1]).unwrap();
        fs::write(tmp.path().join("README.md"), "#").unwrap();

        let docs = store_in(tmp.path()).list();
        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.txt", "beta.txt"]);
        assert_eq!(docs[0].content, "a");
    }

    #[test]
    fn test_list_missing_dir_is_empty_not_error() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp.path().join("does-not-exist"));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_list_rereads_from_disk() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(tmp.path());
        assert_eq!(store.list().len(), 0);

        fs::write(tmp.path().join("late.txt"), "added after first call").unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_get_rejects_path_traversal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("safe.txt"), "ok").unwrap();
        let store = store_in(tmp.path());

        assert!(store.get("safe.txt").is_some());
        assert!(store.get("../safe.txt").is_none());
        assert!(store.get("nested/safe.txt").is_none());
    }

    #[test]
    fn test_save_appends_extension() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(tmp.path());

        let stored = store.save("notes", b"hello").unwrap();
        assert_eq!(stored.name, "notes.txt");
        assert_eq!(stored.size, 5);
        assert!(tmp.path().join("notes.txt").is_file());
    }

    #[test]
    fn test_save_strips_path_components() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(tmp.path());

        let stored = store.save("../../etc/notes.txt", b"x").unwrap();
        assert_eq!(stored.name, "notes.txt");
        assert!(tmp.path().join("notes.txt").is_file());
        assert!(!tmp.path().join("../../etc/notes.txt").exists());
    }

    #[test]
    fn test_save_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp.path().join("data"));
        store.save("a.txt", b"1").unwrap();
        assert!(tmp.path().join("data/a.txt").is_file());
    }

    #[test]
    fn test_excerpt_char_boundaries() {
        assert_eq!(excerpt("hello", 10), "hello");
        assert_eq!(excerpt("hello", 3), "hel");
        // Multi-byte characters must not split mid-codepoint.
        assert_eq!(excerpt("héllo", 2), "hé");
        assert_eq!(excerpt("日本語テスト", 3), "日本語");
    }
}
