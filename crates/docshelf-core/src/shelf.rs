//! Document shelf
//!
//! The `Shelf` is the main entry point. It wires together:
//! - the record store (`FileBackend` under `<data_dir>/store`)
//! - the persisted `DocumentList`
//! - the `Importer` writing into the managed directory
//!
//! ## Usage
//!
//! ```ignore
//! let mut shelf = Shelf::open()?;
//!
//! let report = shelf.import_files(&["/tmp/report.pdf"]);
//! for entry in shelf.entries() {
//!     println!("{} {}", entry.name, entry.exists);
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::documents::DocumentList;
use crate::fs::{Fs, OsFileSystem};
use crate::importer::{ImportReport, Importer};
use crate::models::{DocumentEntry, DocumentReference};
use crate::storage::{FileBackend, TypedStore};

/// Summary of the shelf's contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShelfStats {
    /// Number of list entries
    pub documents: usize,
    /// Entries whose backing file is missing
    pub missing: usize,
    /// Combined size of the present files
    pub total_size: u64,
}

impl ShelfStats {
    /// Human-readable total size
    pub fn total_size_human(&self) -> String {
        format_size(self.total_size)
    }
}

/// Format a byte count as B/KB/MB/GB
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Document list plus importer, configured from `Config`
pub struct Shelf {
    list: DocumentList,
    importer: Importer,
    config: Config,
}

impl Shelf {
    /// Open the shelf with configuration from the default location
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the shelf with a specific configuration
    pub fn open_with_config(config: Config) -> Result<Self> {
        Self::open_with_fs(config, OsFileSystem::shared())
    }

    /// Open the shelf over a specific file system
    pub fn open_with_fs(config: Config, fs: Fs) -> Result<Self> {
        let managed_dir = config.documents_dir();
        fs.create_dir_all(&managed_dir)
            .with_context(|| format!("Failed to create documents directory {:?}", managed_dir))?;

        let store = TypedStore::new(FileBackend::new(config.store_dir()));
        let list = DocumentList::open(store, fs.clone(), config.reference_mode, &managed_dir);
        let importer = Importer::for_list(&list, fs)
            .with_suffix_style(config.suffix_style)
            .with_max_attempts(config.max_collision_attempts);

        Ok(Self {
            list,
            importer,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn list(&self) -> &DocumentList {
        &self.list
    }

    /// Managed directory holding imported copies
    pub fn documents_dir(&self) -> &Path {
        self.list.managed_dir()
    }

    pub fn documents(&self) -> &[DocumentReference] {
        self.list.documents()
    }

    pub fn entries(&self) -> Vec<DocumentEntry> {
        self.list.entries()
    }

    /// Import files synchronously
    pub fn import_files<P: AsRef<Path>>(&mut self, sources: &[P]) -> ImportReport {
        self.importer.import_files(&mut self.list, sources)
    }

    /// Import files with copies running in the background
    pub async fn import_files_async(&mut self, sources: Vec<PathBuf>) -> ImportReport {
        self.importer
            .import_files_async(&mut self.list, sources)
            .await
    }

    /// Remove the entry at `index`
    pub fn remove(&mut self, index: usize) -> Result<DocumentReference> {
        self.list
            .remove_at(index)
            .context("Failed to remove document")
    }

    /// Resolved location of the entry at `index`
    pub fn resolve(&self, index: usize) -> Option<PathBuf> {
        self.list.get(index).map(|r| self.list.resolve(r))
    }

    /// Position of the first entry with display name `name`
    pub fn find(&self, name: &str) -> Option<usize> {
        self.list.position_of(name)
    }

    pub fn stats(&self) -> ShelfStats {
        self.entries()
            .iter()
            .fold(ShelfStats::default(), |mut stats, entry| {
                stats.documents += 1;
                if !entry.exists {
                    stats.missing += 1;
                }
                stats.total_size += entry.size.unwrap_or(0);
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::ListError;
    use crate::models::ReferenceMode;
    use std::fs;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().join("data"),
            ..Config::default()
        }
    }

    fn source(temp_dir: &TempDir, dir: &str, name: &str, content: &[u8]) -> PathBuf {
        let dir = temp_dir.path().join("inbox").join(dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_open_creates_documents_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let shelf = Shelf::open_with_config(config.clone()).unwrap();

        assert!(config.documents_dir().is_dir());
        assert!(shelf.documents().is_empty());
        assert_eq!(shelf.documents_dir(), config.documents_dir());
    }

    #[test]
    fn test_documents_persist_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let a = source(&temp_dir, "one", "a.pdf", b"aaa");
        let b = source(&temp_dir, "two", "a.pdf", b"bb");

        {
            let mut shelf = Shelf::open_with_config(config.clone()).unwrap();
            let report = shelf.import_files(&[a, b]);
            assert!(report.is_success());
        }

        let shelf = Shelf::open_with_config(config).unwrap();
        let names: Vec<_> = shelf.entries().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["a.pdf", "a 1.pdf"]);

        let stats = shelf.stats();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.missing, 0);
        assert_eq!(stats.total_size, 5);
    }

    #[test]
    fn test_config_drives_suffix_and_mode() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            reference_mode: ReferenceMode::AbsolutePath,
            suffix_style: crate::importer::SuffixStyle::Parenthesized,
            ..test_config(&temp_dir)
        };
        let a = source(&temp_dir, "one", "a.pdf", b"1");
        let b = source(&temp_dir, "two", "a.pdf", b"2");

        let mut shelf = Shelf::open_with_config(config.clone()).unwrap();
        shelf.import_files(&[a, b]);

        assert_eq!(
            shelf.documents()[1],
            DocumentReference::new(config.documents_dir().join("a (1).pdf"))
        );
    }

    #[test]
    fn test_remove_and_resolve() {
        let temp_dir = TempDir::new().unwrap();
        let mut shelf = Shelf::open_with_config(test_config(&temp_dir)).unwrap();
        let a = source(&temp_dir, "one", "a.pdf", b"1");
        let b = source(&temp_dir, "one", "b.pdf", b"2");
        shelf.import_files(&[a, b]);

        let b_path = shelf.resolve(1).unwrap();
        assert!(b_path.exists());
        assert_eq!(shelf.find("b.pdf"), Some(1));

        shelf.remove(1).unwrap();

        assert!(!b_path.exists());
        assert!(shelf.resolve(1).is_none());
        assert_eq!(shelf.find("b.pdf"), None);
    }

    #[test]
    fn test_remove_out_of_range() {
        let temp_dir = TempDir::new().unwrap();
        let mut shelf = Shelf::open_with_config(test_config(&temp_dir)).unwrap();

        let err = shelf.remove(0).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ListError>(),
            Some(ListError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_stats_counts_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mut shelf = Shelf::open_with_config(config.clone()).unwrap();
        let a = source(&temp_dir, "one", "a.pdf", b"1234");
        shelf.import_files(&[a]);

        fs::remove_file(config.documents_dir().join("a.pdf")).unwrap();

        let stats = shelf.stats();
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.total_size, 0);
    }

    #[tokio::test]
    async fn test_import_files_async() {
        let temp_dir = TempDir::new().unwrap();
        let mut shelf = Shelf::open_with_config(test_config(&temp_dir)).unwrap();
        let sources = vec![
            source(&temp_dir, "one", "x.txt", b"1"),
            source(&temp_dir, "two", "x.txt", b"2"),
        ];

        let report = shelf.import_files_async(sources).await;

        assert_eq!(report.imported.len(), 2);
        assert_eq!(shelf.find("x 1.txt"), Some(1));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }
}
