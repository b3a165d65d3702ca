//! File-system access used by the document list and the importer
//!
//! Kept behind a trait so tests can inject failures without touching
//! real permissions.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::warn;

/// Shared file-system handle
pub type Fs = Arc<dyn FileSystem>;

/// Size and modification time of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// File operations needed to manage imported documents
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    /// Returns `true` if something exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Copy `from` to `to` without overwriting.
    ///
    /// Fails with `io::ErrorKind::AlreadyExists` if `to` exists.
    /// Returns the number of bytes copied.
    fn copy_new(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Remove a regular file
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Ensure a directory exists, creating parents as needed
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Size and modification time of the file at `path`
    fn metadata(&self, path: &Path) -> io::Result<FileInfo>;
}

/// The real file system
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl OsFileSystem {
    /// Shared handle to the real file system
    pub fn shared() -> Fs {
        Arc::new(OsFileSystem)
    }
}

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn copy_new(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let mut source = File::open(from)?;
        let mut destination = OpenOptions::new().write(true).create_new(true).open(to)?;

        let copied = io::copy(&mut source, &mut destination).and_then(|n| {
            destination.sync_all()?;
            Ok(n)
        });

        if let Err(e) = &copied {
            // Don't leave a partial copy behind to collide with later imports
            drop(destination);
            if let Err(remove_err) = fs::remove_file(to) {
                warn!(
                    "failed to clean up partial copy {:?} after {}: {}",
                    to, e, remove_err
                );
            }
        }

        copied
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileInfo> {
        let meta = fs::metadata(path)?;
        Ok(FileInfo {
            size: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Local>::from),
        })
    }
}
