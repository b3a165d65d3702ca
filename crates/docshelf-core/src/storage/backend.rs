//! Key-value backends
//!
//! A backend stores opaque bytes under string keys. It knows nothing about
//! encoding; `TypedStore` layers JSON on top.
//!
//! - `MemoryBackend` keeps records in a map (tests, throwaway shelves)
//! - `FileBackend` keeps one `<key>.json` file per record in a directory

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::error::{StorageError, StorageResult};

/// Byte-level key-value persistence
pub trait KeyValueBackend: Send {
    /// Read the bytes stored under `key`, or `None` if absent
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Remove `key`. Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

/// In-memory backend
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    records: HashMap<String, Vec<u8>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.records.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.records.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.records.remove(key);
        Ok(())
    }
}

/// Directory-backed store, one file per key
///
/// Records live at `<dir>/<key>.json` and are replaced atomically, so a
/// crash mid-write never leaves a truncated record behind.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the record files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for `key`
    pub fn record_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.record_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from_read_io(e, path)),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        let path = self.record_path(key)?;
        atomic_write(&path, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }
}

/// Keys become file names, so keep them to a safe character set
fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("json.tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_backend_set_get_remove() {
        let mut backend = MemoryBackend::new();
        assert!(backend.get("names").unwrap().is_none());

        backend.set("names", b"[1,2]").unwrap();
        assert_eq!(backend.get("names").unwrap().unwrap(), b"[1,2]");

        backend.set("names", b"[3]").unwrap();
        assert_eq!(backend.get("names").unwrap().unwrap(), b"[3]");

        backend.remove("names").unwrap();
        assert!(backend.get("names").unwrap().is_none());

        // Removing again is fine
        backend.remove("names").unwrap();
    }

    #[test]
    fn test_file_backend_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut backend = FileBackend::new(temp_dir.path().join("store"));
            backend.set("userdata", b"{\"documents\":[]}").unwrap();
        }

        let backend = FileBackend::new(temp_dir.path().join("store"));
        let bytes = backend.get("userdata").unwrap().unwrap();
        assert_eq!(bytes, b"{\"documents\":[]}");
        assert!(temp_dir.path().join("store").join("userdata.json").exists());
    }

    #[test]
    fn test_file_backend_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path());

        assert!(backend.get("nothing-here").unwrap().is_none());
    }

    #[test]
    fn test_file_backend_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut backend = FileBackend::new(temp_dir.path());

        backend.set("userdata", b"data").unwrap();

        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["userdata.json".to_string()]);
    }

    #[test]
    fn test_file_backend_rejects_bad_keys() {
        let temp_dir = TempDir::new().unwrap();
        let mut backend = FileBackend::new(temp_dir.path());

        for key in ["", "../escape", "a/b", ".hidden", "with space"] {
            let err = backend.set(key, b"x").unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey { .. }), "key {:?}", key);
        }
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b").join("userdata.json");

        atomic_write(&nested, b"test data").unwrap();

        assert_eq!(fs::read_to_string(&nested).unwrap(), "test data");
    }
}
