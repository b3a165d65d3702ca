//! Typed object store
//!
//! Encodes any serde value to JSON and keeps it in a `KeyValueBackend`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::backend::KeyValueBackend;
use super::error::StorageError;

/// Errors from typed store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The value could not be serialized
    #[error("Unable to encode object into data for key '{key}': {source}")]
    EncodingFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Nothing is stored under the key
    #[error("No data object found for key '{key}'")]
    NoValue { key: String },

    /// Stored bytes do not match the requested type
    #[error("Unable to decode data for key '{key}' into the requested type: {source}")]
    DecodingFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend failed to read or write
    #[error(transparent)]
    Backend(#[from] StorageError),
}

/// Language for user-facing error descriptions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "he")]
    Hebrew,
}

impl Language {
    /// Parse a language code (`en`, `he`)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "he" | "hebrew" => Some(Language::Hebrew),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hebrew => "he",
        }
    }
}

impl StoreError {
    /// Short, localized description of the error kind
    pub fn describe(&self, language: Language) -> &'static str {
        match (self, language) {
            (StoreError::EncodingFailed { .. }, Language::English) => {
                "Unable to encode object into data"
            }
            (StoreError::EncodingFailed { .. }, Language::Hebrew) => {
                "לא ניתן להמיר את המידע לנתונים"
            }
            (StoreError::NoValue { .. }, Language::English) => {
                "No data object found for the given key"
            }
            (StoreError::NoValue { .. }, Language::Hebrew) => "לא נמצא מידע בערך הנתון.",
            (StoreError::DecodingFailed { .. }, Language::English) => {
                "Unable to decode object into given type"
            }
            (StoreError::DecodingFailed { .. }, Language::Hebrew) => {
                "לא ניתן להמיר את הנתונים למידע"
            }
            (StoreError::Backend(_), Language::English) => "Unable to access stored data",
            (StoreError::Backend(_), Language::Hebrew) => "לא ניתן לגשת למידע השמור",
        }
    }
}

/// Generic encode/store/load/decode wrapper over a backend
pub struct TypedStore {
    backend: Box<dyn KeyValueBackend>,
}

impl TypedStore {
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Encode `value` and store it under `key`, replacing any previous value
    pub fn store<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value).map_err(|source| StoreError::EncodingFailed {
            key: key.to_string(),
            source,
        })?;

        self.backend.set(key, &bytes)?;
        debug!(key, bytes = bytes.len(), "stored record");
        Ok(())
    }

    /// Load and decode the value stored under `key`
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<T, StoreError> {
        let bytes = self.backend.get(key)?.ok_or_else(|| StoreError::NoValue {
            key: key.to_string(),
        })?;

        serde_json::from_slice(&bytes).map_err(|source| StoreError::DecodingFailed {
            key: key.to_string(),
            source,
        })
    }

    /// Check whether anything is stored under `key`
    pub fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.backend.get(key)?.is_some())
    }

    /// Remove `key` from the backend
    pub fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.backend.remove(key)?;
        Ok(())
    }
}

impl std::fmt::Debug for TypedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend::{FileBackend, MemoryBackend};
    use crate::storage::error::StorageResult;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        sizes: Vec<u64>,
    }

    fn sample() -> Sample {
        Sample {
            name: "report.pdf".to_string(),
            sizes: vec![1, 2, 3],
        }
    }

    struct BrokenBackend;

    impl KeyValueBackend for BrokenBackend {
        fn get(&self, _key: &str) -> StorageResult<Option<Vec<u8>>> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &[u8]) -> StorageResult<()> {
            Err(StorageError::WriteError {
                path: PathBuf::from("/broken"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "device gone"),
            })
        }

        fn remove(&mut self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_store_and_load() {
        let mut store = TypedStore::new(MemoryBackend::new());

        store.store("sample", &sample()).unwrap();
        let loaded: Sample = store.load("sample").unwrap();

        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_store_overwrites() {
        let mut store = TypedStore::new(MemoryBackend::new());

        store.store("n", &1u32).unwrap();
        store.store("n", &2u32).unwrap();

        assert_eq!(store.load::<u32>("n").unwrap(), 2);
    }

    #[test]
    fn test_load_missing_key() {
        let store = TypedStore::new(MemoryBackend::new());

        let err = store.load::<Sample>("absent").unwrap_err();
        assert!(matches!(err, StoreError::NoValue { ref key } if key == "absent"));
    }

    #[test]
    fn test_load_malformed_bytes() {
        let mut backend = MemoryBackend::new();
        backend.set("sample", b"\x00\xffnot json").unwrap();
        let store = TypedStore::new(backend);

        let err = store.load::<Sample>("sample").unwrap_err();
        assert!(matches!(err, StoreError::DecodingFailed { .. }));
    }

    #[test]
    fn test_load_wrong_shape() {
        let mut store = TypedStore::new(MemoryBackend::new());
        store.store("sample", &vec!["a", "b"]).unwrap();

        let err = store.load::<Sample>("sample").unwrap_err();
        assert!(matches!(err, StoreError::DecodingFailed { .. }));
    }

    #[test]
    fn test_encoding_failure() {
        let mut store = TypedStore::new(MemoryBackend::new());

        // JSON object keys must be strings
        let mut map = HashMap::new();
        map.insert((1u8, 2u8), 3u8);

        let err = store.store("map", &map).unwrap_err();
        assert!(matches!(err, StoreError::EncodingFailed { .. }));
        assert!(!store.contains("map").unwrap());
    }

    #[test]
    fn test_backend_write_failure_propagates() {
        let mut store = TypedStore::new(BrokenBackend);

        let err = store.store("sample", &sample()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Backend(StorageError::WriteError { .. })
        ));
    }

    #[test]
    fn test_contains_and_remove() {
        let mut store = TypedStore::new(MemoryBackend::new());
        assert!(!store.contains("sample").unwrap());

        store.store("sample", &sample()).unwrap();
        assert!(store.contains("sample").unwrap());

        store.remove("sample").unwrap();
        assert!(!store.contains("sample").unwrap());
        store.remove("sample").unwrap();
    }

    #[test]
    fn test_file_backed_round_trip() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut store = TypedStore::new(FileBackend::new(temp_dir.path()));
            store.store("sample", &sample()).unwrap();
        }

        let store = TypedStore::new(FileBackend::new(temp_dir.path()));
        assert_eq!(store.load::<Sample>("sample").unwrap(), sample());
    }

    #[test]
    fn test_describe_is_localized() {
        let err = StoreError::NoValue {
            key: "userdata".to_string(),
        };

        assert_eq!(
            err.describe(Language::English),
            "No data object found for the given key"
        );
        assert_eq!(err.describe(Language::Hebrew), "לא נמצא מידע בערך הנתון.");
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("he"), Some(Language::Hebrew));
        assert_eq!(Language::from_code(" EN "), Some(Language::English));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::Hebrew.code(), "he");
    }
}
