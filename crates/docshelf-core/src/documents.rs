//! Persisted document list
//!
//! An ordered sequence of `DocumentReference`s. The in-memory sequence is
//! what the user sees; every mutation rewrites the whole persisted record
//! under `DOCUMENTS_KEY`.
//!
//! ## Consistency
//!
//! - A failed persist rolls the in-memory mutation back
//! - In `ManagedName` mode, removing an entry deletes its file afterwards.
//!   A failed delete is logged and the removal stands.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fs::Fs;
use crate::models::{DocumentEntry, DocumentReference, PersistedList, ReferenceMode, DOCUMENTS_KEY};
use crate::storage::{StoreError, TypedStore};

/// Errors from document list mutations
#[derive(Error, Debug)]
pub enum ListError {
    /// Index is not within `[0, len)`
    #[error("No document at index {index} (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The list could not be persisted
    #[error("Failed to persist document list: {0}")]
    Store(#[from] StoreError),
}

/// Ordered, persisted collection of document references
#[derive(Debug)]
pub struct DocumentList {
    store: TypedStore,
    fs: Fs,
    mode: ReferenceMode,
    managed_dir: PathBuf,
    documents: Vec<DocumentReference>,
}

impl DocumentList {
    /// Open the list, loading whatever is persisted
    pub fn open(
        store: TypedStore,
        fs: Fs,
        mode: ReferenceMode,
        managed_dir: impl Into<PathBuf>,
    ) -> Self {
        let mut list = Self {
            store,
            fs,
            mode,
            managed_dir: managed_dir.into(),
            documents: Vec::new(),
        };
        list.reload();
        list
    }

    /// Read the persisted sequence
    ///
    /// Missing and corrupt records both yield an empty sequence. The two
    /// cases are logged differently so they can be told apart.
    pub fn load(&self) -> Vec<DocumentReference> {
        match self.store.load::<PersistedList>(DOCUMENTS_KEY) {
            Ok(record) => {
                debug!(count = record.documents.len(), "loaded document list");
                record.documents
            }
            Err(StoreError::NoValue { .. }) => {
                debug!("no persisted document list, starting empty");
                Vec::new()
            }
            Err(e @ StoreError::DecodingFailed { .. }) => {
                warn!("persisted document list is unreadable, starting empty: {}", e);
                Vec::new()
            }
            Err(e) => {
                warn!("failed to load document list, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Replace the in-memory sequence with the persisted one
    pub fn reload(&mut self) {
        self.documents = self.load();
    }

    /// Append a reference and persist
    pub fn append(&mut self, reference: DocumentReference) -> Result<(), ListError> {
        self.documents.push(reference);

        if let Err(e) = self.persist() {
            self.documents.pop();
            return Err(e);
        }

        Ok(())
    }

    /// Remove and return the reference at `index`, then persist
    ///
    /// In `ManagedName` mode the backing file is deleted as well.
    pub fn remove_at(&mut self, index: usize) -> Result<DocumentReference, ListError> {
        if index >= self.documents.len() {
            return Err(ListError::IndexOutOfRange {
                index,
                len: self.documents.len(),
            });
        }

        let removed = self.documents.remove(index);

        if let Err(e) = self.persist() {
            self.documents.insert(index, removed);
            return Err(e);
        }

        info!(position = index, reference = %removed, "removed document");

        if self.mode.owns_files() {
            let path = self.resolve(&removed);
            match self.fs.remove_file(&path) {
                Ok(()) => debug!("deleted {:?}", path),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("backing file {:?} was already gone", path)
                }
                Err(e) => warn!("failed to delete backing file {:?}: {}", path, e),
            }
        }

        Ok(removed)
    }

    /// Empty the list and persist. Files are left in place.
    pub fn clear(&mut self) -> Result<(), ListError> {
        let previous = std::mem::take(&mut self.documents);

        if let Err(e) = self.persist() {
            self.documents = previous;
            return Err(e);
        }

        Ok(())
    }

    fn persist(&mut self) -> Result<(), ListError> {
        let record = PersistedList {
            documents: self.documents.clone(),
        };
        self.store.store(DOCUMENTS_KEY, &record)?;
        Ok(())
    }

    /// Current sequence, in display order
    pub fn documents(&self) -> &[DocumentReference] {
        &self.documents
    }

    pub fn get(&self, index: usize) -> Option<&DocumentReference> {
        self.documents.get(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn mode(&self) -> ReferenceMode {
        self.mode
    }

    pub fn managed_dir(&self) -> &Path {
        &self.managed_dir
    }

    /// Absolute location of a reference's document
    ///
    /// Bare names are always relative to the managed directory, and absolute
    /// paths stand on their own. A list written under one `ReferenceMode`
    /// therefore still resolves after the mode is switched.
    pub fn resolve(&self, reference: &DocumentReference) -> PathBuf {
        self.managed_dir.join(reference.as_path())
    }

    /// Position of the first entry whose display name is `name`
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.documents.iter().position(|r| r.display_name() == name)
    }

    /// Rendering view of every entry
    pub fn entries(&self) -> Vec<DocumentEntry> {
        self.documents
            .iter()
            .enumerate()
            .map(|(position, reference)| {
                let path = self.resolve(reference);
                let info = self.fs.metadata(&path).ok();
                DocumentEntry {
                    position,
                    name: reference.display_name(),
                    exists: info.is_some(),
                    size: info.as_ref().map(|i| i.size),
                    modified: info.and_then(|i| i.modified),
                    path,
                }
            })
            .collect()
    }
}
