//! docshelf Core Library
//!
//! This crate provides the core functionality for docshelf, a small
//! document shelf: files are imported into a managed directory and an
//! ordered list of them is persisted across runs.
//!
//! # Architecture
//!
//! - **TypedStore**: JSON records over a key-value backend
//! - **DocumentList**: the persisted, ordered list of document references
//! - **Importer**: copies files in without overwriting, then registers them
//!
//! # Quick Start
//!
//! ```text
//! let mut shelf = Shelf::open()?;
//!
//! // Import documents
//! let report = shelf.import_files(&["/tmp/report.pdf", "/tmp/report.pdf"]);
//! // -> "report.pdf", "report 1.pdf"
//!
//! // Remove the second one (its managed copy is deleted too)
//! shelf.remove(1)?;
//! ```
//!
//! # Modules
//!
//! - `shelf`: Unified entry point
//! - `models`: References, persisted record, entry view
//! - `documents`: The persisted document list
//! - `importer`: Collision-safe import
//! - `storage`: Key-value backends and the typed store
//! - `fs`: File-system abstraction
//! - `config`: Application configuration

pub mod config;
pub mod documents;
pub mod fs;
pub mod importer;
pub mod models;
pub mod shelf;
pub mod storage;

pub use config::Config;
pub use documents::{DocumentList, ListError};
pub use fs::{FileSystem, Fs, OsFileSystem};
pub use importer::{ImportError, ImportFailure, ImportReport, Imported, Importer, SuffixStyle};
pub use models::{DocumentEntry, DocumentReference, PersistedList, ReferenceMode, DOCUMENTS_KEY};
pub use shelf::{format_size, Shelf, ShelfStats};
pub use storage::{
    FileBackend, KeyValueBackend, Language, MemoryBackend, StorageError, StoreError, TypedStore,
};
