//! Storage layer
//!
//! Durable key-value persistence for structured values.
//!
//! ## Architecture
//!
//! - **Backend**: byte-level records keyed by string (`MemoryBackend`, `FileBackend`)
//! - **TypedStore**: JSON encode/decode over any backend, with typed errors

pub mod backend;
pub mod error;
pub mod typed;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use error::{StorageError, StorageResult};
pub use typed::{Language, StoreError, TypedStore};
