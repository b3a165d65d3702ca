//! Data models for docshelf
//!
//! Defines document references, the persisted list record, and the
//! read-only entry view used for rendering.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Storage key of the persisted document list
pub const DOCUMENTS_KEY: &str = "userdata";

/// How references identify their documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// Full path, resolved once at import time. The list does not own the file.
    AbsolutePath,
    /// Bare file name, always resolved against the managed directory.
    /// The list owns the file and deletes it on removal.
    #[default]
    ManagedName,
}

impl ReferenceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceMode::AbsolutePath => "absolute_path",
            ReferenceMode::ManagedName => "managed_name",
        }
    }

    /// Whether removing an entry also deletes its backing file
    pub fn owns_files(&self) -> bool {
        matches!(self, ReferenceMode::ManagedName)
    }
}

impl fmt::Display for ReferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "absolute_path" | "absolute" => Ok(ReferenceMode::AbsolutePath),
            "managed_name" | "managed" => Ok(ReferenceMode::ManagedName),
            other => Err(format!(
                "unknown reference mode '{}' (expected absolute_path or managed_name)",
                other
            )),
        }
    }
}

/// One entry of the document list
///
/// Holds either a full path or a bare file name, depending on the list's
/// `ReferenceMode`. Serialized as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentReference(PathBuf);

impl DocumentReference {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Base file name, used as the display name
    pub fn display_name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.to_string_lossy().into_owned())
    }
}

impl fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Durable form of the document list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedList {
    pub documents: Vec<DocumentReference>,
}

/// Read-only view of a list entry for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentEntry {
    /// Zero-based position in the list
    pub position: usize,
    /// Display name (base file name)
    pub name: String,
    /// Resolved location of the document
    pub path: PathBuf,
    /// Whether the backing file is present
    pub exists: bool,
    /// File size in bytes, when present
    pub size: Option<u64>,
    /// Last modification time, when present
    pub modified: Option<DateTime<Local>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_mode_parse() {
        assert_eq!(
            "absolute_path".parse::<ReferenceMode>().unwrap(),
            ReferenceMode::AbsolutePath
        );
        assert_eq!(
            "Managed-Name".parse::<ReferenceMode>().unwrap(),
            ReferenceMode::ManagedName
        );
        assert!("relative".parse::<ReferenceMode>().is_err());
    }

    #[test]
    fn test_reference_mode_ownership() {
        assert!(ReferenceMode::ManagedName.owns_files());
        assert!(!ReferenceMode::AbsolutePath.owns_files());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(
            DocumentReference::new("/data/Documents/report 1.pdf").display_name(),
            "report 1.pdf"
        );
        assert_eq!(DocumentReference::new("notes.txt").display_name(), "notes.txt");
    }

    #[test]
    fn test_persisted_list_layout() {
        let list = PersistedList {
            documents: vec![
                DocumentReference::new("a.pdf"),
                DocumentReference::new("a 1.pdf"),
            ],
        };

        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, r#"{"documents":["a.pdf","a 1.pdf"]}"#);

        let parsed: PersistedList = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, list);
    }
}
