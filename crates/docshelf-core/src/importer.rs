//! Collision-safe document import
//!
//! Copies an external file into the managed directory without overwriting
//! anything, then registers it with the `DocumentList`.
//!
//! ## Naming
//!
//! The first candidate is the source's own file name. While a candidate is
//! taken, a counter is inserted before the extension:
//!
//! ```text
//! report.pdf -> report 1.pdf -> report 2.pdf ...      (SuffixStyle::Spaced)
//! report.pdf -> report (1).pdf -> report (2).pdf ...  (SuffixStyle::Parenthesized)
//! ```
//!
//! The search gives up after `max_attempts` suffixes.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::documents::{DocumentList, ListError};
use crate::fs::Fs;
use crate::models::{DocumentReference, ReferenceMode};

/// Default cap on disambiguation attempts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

/// How the collision counter is formatted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuffixStyle {
    /// `name 1.ext`
    #[default]
    Spaced,
    /// `name (1).ext`
    Parenthesized,
}

impl std::str::FromStr for SuffixStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spaced" => Ok(SuffixStyle::Spaced),
            "parenthesized" => Ok(SuffixStyle::Parenthesized),
            other => Err(format!(
                "unknown suffix style '{}' (expected spaced or parenthesized)",
                other
            )),
        }
    }
}

/// Errors from importing a single file
#[derive(Error, Debug)]
pub enum ImportError {
    /// The source path has no file name component
    #[error("Cannot import '{path}': path has no file name")]
    InvalidSource { path: PathBuf },

    /// Copying into the managed directory failed
    #[error("Failed to copy '{source_path}' to '{destination}': {source}")]
    CopyFailed {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Every candidate name up to the cap was taken
    #[error("No free name for '{name}' after {attempts} attempts")]
    TooManyCollisions { name: String, attempts: u32 },

    /// The copy succeeded but the list could not record it
    #[error("Copied to '{destination}' but could not register it: {source}")]
    Register {
        destination: PathBuf,
        #[source]
        source: ListError,
    },

    /// The background copy task did not complete
    #[error("Import task failed: {0}")]
    Task(String),
}

/// A successfully imported file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub reference: DocumentReference,
    pub bytes: u64,
}

/// A file that failed to import
#[derive(Debug)]
pub struct ImportFailure {
    pub source: PathBuf,
    pub error: ImportError,
}

/// Outcome of a batch import
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<Imported>,
    pub failed: Vec<ImportFailure>,
}

impl ImportReport {
    fn record(&mut self, source: PathBuf, result: Result<Imported, ImportError>) {
        match result {
            Ok(imported) => self.imported.push(imported),
            Err(error) => {
                warn!("failed to import {:?}: {}", source, error);
                self.failed.push(ImportFailure { source, error });
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Copies external files into the managed directory
#[derive(Debug, Clone)]
pub struct Importer {
    managed_dir: PathBuf,
    fs: Fs,
    style: SuffixStyle,
    max_attempts: u32,
}

impl Importer {
    pub fn new(managed_dir: impl Into<PathBuf>, fs: Fs) -> Self {
        Self {
            managed_dir: managed_dir.into(),
            fs,
            style: SuffixStyle::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Importer writing into the list's managed directory
    pub fn for_list(list: &DocumentList, fs: Fs) -> Self {
        Self::new(list.managed_dir(), fs)
    }

    pub fn with_suffix_style(mut self, style: SuffixStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn managed_dir(&self) -> &Path {
        &self.managed_dir
    }

    pub fn suffix_style(&self) -> SuffixStyle {
        self.style
    }

    /// File name for the `n`th candidate. `n == 0` is the original name.
    pub fn candidate_name(&self, file_name: &OsStr, n: u32) -> OsString {
        if n == 0 {
            return file_name.to_os_string();
        }

        let path = Path::new(file_name);
        let mut name = path.file_stem().unwrap_or(file_name).to_os_string();
        match self.style {
            SuffixStyle::Spaced => name.push(format!(" {}", n)),
            SuffixStyle::Parenthesized => name.push(format!(" ({})", n)),
        }
        if let Some(ext) = path.extension() {
            name.push(".");
            name.push(ext);
        }
        name
    }

    /// Copy `source` to the first free candidate in the managed directory
    ///
    /// Returns the destination and the number of bytes copied.
    pub fn place(&self, source: &Path) -> Result<(PathBuf, u64), ImportError> {
        let file_name = source.file_name().ok_or_else(|| ImportError::InvalidSource {
            path: source.to_path_buf(),
        })?;

        self.fs
            .create_dir_all(&self.managed_dir)
            .map_err(|e| ImportError::CopyFailed {
                source_path: source.to_path_buf(),
                destination: self.managed_dir.clone(),
                source: e,
            })?;

        for attempt in 0..=self.max_attempts {
            let candidate = self
                .managed_dir
                .join(self.candidate_name(file_name, attempt));

            if self.fs.exists(&candidate) {
                continue;
            }

            match self.fs.copy_new(source, &candidate) {
                Ok(bytes) => return Ok((candidate, bytes)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("{:?} appeared before copy, trying next name", candidate);
                }
                Err(e) => {
                    return Err(ImportError::CopyFailed {
                        source_path: source.to_path_buf(),
                        destination: candidate,
                        source: e,
                    })
                }
            }
        }

        Err(ImportError::TooManyCollisions {
            name: file_name.to_string_lossy().into_owned(),
            attempts: self.max_attempts,
        })
    }

    /// Record a placed file in the list
    ///
    /// If the list refuses it, the copy is removed again.
    fn register(
        &self,
        list: &mut DocumentList,
        source: &Path,
        (destination, bytes): (PathBuf, u64),
    ) -> Result<Imported, ImportError> {
        let reference = match list.mode() {
            ReferenceMode::AbsolutePath => DocumentReference::new(&destination),
            ReferenceMode::ManagedName => match destination.file_name() {
                Some(name) => DocumentReference::new(name),
                None => DocumentReference::new(&destination),
            },
        };

        if let Err(e) = list.append(reference.clone()) {
            if let Err(remove_err) = self.fs.remove_file(&destination) {
                warn!(
                    "failed to clean up unregistered copy {:?}: {}",
                    destination, remove_err
                );
            }
            return Err(ImportError::Register {
                destination,
                source: e,
            });
        }

        info!(
            "imported {:?} as {:?} ({} bytes)",
            source, destination, bytes
        );

        Ok(Imported {
            source: source.to_path_buf(),
            destination,
            reference,
            bytes,
        })
    }

    /// Import a single file into the list
    pub fn import_file(
        &self,
        list: &mut DocumentList,
        source: &Path,
    ) -> Result<Imported, ImportError> {
        let placed = self.place(source)?;
        self.register(list, source, placed)
    }

    /// Import each source in order
    ///
    /// A failure only skips that file; the rest of the batch still runs.
    pub fn import_files<P: AsRef<Path>>(
        &self,
        list: &mut DocumentList,
        sources: &[P],
    ) -> ImportReport {
        let mut report = ImportReport::default();
        for source in sources {
            let source = source.as_ref();
            report.record(source.to_path_buf(), self.import_file(list, source));
        }
        report
    }

    /// Import each source with the copy running on the blocking pool
    ///
    /// Copies run one at a time, so collision probing never races.
    /// Registration happens on the calling task after each copy completes.
    pub async fn import_files_async(
        &self,
        list: &mut DocumentList,
        sources: Vec<PathBuf>,
    ) -> ImportReport {
        let mut report = ImportReport::default();

        for source in sources {
            let importer = self.clone();
            let task_source = source.clone();
            let placed =
                tokio::task::spawn_blocking(move || importer.place(&task_source)).await;

            let result = match placed {
                Ok(Ok(placed)) => self.register(list, &source, placed),
                Ok(Err(e)) => Err(e),
                Err(join_err) => Err(ImportError::Task(join_err.to_string())),
            };
            report.record(source, result);
        }

        report
    }
}
