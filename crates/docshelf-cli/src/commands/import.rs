//! Import command handler

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::warn;

use docshelf_core::{ImportReport, Shelf};

use crate::commands::document::preview;
use crate::output::Output;

/// Import files into the managed directory
///
/// Every file is attempted. The command fails if any of them did.
/// With `open_after`, each registered copy is previewed once the batch is done.
pub async fn import(
    shelf: &mut Shelf,
    files: Vec<PathBuf>,
    open_after: bool,
    output: &Output,
) -> Result<()> {
    let total = files.len();
    let report = shelf.import_files_async(files).await;

    output.print_import_report(&report);

    if open_after {
        for (name, path) in to_preview(&report) {
            if let Err(e) = preview(&name, path, output) {
                warn!("could not preview {:?}: {:#}", path, e);
                eprintln!("✗ {}: {:#}", name, e);
            }
        }
    }

    if !report.is_success() {
        bail!(
            "{} of {} file(s) failed to import",
            report.failed.len(),
            total
        );
    }

    Ok(())
}

/// Registered copies to preview, in import order
fn to_preview(report: &ImportReport) -> Vec<(String, &Path)> {
    report
        .imported
        .iter()
        .map(|imported| {
            (
                imported.reference.display_name(),
                imported.destination.as_path(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshelf_core::{DocumentReference, ImportError, ImportFailure, Imported};

    fn imported(source: &str, destination: &str) -> Imported {
        Imported {
            source: PathBuf::from(source),
            destination: PathBuf::from(destination),
            reference: DocumentReference::new(Path::new(destination).file_name().unwrap()),
            bytes: 1,
        }
    }

    #[test]
    fn test_to_preview_skips_failures() {
        let report = ImportReport {
            imported: vec![
                imported("/inbox/a.pdf", "/docs/a.pdf"),
                imported("/other/a.pdf", "/docs/a 1.pdf"),
            ],
            failed: vec![ImportFailure {
                source: PathBuf::from("/inbox"),
                error: ImportError::InvalidSource {
                    path: PathBuf::from("/inbox/.."),
                },
            }],
        };

        let selected = to_preview(&report);

        assert_eq!(
            selected,
            vec![
                ("a.pdf".to_string(), Path::new("/docs/a.pdf")),
                ("a 1.pdf".to_string(), Path::new("/docs/a 1.pdf")),
            ]
        );
    }

    #[test]
    fn test_to_preview_empty_when_nothing_imported() {
        let report = ImportReport::default();

        assert!(to_preview(&report).is_empty());
    }
}
