//! Document command handlers

use std::path::Path;

use anyhow::{bail, Context, Result};

use docshelf_core::{DocumentEntry, Shelf};

use crate::output::Output;
use crate::prompt::confirm;

/// List all documents
pub fn list(shelf: &Shelf, output: &Output) -> Result<()> {
    output.print_entries(&shelf.entries());
    Ok(())
}

/// Show a single document
pub fn show(shelf: &Shelf, position: usize, output: &Output) -> Result<()> {
    let entry = lookup(shelf, position)?;
    output.print_entry(&entry);
    Ok(())
}

/// Preview a document with the system default application
pub fn open(shelf: &Shelf, position: usize, output: &Output) -> Result<()> {
    let entry = lookup(shelf, position)?;

    if !entry.exists {
        bail!(
            "'{}' is missing on disk (expected at {})",
            entry.name,
            entry.path.display()
        );
    }

    preview(&entry.name, &entry.path, output)
}

/// Launch the system default application for `path`
pub fn preview(name: &str, path: &Path, output: &Output) -> Result<()> {
    ::open::that(path).with_context(|| format!("Failed to open {:?}", path))?;
    output.message(&format!("Opened {}", name));
    Ok(())
}

/// Remove a document from the list
pub fn remove(shelf: &mut Shelf, position: usize, yes: bool, output: &Output) -> Result<()> {
    let entry = lookup(shelf, position)?;

    if !yes && output.should_prompt() {
        let prompt = if shelf.list().mode().owns_files() {
            format!("Remove '{}' and delete its file?", entry.name)
        } else {
            format!("Remove '{}' from the list?", entry.name)
        };
        if !confirm(&prompt)? {
            output.message("Cancelled");
            return Ok(());
        }
    }

    let removed = shelf.remove(entry.position)?;
    output.success(&format!("Removed {}", removed.display_name()));
    Ok(())
}

/// Resolve a 1-based position to its entry
fn lookup(shelf: &Shelf, position: usize) -> Result<DocumentEntry> {
    let index = to_index(position)?;
    let mut entries = shelf.entries();
    let count = entries.len();

    if index >= count {
        bail!(
            "No document at position {} (the shelf has {} document(s))",
            position,
            count
        );
    }

    Ok(entries.swap_remove(index))
}

/// Convert a 1-based position to a list index
fn to_index(position: usize) -> Result<usize> {
    match position.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("Positions start at 1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use docshelf_core::Config;
    use std::fs;
    use tempfile::TempDir;

    fn shelf_with(temp_dir: &TempDir, names: &[&str]) -> Shelf {
        let config = Config {
            data_dir: temp_dir.path().join("data"),
            ..Config::default()
        };
        let mut shelf = Shelf::open_with_config(config).unwrap();

        let inbox = temp_dir.path().join("inbox");
        fs::create_dir_all(&inbox).unwrap();
        let sources: Vec<_> = names
            .iter()
            .map(|name| {
                let path = inbox.join(name);
                fs::write(&path, name.as_bytes()).unwrap();
                path
            })
            .collect();
        assert!(shelf.import_files(&sources).is_success());
        shelf
    }

    #[test]
    fn test_to_index() {
        assert_eq!(to_index(1).unwrap(), 0);
        assert_eq!(to_index(7).unwrap(), 6);
        assert!(to_index(0).is_err());
    }

    #[test]
    fn test_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let shelf = shelf_with(&temp_dir, &["a.pdf", "b.pdf"]);

        assert_eq!(lookup(&shelf, 2).unwrap().name, "b.pdf");
        assert!(lookup(&shelf, 3).is_err());
        assert!(lookup(&shelf, 0).is_err());
    }

    #[test]
    fn test_remove_with_yes() {
        let temp_dir = TempDir::new().unwrap();
        let mut shelf = shelf_with(&temp_dir, &["a.pdf", "b.pdf"]);
        let output = Output::new(OutputFormat::Quiet);

        remove(&mut shelf, 1, true, &output).unwrap();

        let names: Vec<_> = shelf.entries().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["b.pdf"]);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let shelf = shelf_with(&temp_dir, &["a.pdf"]);
        fs::remove_file(shelf.resolve(0).unwrap()).unwrap();

        let err = open(&shelf, 1, &Output::new(OutputFormat::Quiet)).unwrap_err();

        assert!(err.to_string().contains("missing on disk"));
    }
}
