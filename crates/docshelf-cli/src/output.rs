//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use docshelf_core::{
    format_size, DocumentEntry, ImportError, ImportReport, Language, ListError, StoreError,
};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
    /// Language for store error descriptions
    pub language: Language,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            language: Language::default(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print a single entry
    pub fn print_entry(&self, entry: &DocumentEntry) {
        match self.format {
            OutputFormat::Human => {
                println!("Position: {}", entry.position + 1);
                println!("Name:     {}", entry.name);
                println!("Path:     {}", entry.path.display());
                if entry.exists {
                    if let Some(size) = entry.size {
                        println!("Size:     {}", format_size(size));
                    }
                    if let Some(modified) = entry.modified {
                        println!("Modified: {}", modified.format("%Y-%m-%d %H:%M"));
                    }
                } else {
                    println!("Status:   missing on disk");
                }
            }
            OutputFormat::Json => {
                println!("{}", to_json(entry));
            }
            OutputFormat::Quiet => {
                println!("{}", entry.path.display());
            }
        }
    }

    /// Print the document list
    pub fn print_entries(&self, entries: &[DocumentEntry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No documents yet. Add some with `docshelf import <FILE>...`");
                    return;
                }
                for entry in entries {
                    let size = entry.size.map(format_size).unwrap_or_default();
                    let marker = if entry.exists { "" } else { " [missing]" };
                    println!(
                        "{:>3}. {}{} {}",
                        entry.position + 1,
                        truncate(&entry.name, 50),
                        marker,
                        size
                    );
                }
                println!("\n{} document(s)", entries.len());
            }
            OutputFormat::Json => {
                println!("{}", to_json(entries));
            }
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.name);
                }
            }
        }
    }

    /// Print the outcome of an import batch
    pub fn print_import_report(&self, report: &ImportReport) {
        match self.format {
            OutputFormat::Human => {
                for imported in &report.imported {
                    println!(
                        "✓ {} -> {} ({})",
                        imported.source.display(),
                        imported.reference.display_name(),
                        format_size(imported.bytes)
                    );
                }
                for failure in &report.failed {
                    eprintln!(
                        "✗ {}: {}",
                        failure.source.display(),
                        self.describe_import_error(&failure.error)
                    );
                }
            }
            OutputFormat::Json => {
                let imported: Vec<_> = report
                    .imported
                    .iter()
                    .map(|i| {
                        serde_json::json!({
                            "source": i.source,
                            "destination": i.destination,
                            "name": i.reference.display_name(),
                            "bytes": i.bytes
                        })
                    })
                    .collect();
                let failed: Vec<_> = report
                    .failed
                    .iter()
                    .map(|f| {
                        serde_json::json!({
                            "source": f.source,
                            "error": self.describe_import_error(&f.error)
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    to_json(&serde_json::json!({"imported": imported, "failed": failed}))
                );
            }
            OutputFormat::Quiet => {
                for imported in &report.imported {
                    println!("{}", imported.reference.display_name());
                }
            }
        }
    }

    /// Describe an import error, localizing store failures
    pub fn describe_import_error(&self, error: &ImportError) -> String {
        match error {
            ImportError::Register {
                source: ListError::Store(store_err),
                ..
            } => match recovery_hint(store_err) {
                Some(hint) => format!(
                    "{} ({}). {}",
                    store_err.describe(self.language),
                    error,
                    hint
                ),
                None => format!("{} ({})", store_err.describe(self.language), error),
            },
            other => other.to_string(),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Suggestion for a store failure the user can fix
fn recovery_hint(error: &StoreError) -> Option<&'static str> {
    match error {
        StoreError::Backend(storage_err) => storage_err.recovery_suggestion(),
        _ => None,
    }
}

/// Suggestion for the first store failure in an error chain
pub fn storage_hint(error: &anyhow::Error) -> Option<&'static str> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<StoreError>().and_then(recovery_hint))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        serde_json::json!({"error": format!("failed to encode output: {}", e)}).to_string()
    })
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
