//! Status command handler

use anyhow::Result;

use docshelf_core::Shelf;

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(shelf: &Shelf, output: &Output) -> Result<()> {
    let stats = shelf.stats();
    let config = shelf.config();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "documents_dir": shelf.documents_dir(),
                    "store_dir": config.store_dir(),
                    "reference_mode": config.reference_mode,
                    "suffix_style": config.suffix_style,
                    "language": config.language.code(),
                    "counts": {
                        "documents": stats.documents,
                        "missing": stats.missing
                    },
                    "total_size": stats.total_size
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", stats.documents);
        }
        OutputFormat::Human => {
            println!("docshelf Status");
            println!("===============");
            println!();
            println!("Storage:");
            println!("  Data:      {}", config.data_dir.display());
            println!("  Documents: {}", shelf.documents_dir().display());
            println!("  Records:   {}", config.store_dir().display());
            println!();
            println!("Settings:");
            println!("  Reference mode: {}", config.reference_mode);
            println!("  Suffix style:   {:?}", config.suffix_style);
            println!("  Language:       {}", config.language.code());
            println!();
            println!("Contents:");
            println!("  Documents: {}", stats.documents);
            if stats.missing > 0 {
                println!("  Missing:   {}", stats.missing);
            }
            println!("  Size:      {}", stats.total_size_human());
        }
    }

    Ok(())
}
