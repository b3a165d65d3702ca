//! Config command handlers

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};

use docshelf_core::{Config, Language};

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "documents_dir": config.documents_dir(),
                    "reference_mode": config.reference_mode,
                    "suffix_style": config.suffix_style,
                    "max_collision_attempts": config.max_collision_attempts,
                    "language": config.language.code(),
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:               {}", config.data_dir.display());
            println!(
                "  documents_dir:          {}",
                config.documents_dir().display()
            );
            println!("  reference_mode:         {}", config.reference_mode);
            println!("  suffix_style:           {:?}", config.suffix_style);
            println!(
                "  max_collision_attempts: {}",
                config.max_collision_attempts
            );
            println!("  language:               {}", config.language.code());
            println!("  log_file:               {}", display_optional(config.log_file.as_deref()));
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    // Env overrides apply per run and must not end up in the file
    let mut config = Config::read_file(&save_path).context("Failed to load configuration")?;

    match key.as_str() {
        "data_dir" => {
            config.data_dir = value.clone().into();
        }
        "documents_dir" => {
            config.documents_dir = optional_path(&value);
        }
        "reference_mode" => {
            config.reference_mode = value.parse().map_err(|e: String| anyhow!(e))?;
        }
        "suffix_style" => {
            config.suffix_style = value.parse().map_err(|e: String| anyhow!(e))?;
        }
        "max_collision_attempts" => {
            config.max_collision_attempts = value
                .parse()
                .context("Invalid value for max_collision_attempts. Use a positive number.")?;
        }
        "language" => {
            config.language = Language::from_code(&value)
                .ok_or_else(|| anyhow!("Unknown language '{}'. Use 'en' or 'he'.", value))?;
        }
        "log_file" => {
            config.log_file = optional_path(&value);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, documents_dir, reference_mode, suffix_style, \
                 max_collision_attempts, language, log_file",
                key
            );
        }
    }

    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.into())
    }
}

fn display_optional(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}
