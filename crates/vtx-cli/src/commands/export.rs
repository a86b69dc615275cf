//! `vtx export-yaml` command implementation

use colored::Colorize;
use std::path::PathBuf;
use vtx_sync::yaml;

use crate::config::Settings;
use crate::error::{CliError, Result};

/// Convert the YAML taxonomy into the JSON dataset
pub fn run(settings: &Settings, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let input = settings.taxonomy(input);
    let output = settings.dataset(output);

    if !input.is_file() {
        return Err(CliError::FileNotFound(input.display().to_string()));
    }

    let dataset = yaml::export(&input, &output)?;

    println!("{} Dataset written to: {}", "✓".green(), output.display().to_string().cyan());
    println!("  Makes:       {}", dataset.makes.len());
    println!("  Models:      {}", dataset.model_count());
    println!("  Generations: {}", dataset.generation_count());

    Ok(())
}
