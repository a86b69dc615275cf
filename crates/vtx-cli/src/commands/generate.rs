//! `vtx generate` command implementation
//!
//! Works offline: reads the dataset and writes the seed file.

use colored::Colorize;
use std::path::PathBuf;
use vtx_common::checksum;
use vtx_sync::dataset;
use vtx_sync::seed::{self, Provenance};

use crate::config::Settings;
use crate::error::Result;

/// Generate the seed file
pub fn run(settings: &Settings, dataset_flag: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let dataset_path = settings.dataset(dataset_flag);
    let seed_path = settings.seed(output);

    let loaded = dataset::load(&dataset_path)?;
    let provenance = Provenance::new(dataset_path.display().to_string(), loaded.checksum.clone());
    let script = seed::generate(&loaded.dataset, &provenance);
    seed::write_seed(&script, &seed_path)?;

    let stats = script.stats;
    println!("{} Seed written to: {}", "✓".green(), seed_path.display().to_string().cyan());
    println!("  Dataset:      {} ({})", dataset_path.display(), checksum::short(&loaded.checksum));
    println!("  Makes:        {}", stats.makes);
    println!("  Models:       {} ({} out of scope)", stats.models, stats.skipped_models);
    println!("  Generations:  {}", stats.generations);
    println!("  Translations: {}", stats.translations);
    println!("  Insights:     {}", stats.insights);

    Ok(())
}
