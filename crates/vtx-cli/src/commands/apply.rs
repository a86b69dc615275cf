//! `vtx apply` command implementation

use colored::Colorize;
use std::path::PathBuf;
use tracing::info;
use vtx_sync::seed::{self, ApplyMode, CheckedSeed};

use crate::config::Settings;
use crate::error::{CliError, Result};

/// Apply a seed file inside one transaction
pub async fn run(settings: &Settings, seed_flag: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let seed_path = settings.seed(seed_flag);
    if !seed_path.is_file() {
        return Err(CliError::FileNotFound(seed_path.display().to_string()));
    }

    // Reject a bad seed before dialing the database
    let checked = CheckedSeed::new(seed::read_seed(&seed_path)?)?;
    info!(
        path = %seed_path.display(),
        statements = checked.check().statements,
        "Seed validated"
    );

    let mode = if dry_run { ApplyMode::DryRun } else { ApplyMode::Commit };

    let store = super::open_store(true).await?;
    let outcome = seed::apply(&store, &checked, mode).await;
    store.close().await;
    let outcome = outcome?;

    if outcome.committed {
        println!(
            "{} Applied {} ({} statements, {} rows affected)",
            "✓".green(),
            seed_path.display().to_string().cyan(),
            outcome.check.statements,
            outcome.rows_affected
        );
    } else {
        println!(
            "{} Dry run of {}: {} statements would affect {} rows. Rolled back.",
            "!".yellow(),
            seed_path.display().to_string().cyan(),
            outcome.check.statements,
            outcome.rows_affected
        );
    }

    Ok(())
}
