//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function. Commands that
//! touch the database open one [`TaxonomyStore`] and close it before
//! returning, whatever the outcome.

pub mod analyze;
pub mod apply;
pub mod duplicates;
pub mod export;
pub mod generate;
pub mod inspect;
pub mod sync;

use tracing::debug;
use vtx_sync::db::{DbConfig, TaxonomyStore};

use crate::config::Settings;
use crate::error::Result;
use crate::progress;
use crate::Commands;

/// Dispatch a parsed command
pub async fn execute(command: Commands, verbose: bool) -> Result<()> {
    let settings = Settings::from_env();
    debug!(?settings, "Resolved settings");

    match command {
        Commands::Analyze { dataset, format } => analyze::run(&settings, dataset, format).await,

        Commands::Duplicates { format } => duplicates::run(format).await,

        Commands::Generate { dataset, output } => generate::run(&settings, dataset, output),

        Commands::Apply { seed, dry_run } => apply::run(&settings, seed, dry_run).await,

        Commands::Sync {
            skip_analysis,
            skip_duplicates,
            apply,
            dry_run,
            fail_fast,
            dataset,
            output,
        } => {
            let options = sync::SyncOptions {
                skip_analysis,
                skip_duplicates,
                apply,
                dry_run,
                fail_fast,
                dataset,
                output,
                verbose,
            };
            sync::run(&options).await
        },

        Commands::ExportYaml { input, output } => export::run(&settings, input, output),

        Commands::Inspect {
            pairs,
            slugs,
            model,
            make,
            format,
        } => {
            let targets = inspect::collect_targets(&pairs, &slugs, model.as_deref(), make.as_deref())?;
            inspect::run(&targets, format).await
        },
    }
}

/// Open the command's database connection from environment settings.
///
/// Settings are checked before anything is dialed, so a missing
/// `DATABASE_URL` fails without a network round trip.
pub(crate) async fn open_store(show_progress: bool) -> Result<TaxonomyStore> {
    let config = DbConfig::from_env()?;

    let spinner = if show_progress {
        progress::create_spinner("Connecting to database...")
    } else {
        progress::hidden()
    };
    let store = TaxonomyStore::connect(&config).await;
    spinner.finish_and_clear();

    Ok(store?)
}
