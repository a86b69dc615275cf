//! VTX CLI Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Command-line interface for keeping the marketplace vehicle taxonomy in
//! line with the bundled dataset.
//!
//! # Overview
//!
//! - **Analysis**: report dataset entries missing from the database (`vtx analyze`)
//! - **Duplicates**: report database models that name the same vehicle twice (`vtx duplicates`)
//! - **Seeding**: write an idempotent SQL seed (`vtx generate`) and apply it (`vtx apply`)
//! - **Orchestration**: run the steps above as one job (`vtx sync`)
//! - **Export**: turn the editorial YAML taxonomy into the JSON dataset (`vtx export-yaml`)
//! - **Inspection**: show what the database holds for given models (`vtx inspect`)

pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use error::{CliError, Result};
pub use output::OutputFormat;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// VTX - Vehicle taxonomy reconciliation
#[derive(Parser, Debug)]
#[command(name = "vtx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the full command reference as Markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report dataset makes, models and generations missing from the database
    Analyze {
        /// Dataset JSON file [env: VTX_DATASET, default: data/vehicles.json]
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Output format (table or json; defaults to table on a terminal)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Report duplicate models and generations in the database
    Duplicates {
        /// Output format (table or json; defaults to table on a terminal)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Write an idempotent SQL seed for every in-scope dataset model
    Generate {
        /// Dataset JSON file [env: VTX_DATASET, default: data/vehicles.json]
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Seed output path [env: VTX_SEED_PATH, default: seeds/vehicle_taxonomy.sql]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a seed file inside a single transaction
    Apply {
        /// Seed file [env: VTX_SEED_PATH, default: seeds/vehicle_taxonomy.sql]
        seed: Option<PathBuf>,

        /// Execute the seed, then roll back
        #[arg(long)]
        dry_run: bool,
    },

    /// Run analysis, duplicate detection, generation and (optionally) apply
    Sync {
        /// Skip the missing-entry analysis
        #[arg(long)]
        skip_analysis: bool,

        /// Skip duplicate detection
        #[arg(long)]
        skip_duplicates: bool,

        /// Apply the generated seed
        #[arg(long)]
        apply: bool,

        /// Apply the generated seed, then roll back (implies --apply)
        #[arg(long)]
        dry_run: bool,

        /// Stop at the first failing step
        #[arg(long)]
        fail_fast: bool,

        /// Dataset JSON file passed to every step
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Seed path passed to the generate and apply steps
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert the YAML taxonomy into the JSON dataset
    ExportYaml {
        /// YAML taxonomy [env: VTX_TAXONOMY, default: data/taxonomy.yaml]
        input: Option<PathBuf>,

        /// JSON dataset to write [env: VTX_DATASET, default: data/vehicles.json]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show what the database holds for one or more models
    Inspect {
        /// Models as make/model pairs (e.g., "bmw/5-series")
        pairs: Vec<String>,

        /// Comma-separated make/model pairs
        #[arg(long, env = "SLUGS", value_delimiter = ',')]
        slugs: Vec<String>,

        /// Model slug, used together with --make
        #[arg(long, env = "MODEL_SLUG")]
        model: Option<String>,

        /// Make slug for --model
        #[arg(long)]
        make: Option<String>,

        /// Output format (table or json; defaults to table on a terminal)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sync_flags() {
        let cli = Cli::parse_from(["vtx", "sync", "--skip-analysis", "--dry-run", "-d", "x.json"]);
        match cli.command {
            Some(Commands::Sync {
                skip_analysis,
                skip_duplicates,
                apply,
                dry_run,
                dataset,
                ..
            }) => {
                assert!(skip_analysis);
                assert!(!skip_duplicates);
                assert!(!apply);
                assert!(dry_run);
                assert_eq!(dataset, Some(PathBuf::from("x.json")));
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_inspect_pairs() {
        let cli = Cli::parse_from(["vtx", "-v", "inspect", "bmw/5-series", "audi/a4", "-f", "json"]);
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Inspect { pairs, format, .. }) => {
                assert_eq!(pairs, vec!["bmw/5-series", "audi/a4"]);
                assert_eq!(format, Some(OutputFormat::Json));
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
