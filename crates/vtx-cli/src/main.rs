//! VTX CLI - Main entry point

use clap::Parser;
use colored::Colorize;
use std::process;
use tracing::error;
use vtx_cli::Cli;
use vtx_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env is fine; the environment may already be set
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    let Some(command) = cli.command else {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    };

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Stderr)
        .build();

    // Environment variables take precedence
    let log_config = match log_config.clone().merge_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring invalid logging environment: {e}");
            log_config
        },
    };

    // The CLI works without logging
    let guard = init_logging(&log_config).unwrap_or_else(|e| {
        eprintln!("Warning: logging disabled: {e}");
        None
    });

    let result = vtx_cli::commands::execute(command, cli.verbose).await;

    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("{} {}", "Error:".red().bold(), e);
        drop(guard);
        process::exit(1);
    }
}
