//! Build automation tasks for VTX
//!
//! - Generating the CLI reference from the clap definitions
//! - Checking that the committed reference is current

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for VTX", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,

        /// Fail instead of writing when the file on disk is out of date
        #[arg(long)]
        check: bool,
    },
}

const REFERENCE_FILE: &str = "cli-reference.md";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir, check } => generate_cli_docs(&output_dir, check)?,
    }

    Ok(())
}

fn render_reference(markdown: &str) -> String {
    format!(
        r#"# VTX CLI Reference

This reference is generated from the CLI source code.

## Overview

`vtx` keeps the marketplace vehicle taxonomy (makes, models, generations and
their translations) in line with the bundled dataset in `data/vehicles.json`.
Models whose model years all fall before 1980 are out of scope.

## Environment

| Variable | Purpose |
|----------|---------|
| `DATABASE_URL` / `SUPABASE_DB_URL` | Connection string |
| `SUPABASE_DB_HOST`, `SUPABASE_DB_PORT`, `SUPABASE_DB_NAME`, `SUPABASE_DB_USER`, `SUPABASE_DB_PASSWORD` | Connection parts when no URL is set |
| `SUPABASE_SERVICE_ROLE_KEY` | Password fallback |
| `PGSSL_REJECT_UNAUTHORIZED` | `false` skips certificate checks, `true` verifies fully |
| `VTX_DATASET`, `VTX_SEED_PATH`, `VTX_TAXONOMY` | Default file locations |
| `SLUGS`, `MODEL_SLUG` | Inputs for `vtx inspect` |
| `LOG_LEVEL`, `LOG_FORMAT`, `LOG_OUTPUT`, `LOG_DIR`, `LOG_FILTER` | Logging |

A `.env` file in the working directory is loaded when present.

## Quick Start

```bash
# What is missing from the database?
vtx analyze

# Which models are stored twice?
vtx duplicates

# Write and apply the seed
vtx generate
vtx apply --dry-run
vtx apply

# Or all of the above as one job
vtx sync --apply

# Look at specific models
vtx inspect bmw/5-series audi/a4
```

## Commands

{markdown}

---

*To update, run `cargo xtask generate-cli-docs`.*
"#
    )
}

fn generate_cli_docs(output_dir: &str, check: bool) -> anyhow::Result<()> {
    let markdown = clap_markdown::help_markdown::<vtx_cli::Cli>();
    let content = render_reference(&markdown);

    let output_path = PathBuf::from(output_dir);
    let file_path = output_path.join(REFERENCE_FILE);

    if check {
        return check_current(&file_path, &content);
    }

    fs::create_dir_all(&output_path)?;
    fs::write(&file_path, content)?;

    println!(
        "✅ Generated CLI documentation at: {} ({})",
        file_path.display(),
        chrono::Utc::now().format("%Y-%m-%d")
    );

    Ok(())
}

fn check_current(path: &Path, expected: &str) -> anyhow::Result<()> {
    let current = fs::read_to_string(path).unwrap_or_default();
    if current != expected {
        anyhow::bail!(
            "{} is out of date. Run `cargo xtask generate-cli-docs`.",
            path.display()
        );
    }
    println!("✅ {} is up to date", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_embeds_commands() {
        let content = render_reference("## `vtx analyze`");
        assert!(content.starts_with("# VTX CLI Reference"));
        assert!(content.contains("## `vtx analyze`"));
    }
}
