//! `vtx analyze` command implementation
//!
//! Reports in-scope dataset entries the database does not have.

use colored::Colorize;
use std::path::PathBuf;
use tracing::info;
use vtx_common::YEAR_CUTOFF;
use vtx_sync::compare::{self, MissingReport};
use vtx_sync::dataset;

use crate::config::Settings;
use crate::error::Result;
use crate::output::{self, OutputFormat};

/// Run the analysis
pub async fn run(
    settings: &Settings,
    dataset_flag: Option<PathBuf>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let format = OutputFormat::resolve(format);
    let loaded = dataset::load(settings.dataset(dataset_flag))?;

    let store = super::open_store(format == OutputFormat::Table).await?;
    let snapshot = store.snapshot().await;
    store.close().await;

    let report = compare::find_missing(&loaded.dataset, &snapshot?);
    info!(
        missing_makes = report.makes.len(),
        missing_models = report.models.len(),
        missing_generations = report.generations.len(),
        "Analysis complete"
    );

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            print_report(&report);
            Ok(())
        },
    }
}

fn print_report(report: &MissingReport) {
    println!(
        "{} {} in-scope models checked, {} skipped (all years before {})",
        "Analysis:".cyan().bold(),
        report.checked_models,
        report.out_of_scope_models,
        YEAR_CUTOFF
    );
    println!();

    if report.is_empty() {
        println!("{} The database has every in-scope dataset entry.", "✓".green());
        return;
    }

    if !report.makes.is_empty() {
        println!("{}", format!("Missing makes ({}):", report.makes.len()).yellow().bold());
        let mut table = output::table(["Slug", "Name"]);
        for make in &report.makes {
            table.add_row(vec![make.slug.clone(), make.name.clone()]);
        }
        println!("{table}\n");
    }

    if !report.models.is_empty() {
        println!("{}", format!("Missing models ({}):", report.models.len()).yellow().bold());
        let mut table = output::table(["Make", "Model", "Name", "Years"]);
        for model in &report.models {
            table.add_row(vec![
                model.make_slug.clone(),
                model.model_slug.clone(),
                model.name.clone(),
                output::years(model.first_model_year, model.last_model_year),
            ]);
        }
        println!("{table}\n");
    }

    if !report.generations.is_empty() {
        println!(
            "{}",
            format!("Missing generations ({}):", report.generations.len()).yellow().bold()
        );
        let mut table = output::table(["Make", "Model", "Code"]);
        for generation in &report.generations {
            table.add_row(vec![
                generation.make_slug.clone(),
                generation.model_slug.clone(),
                generation.code.clone(),
            ]);
        }
        println!("{table}\n");
    }

    println!("Run 'vtx generate' and 'vtx apply' to add them.");
}
