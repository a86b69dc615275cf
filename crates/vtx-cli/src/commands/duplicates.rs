//! `vtx duplicates` command implementation

use colored::Colorize;
use tracing::info;
use vtx_sync::compare::{self, DuplicateReport};

use crate::error::Result;
use crate::output::{self, OutputFormat};

/// Report duplicate models and generations in the database
pub async fn run(format: Option<OutputFormat>) -> Result<()> {
    let format = OutputFormat::resolve(format);

    let store = super::open_store(format == OutputFormat::Table).await?;
    let snapshot = store.snapshot().await;
    store.close().await;

    let report = compare::find_duplicates(&snapshot?);
    info!(
        model_clusters = report.models.len(),
        generation_clusters = report.generations.len(),
        "Duplicate detection complete"
    );

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            print_report(&report);
            Ok(())
        },
    }
}

fn print_report(report: &DuplicateReport) {
    if report.is_empty() {
        println!("{} No duplicate models or generations found.", "✓".green());
        return;
    }

    if !report.models.is_empty() {
        println!(
            "{}",
            format!("Duplicate models ({} clusters):", report.models.len()).yellow().bold()
        );
        let mut table = output::table(["Make", "Key", "Slug", "Name", "Years", "Id"]);
        for cluster in &report.models {
            for model in &cluster.models {
                table.add_row(vec![
                    cluster.make_slug.clone(),
                    cluster.key.clone(),
                    model.slug.clone(),
                    model.name.clone(),
                    output::years(model.first_model_year, model.last_model_year),
                    model.id.to_string(),
                ]);
            }
        }
        println!("{table}\n");
    }

    if !report.generations.is_empty() {
        println!(
            "{}",
            format!("Duplicate generations ({} clusters):", report.generations.len())
                .yellow()
                .bold()
        );
        let mut table = output::table(["Make", "Model", "Key", "Code", "Years", "Id"]);
        for cluster in &report.generations {
            for generation in &cluster.generations {
                table.add_row(vec![
                    cluster.make_slug.clone(),
                    cluster.model_slug.clone(),
                    cluster.key.clone(),
                    generation.code.clone(),
                    output::years(Some(generation.start_year), generation.end_year),
                    generation.id.to_string(),
                ]);
            }
        }
        println!("{table}\n");
    }
}
