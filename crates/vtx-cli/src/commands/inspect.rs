//! `vtx inspect` command implementation
//!
//! Shows the stored row, generations and translations for given models.
//! An unknown model is a warning, not a failure.

use colored::Colorize;
use serde::Serialize;
use tracing::warn;
use vtx_common::slug;
use vtx_sync::db::{ModelDetail, TaxonomyStore, TranslationCount};

use crate::error::{CliError, Result};
use crate::output::{self, OutputFormat};

/// One make/model pair to look up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub make_slug: String,
    pub model_slug: String,
}

impl Target {
    /// Parse `make/model`
    pub fn parse(pair: &str) -> Result<Self> {
        let Some((make, model)) = pair.split_once('/') else {
            return Err(CliError::invalid_args(format!(
                "'{pair}' is not a make/model pair (e.g., bmw/5-series)"
            )));
        };

        let target = Self {
            make_slug: slug::normalize_key(make),
            model_slug: slug::normalize_key(model),
        };
        if target.make_slug.is_empty() || target.model_slug.is_empty() || target.model_slug.contains('/') {
            return Err(CliError::invalid_args(format!(
                "'{pair}' is not a make/model pair (e.g., bmw/5-series)"
            )));
        }
        Ok(target)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.make_slug, self.model_slug)
    }
}

/// Gather targets from positional pairs, `SLUGS` and `MODEL_SLUG` + `--make`.
///
/// Order is kept and repeats are dropped.
pub fn collect_targets(
    pairs: &[String],
    slugs: &[String],
    model: Option<&str>,
    make: Option<&str>,
) -> Result<Vec<Target>> {
    let mut targets: Vec<Target> = Vec::new();

    for pair in pairs.iter().chain(slugs).filter(|p| !p.trim().is_empty()) {
        let target = Target::parse(pair)?;
        if !targets.contains(&target) {
            targets.push(target);
        }
    }

    match (model.filter(|m| !m.trim().is_empty()), make) {
        (Some(model), Some(make)) => {
            let target = Target::parse(&format!("{make}/{model}"))?;
            if !targets.contains(&target) {
                targets.push(target);
            }
        },
        (Some(model), None) => {
            return Err(CliError::invalid_args(format!(
                "model '{model}' needs a make: pass --make or use make/model"
            )));
        },
        (None, _) => {},
    }

    if targets.is_empty() {
        return Err(CliError::invalid_args(
            "nothing to inspect: pass make/model pairs, set SLUGS, or set MODEL_SLUG with --make",
        ));
    }

    Ok(targets)
}

/// How a lookup ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    Found,
    /// The make exists, the model does not
    ModelNotFound,
    MakeNotFound,
}

impl LookupStatus {
    pub fn describe(&self) -> &'static str {
        match self {
            LookupStatus::Found => "found",
            LookupStatus::ModelNotFound => "model not found",
            LookupStatus::MakeNotFound => "make not found",
        }
    }
}

/// Lookup result for one target
#[derive(Debug, Serialize)]
pub struct Inspection {
    #[serde(flatten)]
    pub target: Target,
    pub status: LookupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ModelDetail>,
}

impl Inspection {
    pub fn found(&self) -> bool {
        self.status == LookupStatus::Found
    }
}

/// Everything `vtx inspect` prints
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub models: Vec<Inspection>,
    /// Store-wide translated names per entity and locale
    pub translation_counts: Vec<TranslationCount>,
}

/// Look up each target and print what the database holds
pub async fn run(targets: &[Target], format: Option<OutputFormat>) -> Result<()> {
    let format = OutputFormat::resolve(format);

    let store = super::open_store(format == OutputFormat::Table).await?;
    let report = lookup(&store, targets).await;
    store.close().await;
    let report = report?;

    for missing in report.models.iter().filter(|i| !i.found()) {
        warn!(model = %missing.target, status = missing.status.describe(), "Lookup failed");
    }

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            for inspection in &report.models {
                print_inspection(inspection);
            }
            print_translation_counts(&report.translation_counts);
            Ok(())
        },
    }
}

async fn lookup(store: &TaxonomyStore, targets: &[Target]) -> vtx_sync::Result<InspectReport> {
    let mut models = Vec::with_capacity(targets.len());
    for target in targets {
        let detail = store.find_model(&target.make_slug, &target.model_slug).await?;
        let status = if detail.is_some() {
            LookupStatus::Found
        } else if store.find_make(&target.make_slug).await?.is_some() {
            LookupStatus::ModelNotFound
        } else {
            LookupStatus::MakeNotFound
        };
        models.push(Inspection {
            target: target.clone(),
            status,
            detail,
        });
    }

    Ok(InspectReport {
        models,
        translation_counts: store.fetch_translation_counts().await?,
    })
}

fn print_translation_counts(counts: &[TranslationCount]) {
    println!("{}", "Translations in store:".cyan().bold());
    if counts.is_empty() {
        println!("  none");
        return;
    }

    let mut table = output::table(["Entity", "Locale", "Names"]);
    for count in counts {
        table.add_row(vec![count.entity.clone(), count.locale.clone(), count.count.to_string()]);
    }
    println!("{table}");
}

fn print_inspection(inspection: &Inspection) {
    let Some(detail) = &inspection.detail else {
        eprintln!(
            "{} {}: {} in the database",
            "Warning:".yellow().bold(),
            inspection.target,
            inspection.status.describe()
        );
        return;
    };

    let model = &detail.model;
    println!("{}", inspection.target.to_string().green().bold());
    println!("  Id:          {}", model.id);
    println!("  Name:        {} ({})", model.name, model.make_name);
    println!("  Years:       {}", output::years(model.first_model_year, model.last_model_year));
    if let Some(years) = &model.years_available {
        let years: Vec<String> = years.iter().map(i32::to_string).collect();
        println!("  Available:   {}", years.join(", "));
    }
    println!("  Insights:    {}", detail.insight_count);

    if detail.translations.is_empty() {
        println!("  Translations: none");
    } else {
        println!("  Translations:");
        for translation in &detail.translations {
            println!("    {}: {}", translation.locale, translation.name);
        }
    }

    if detail.generations.is_empty() {
        println!("  Generations: none");
    } else {
        let mut table = output::table(["Code", "Years", "Id"]);
        for generation in &detail.generations {
            table.add_row(vec![
                generation.code.clone(),
                output::years(Some(generation.start_year), generation.end_year),
                generation.id.to_string(),
            ]);
        }
        println!("{table}");
    }
    println!();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_pair() {
        let target = Target::parse(" BMW/5-Series ").unwrap();
        assert_eq!(target.make_slug, "bmw");
        assert_eq!(target.model_slug, "5-series");
        assert_eq!(target.to_string(), "bmw/5-series");
    }

    #[test]
    fn test_parse_rejects_malformed_pairs() {
        for pair in ["bmw", "/5-series", "bmw/", "bmw/5/series"] {
            assert!(Target::parse(pair).is_err(), "{pair} accepted");
        }
    }

    #[test]
    fn test_collect_merges_sources_in_order() {
        let targets = collect_targets(
            &strings(&["bmw/5-series"]),
            &strings(&["audi/a4", "bmw/5-series", ""]),
            Some("niva"),
            Some("lada"),
        )
        .unwrap();

        let rendered: Vec<String> = targets.iter().map(Target::to_string).collect();
        assert_eq!(rendered, vec!["bmw/5-series", "audi/a4", "lada/niva"]);
    }

    #[test]
    fn test_model_without_make_is_an_error() {
        let err = collect_targets(&[], &[], Some("niva"), None).unwrap_err();
        assert!(err.to_string().contains("--make"));
    }

    #[test]
    fn test_nothing_to_inspect() {
        assert!(matches!(
            collect_targets(&[], &[], None, Some("bmw")),
            Err(CliError::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_not_found_serializes_without_detail() {
        let inspection = Inspection {
            target: Target::parse("bmw/7-series").unwrap(),
            status: LookupStatus::ModelNotFound,
            detail: None,
        };
        assert!(!inspection.found());
        let json = serde_json::to_value(&inspection).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"make_slug": "bmw", "model_slug": "7-series", "status": "model_not_found"})
        );
    }

    #[test]
    fn test_missing_make_is_told_apart() {
        let inspection = Inspection {
            target: Target::parse("tatra/t87").unwrap(),
            status: LookupStatus::MakeNotFound,
            detail: None,
        };
        assert_eq!(inspection.status.describe(), "make not found");
        assert_eq!(serde_json::to_value(&inspection).unwrap()["status"], "make_not_found");
        assert_ne!(LookupStatus::ModelNotFound.describe(), LookupStatus::MakeNotFound.describe());
    }

    #[sqlx::test(migrations = "../vtx-sync/migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_lookup_separates_missing_make_from_missing_model(
        pool: sqlx::PgPool,
    ) -> sqlx::Result<()> {
        sqlx::raw_sql(
            r#"
            INSERT INTO vehicle_makes (slug, name) VALUES ('bmw', 'BMW');
            INSERT INTO vehicle_models (make_id, slug, name)
                SELECT id, '5-Series', '5 Series' FROM vehicle_makes WHERE slug = 'bmw';
            "#,
        )
        .execute(&pool)
        .await?;
        let store = TaxonomyStore::from_pool(pool);

        let pairs = strings(&["bmw/5-series", "bmw/7-series", "tatra/t87"]);
        let targets = collect_targets(&pairs, &[], None, None).unwrap();
        let report = lookup(&store, &targets).await.unwrap();

        let statuses: Vec<LookupStatus> = report.models.iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![LookupStatus::Found, LookupStatus::ModelNotFound, LookupStatus::MakeNotFound]
        );

        Ok(())
    }
}
