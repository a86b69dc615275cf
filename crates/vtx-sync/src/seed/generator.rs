//! Seed generator
//!
//! Turns the in-scope part of a dataset into upsert statements. Child rows
//! find their parent through the parent's natural key (`INSERT ... SELECT ...
//! WHERE slug = ...`), so the seed does not depend on database ids.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;
use vtx_common::types::{Dataset, Generation, Insight, Make, Model, YEAR_CUTOFF};

use crate::error::Result;

/// Where a seed came from, recorded in its header
#[derive(Debug, Clone)]
pub struct Provenance {
    pub source: String,
    pub checksum: String,
    pub generated_at: DateTime<Utc>,
}

impl Provenance {
    pub fn new(source: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            checksum: checksum.into(),
            generated_at: Utc::now(),
        }
    }
}

/// Row counts written to a seed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedStats {
    pub makes: usize,
    pub models: usize,
    pub generations: usize,
    pub translations: usize,
    pub insights: usize,
    /// Models dropped by the year filter
    pub skipped_models: usize,
}

impl SeedStats {
    pub fn statements(&self) -> usize {
        self.makes + self.models + self.generations + self.translations + self.insights
    }
}

/// A generated seed
#[derive(Debug, Clone)]
pub struct SeedScript {
    pub sql: String,
    pub stats: SeedStats,
}

/// Build the seed for every in-scope model of the dataset
pub fn generate(dataset: &Dataset, provenance: &Provenance) -> SeedScript {
    let scoped = dataset.in_scope();
    let mut stats = SeedStats {
        skipped_models: dataset.model_count() - scoped.model_count(),
        ..SeedStats::default()
    };

    let mut body = String::new();
    for make in &scoped.makes {
        push_make(&mut body, make, &mut stats);
    }

    let mut sql = String::new();
    let _ = writeln!(sql, "-- Vehicle taxonomy seed");
    let _ = writeln!(sql, "-- Source: {}", comment_text(&provenance.source));
    let _ = writeln!(sql, "-- Dataset sha256: {}", provenance.checksum);
    let _ = writeln!(sql, "-- Generated at: {}", provenance.generated_at.to_rfc3339());
    let _ = writeln!(sql, "-- Model years >= {YEAR_CUTOFF}");
    let _ = writeln!(
        sql,
        "-- Makes: {}, models: {}, generations: {}, translations: {}, insights: {}",
        stats.makes, stats.models, stats.generations, stats.translations, stats.insights
    );
    sql.push('\n');
    sql.push_str(&body);

    SeedScript { sql, stats }
}

/// Write a seed file, creating parent directories
pub fn write_seed(script: &SeedScript, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &script.sql)?;

    info!(
        path = %path.display(),
        statements = script.stats.statements(),
        bytes = script.sql.len(),
        "Wrote seed file"
    );
    Ok(())
}

fn push_make(out: &mut String, make: &Make, stats: &mut SeedStats) {
    let slug = quote(&make.slug);

    let _ = writeln!(out, "-- {}", comment_text(&make.name));
    let _ = writeln!(
        out,
        "INSERT INTO vehicle_makes (slug, name)\n\
         VALUES ({slug}, {})\n\
         ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name, updated_at = NOW();",
        quote(&make.name)
    );
    stats.makes += 1;

    for (locale, name) in &make.translations {
        let _ = writeln!(
            out,
            "INSERT INTO vehicle_make_translations (make_id, locale, name)\n\
             SELECT id, {}, {} FROM vehicle_makes WHERE slug = {slug}\n\
             ON CONFLICT (make_id, locale) DO UPDATE SET name = EXCLUDED.name;",
            quote(locale),
            quote(name)
        );
        stats.translations += 1;
    }

    for model in &make.models {
        push_model(out, make, model, stats);
    }
    out.push('\n');
}

/// Quoted natural key of a model, used to locate it from child rows
struct ModelKey {
    make_slug: String,
    model_slug: String,
}

impl ModelKey {
    fn new(make: &Make, model: &Model) -> Self {
        Self {
            make_slug: quote(&make.slug),
            model_slug: quote(&model.slug),
        }
    }

    fn from_clause(&self) -> String {
        format!(
            "FROM vehicle_models mo JOIN vehicle_makes ma ON ma.id = mo.make_id\n\
             WHERE ma.slug = {} AND mo.slug = {}",
            self.make_slug, self.model_slug
        )
    }
}

fn push_model(out: &mut String, make: &Make, model: &Model, stats: &mut SeedStats) {
    let key = ModelKey::new(make, model);

    let _ = writeln!(
        out,
        "INSERT INTO vehicle_models (make_id, slug, name, first_model_year, last_model_year, years_available)\n\
         SELECT id, {}, {}, {}, {}, {} FROM vehicle_makes WHERE slug = {}\n\
         ON CONFLICT (make_id, slug) DO UPDATE SET name = EXCLUDED.name, \
         first_model_year = EXCLUDED.first_model_year, last_model_year = EXCLUDED.last_model_year, \
         years_available = EXCLUDED.years_available, updated_at = NOW();",
        key.model_slug,
        quote(&model.name),
        int_or_null(model.first_model_year),
        int_or_null(model.last_model_year),
        int_array(model.years_available.as_deref()),
        key.make_slug,
    );
    stats.models += 1;

    for (locale, name) in &model.translations {
        let _ = writeln!(
            out,
            "INSERT INTO vehicle_model_translations (model_id, locale, name)\n\
             SELECT mo.id, {}, {} {}\n\
             ON CONFLICT (model_id, locale) DO UPDATE SET name = EXCLUDED.name;",
            quote(locale),
            quote(name),
            key.from_clause()
        );
        stats.translations += 1;
    }

    for generation in &model.generations {
        push_generation(out, &key, generation, stats);
    }
}

fn push_generation(out: &mut String, key: &ModelKey, generation: &Generation, stats: &mut SeedStats) {
    let code = quote(&generation.code);

    let _ = writeln!(
        out,
        "INSERT INTO vehicle_generations (model_id, code, start_year, end_year)\n\
         SELECT mo.id, {code}, {}, {} {}\n\
         ON CONFLICT (model_id, code) DO UPDATE SET start_year = EXCLUDED.start_year, end_year = EXCLUDED.end_year;",
        generation.start_year,
        int_or_null(generation.end_year),
        key.from_clause(),
    );
    stats.generations += 1;

    if let Some(insight) = &generation.insight {
        push_insight(out, key, &code, insight);
        stats.insights += 1;
    }
}

fn push_insight(out: &mut String, key: &ModelKey, code: &str, insight: &Insight) {
    let score = insight
        .reliability_score
        .filter(|s| s.is_finite())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "NULL".to_string());
    let summary = insight
        .summary
        .as_deref()
        .map(quote)
        .unwrap_or_else(|| "NULL".to_string());

    let _ = writeln!(
        out,
        "INSERT INTO vehicle_insights (generation_id, pros, cons, reliability_score, summary)\n\
         SELECT g.id, {}, {}, {score}, {summary}\n\
         FROM vehicle_generations g JOIN vehicle_models mo ON mo.id = g.model_id JOIN vehicle_makes ma ON ma.id = mo.make_id\n\
         WHERE ma.slug = {} AND mo.slug = {} AND g.code = {code}\n\
         ON CONFLICT (generation_id) DO UPDATE SET pros = EXCLUDED.pros, cons = EXCLUDED.cons, \
         reliability_score = EXCLUDED.reliability_score, summary = EXCLUDED.summary, updated_at = NOW();",
        text_array(&insight.pros),
        text_array(&insight.cons),
        key.make_slug,
        key.model_slug,
    );
}

/// Text safe to place after `--`.
///
/// Postgres ends a line comment at `\r` as well as `\n`, so every control
/// character becomes a space.
fn comment_text(value: &str) -> String {
    value.chars().map(|c| if c.is_control() { ' ' } else { c }).collect()
}

/// Quote a string as a SQL literal
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn int_or_null(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "NULL".to_string())
}

fn int_array(values: Option<&[i32]>) -> String {
    match values {
        None => "NULL".to_string(),
        Some([]) => "'{}'::integer[]".to_string(),
        Some(values) => {
            let items: Vec<String> = values.iter().map(i32::to_string).collect();
            format!("ARRAY[{}]::integer[]", items.join(", "))
        },
    }
}

fn text_array(values: &[String]) -> String {
    if values.is_empty() {
        return "'{}'::text[]".to_string();
    }
    let items: Vec<String> = values.iter().map(|v| quote(v)).collect();
    format!("ARRAY[{}]::text[]", items.join(", "))
}
