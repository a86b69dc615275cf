//! YAML taxonomy export
//!
//! Editors maintain the taxonomy as YAML with display names only; slugs are
//! derived on export. The output is the JSON dataset read by [`crate::dataset`].

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};
use vtx_common::slug;
use vtx_common::types::{Dataset, Generation, Insight, Make, Model, Translations};
use vtx_common::TaxonomyError;

use crate::dataset;
use crate::error::{Result, SyncError};

/// Top level of a taxonomy file
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonomyFile {
    #[serde(default)]
    pub makes: Vec<MakeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MakeEntry {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    /// Localized names keyed by locale
    #[serde(default)]
    pub names: Translations,
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub names: Translations,
    #[serde(default)]
    pub first_year: Option<i32>,
    #[serde(default)]
    pub last_year: Option<i32>,
    #[serde(default)]
    pub years: Option<Vec<i32>>,
    #[serde(default)]
    pub generations: Vec<GenerationEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationEntry {
    pub code: String,
    pub start: i32,
    #[serde(default)]
    pub end: Option<i32>,
    #[serde(default)]
    pub insight: Option<Insight>,
}

/// Parse YAML text into the taxonomy file structure
pub fn parse(text: &str) -> Result<TaxonomyFile> {
    Ok(serde_yaml::from_str(text)?)
}

/// Convert a parsed taxonomy into a validated dataset
pub fn to_dataset(file: TaxonomyFile) -> Result<Dataset> {
    let makes = file
        .makes
        .into_iter()
        .map(convert_make)
        .collect::<Result<Vec<_>>>()?;

    let dataset = Dataset::new(makes);
    dataset.validate()?;
    Ok(dataset)
}

/// Read a YAML taxonomy and write it as a JSON dataset
pub fn export(yaml_path: impl AsRef<Path>, json_path: impl AsRef<Path>) -> Result<Dataset> {
    let yaml_path = yaml_path.as_ref();
    let json_path = json_path.as_ref();

    let text = std::fs::read_to_string(yaml_path).map_err(|e| SyncError::dataset(yaml_path, e))?;
    let dataset = to_dataset(parse(&text)?)?;

    if let Some(parent) = json_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    dataset::save(&dataset, json_path)?;

    info!(
        from = %yaml_path.display(),
        to = %json_path.display(),
        makes = dataset.makes.len(),
        models = dataset.model_count(),
        "Exported taxonomy"
    );
    Ok(dataset)
}

fn convert_make(entry: MakeEntry) -> Result<Make> {
    let slug = resolve_slug(entry.slug.as_deref(), &entry.name, &entry.names)?;
    debug!(slug = %slug, models = entry.models.len(), "Converting make");

    let models = entry
        .models
        .into_iter()
        .map(convert_model)
        .collect::<Result<Vec<_>>>()?;

    Ok(Make {
        id: None,
        slug,
        name: entry.name,
        translations: entry.names,
        models,
    })
}

fn convert_model(entry: ModelEntry) -> Result<Model> {
    let slug = resolve_slug(entry.slug.as_deref(), &entry.name, &entry.names)?;

    let generations = entry
        .generations
        .into_iter()
        .map(|g| Generation {
            code: g.code.trim().to_string(),
            start_year: g.start,
            end_year: g.end,
            insight: g.insight,
        })
        .collect();

    Ok(Model {
        slug,
        name: entry.name,
        first_model_year: entry.first_year,
        last_model_year: entry.last_year,
        years_available: entry.years,
        translations: entry.names,
        generations,
    })
}

/// Explicit slug if given, else the slugified name, else the first
/// translated name (by locale order) that yields a slug.
fn resolve_slug(explicit: Option<&str>, name: &str, names: &Translations) -> Result<String> {
    if let Some(explicit) = explicit {
        let explicit = slug::normalize_key(explicit);
        slug::validate(&explicit)?;
        return Ok(explicit);
    }

    let derived = slug::slugify(name);
    if !derived.is_empty() {
        return Ok(derived);
    }

    if let Some(fallback) = names
        .values()
        .map(|n| slug::slugify(n))
        .find(|s| !s.is_empty())
    {
        warn!(name, slug = %fallback, "Display name has no slug, using a translated name");
        return Ok(fallback);
    }

    Err(TaxonomyError::invalid_slug(name, "no slug can be derived from the name or its translations").into())
}
