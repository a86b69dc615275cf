//! Vehicle taxonomy schema
//!
//! These types are the single definition of a make, model, generation and
//! insight. The dataset loader deserializes them from the bundled JSON file,
//! the YAML exporter produces them, and the seed generator turns them into SQL.
//!
//! # Examples
//!
//! ```
//! use vtx_common::types::Dataset;
//!
//! let json = r#"[{"slug": "bmw", "name": "BMW", "models": [
//!     {"slug": "5-series", "name": "5 Series",
//!      "first_model_year": 1980, "last_model_year": 2020}
//! ]}]"#;
//!
//! let dataset: Dataset = serde_json::from_str(json).unwrap();
//! assert_eq!(dataset.model_count(), 1);
//! assert!(dataset.makes[0].models[0].is_in_scope());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::error::{Result, TaxonomyError};
use crate::slug;

/// Earliest model year the marketplace carries.
///
/// A model is in scope when any of its known years reaches this value. This is
/// catalogue policy and deliberately not a runtime option.
pub const YEAR_CUTOFF: i32 = 1980;

/// Locale code → translated display name
pub type Translations = BTreeMap<String, String>;

/// A bundled dataset: the top-level array of makes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub makes: Vec<Make>,
}

impl Dataset {
    pub fn new(makes: Vec<Make>) -> Self {
        Self { makes }
    }

    /// Total number of models across all makes
    pub fn model_count(&self) -> usize {
        self.makes.iter().map(|m| m.models.len()).sum()
    }

    /// Total number of generations across all models
    pub fn generation_count(&self) -> usize {
        self.makes
            .iter()
            .flat_map(|m| &m.models)
            .map(|m| m.generations.len())
            .sum()
    }

    /// Find a make by slug
    pub fn make(&self, slug: &str) -> Option<&Make> {
        let key = slug::normalize_key(slug);
        self.makes.iter().find(|m| slug::normalize_key(&m.slug) == key)
    }

    /// Check structural invariants the store relies on.
    ///
    /// Slugs must be well formed, make slugs unique, model slugs unique per
    /// make, and year ranges ordered.
    pub fn validate(&self) -> Result<()> {
        let mut make_slugs = HashSet::new();

        for make in &self.makes {
            slug::validate(&make.slug)?;
            if !make_slugs.insert(make.slug.as_str()) {
                return Err(TaxonomyError::DuplicateSlug {
                    kind: "make",
                    slug: make.slug.clone(),
                });
            }

            let mut model_slugs = HashSet::new();
            for model in &make.models {
                slug::validate(&model.slug)?;
                if !model_slugs.insert(model.slug.as_str()) {
                    return Err(TaxonomyError::DuplicateSlug {
                        kind: "model",
                        slug: format!("{}/{}", make.slug, model.slug),
                    });
                }

                if let (Some(first), Some(last)) = (model.first_model_year, model.last_model_year) {
                    if first > last {
                        return Err(TaxonomyError::InvalidYearRange {
                            model: format!("{}/{}", make.slug, model.slug),
                            first,
                            last,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep only in-scope models; makes left without models are dropped
    pub fn in_scope(&self) -> Dataset {
        let makes = self
            .makes
            .iter()
            .filter_map(|make| {
                let models: Vec<Model> =
                    make.models.iter().filter(|m| m.is_in_scope()).cloned().collect();
                if models.is_empty() {
                    None
                } else {
                    Some(Make {
                        models,
                        ..make.clone()
                    })
                }
            })
            .collect();

        Dataset { makes }
    }
}

/// A vehicle brand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Make {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: Translations,
    #[serde(default)]
    pub models: Vec<Model>,
}

impl Make {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            slug: slug.into(),
            name: name.into(),
            translations: Translations::new(),
            models: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.models.push(model);
        self
    }

    pub fn with_translation(mut self, locale: impl Into<String>, name: impl Into<String>) -> Self {
        self.translations.insert(locale.into(), name.into());
        self
    }
}

/// A named vehicle line under a make
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub first_model_year: Option<i32>,
    #[serde(default)]
    pub last_model_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_available: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: Translations,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generations: Vec<Generation>,
}

impl Model {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            first_model_year: None,
            last_model_year: None,
            years_available: None,
            translations: Translations::new(),
            generations: Vec::new(),
        }
    }

    pub fn with_years(mut self, first: Option<i32>, last: Option<i32>) -> Self {
        self.first_model_year = first;
        self.last_model_year = last;
        self
    }

    pub fn with_years_available(mut self, years: Vec<i32>) -> Self {
        self.years_available = Some(years);
        self
    }

    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.generations.push(generation);
        self
    }

    /// Whether the model is carried by the marketplace (see [`YEAR_CUTOFF`])
    pub fn is_in_scope(&self) -> bool {
        let reaches = |year: &i32| *year >= YEAR_CUTOFF;

        self.first_model_year.iter().any(reaches)
            || self.last_model_year.iter().any(reaches)
            || self.years_available.iter().flatten().any(reaches)
    }
}

/// A production era of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub code: String,
    pub start_year: i32,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<Insight>,
}

impl Generation {
    pub fn new(code: impl Into<String>, start_year: i32, end_year: Option<i32>) -> Self {
        Self {
            code: code.into(),
            start_year,
            end_year,
            insight: None,
        }
    }

    pub fn with_insight(mut self, insight: Insight) -> Self {
        self.insight = Some(insight);
        self
    }
}

/// Buyer-facing notes for one generation
///
/// Insights belong to a generation: an E39 and a G30 5 Series do not share
/// reliability notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pros: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
