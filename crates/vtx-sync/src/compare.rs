//! Dataset ↔ store comparison
//!
//! Two independent checks:
//!
//! - **Presence**: which in-scope dataset entries have no row in the store.
//!   Keys are slugs compared with [`slug::normalize_key`], so matching is exact
//!   apart from case and surrounding whitespace.
//! - **Duplicates**: which store rows describe the same thing twice. Models are
//!   clustered per make by [`slug::model_name_key`], generations per model by
//!   [`slug::generation_code_key`].
//!
//! Output order never depends on the order rows came back from the database.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;
use vtx_common::slug;
use vtx_common::types::Dataset;

use crate::db::{StoreSnapshot, StoredGeneration, StoredModel};

/// A dataset make with no store row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingMake {
    pub slug: String,
    pub name: String,
}

/// A dataset model with no store row under its make
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingModel {
    pub make_slug: String,
    pub model_slug: String,
    pub name: String,
    pub first_model_year: Option<i32>,
    pub last_model_year: Option<i32>,
}

/// A dataset generation absent from a model that does exist in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingGeneration {
    pub make_slug: String,
    pub model_slug: String,
    pub code: String,
}

/// Result of the presence check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissingReport {
    pub makes: Vec<MissingMake>,
    pub models: Vec<MissingModel>,
    pub generations: Vec<MissingGeneration>,
    /// In-scope dataset models that were checked
    pub checked_models: usize,
    /// Dataset models skipped by the year filter
    pub out_of_scope_models: usize,
}

impl MissingReport {
    pub fn is_empty(&self) -> bool {
        self.makes.is_empty() && self.models.is_empty() && self.generations.is_empty()
    }
}

/// Report in-scope dataset entries that the store does not have.
///
/// A missing model hides its generations: they are only listed for models
/// the store already has.
pub fn find_missing(dataset: &Dataset, snapshot: &StoreSnapshot) -> MissingReport {
    let store_makes: HashSet<String> =
        snapshot.makes.iter().map(|m| slug::normalize_key(&m.slug)).collect();
    let store_models: HashSet<(String, String)> = snapshot
        .models
        .iter()
        .map(|m| (slug::normalize_key(&m.make_slug), slug::normalize_key(&m.slug)))
        .collect();
    let store_generations: HashSet<(String, String, String)> = snapshot
        .generations
        .iter()
        .map(|g| {
            (
                slug::normalize_key(&g.make_slug),
                slug::normalize_key(&g.model_slug),
                slug::normalize_key(&g.code),
            )
        })
        .collect();

    let mut report = MissingReport::default();

    for make in &dataset.makes {
        let make_key = slug::normalize_key(&make.slug);
        let (in_scope, out_of_scope): (Vec<_>, Vec<_>) =
            make.models.iter().partition(|m| m.is_in_scope());
        report.out_of_scope_models += out_of_scope.len();

        if in_scope.is_empty() {
            continue;
        }

        if !store_makes.contains(&make_key) {
            report.makes.push(MissingMake {
                slug: make.slug.clone(),
                name: make.name.clone(),
            });
        }

        for model in in_scope {
            report.checked_models += 1;
            let model_key = slug::normalize_key(&model.slug);

            if !store_models.contains(&(make_key.clone(), model_key.clone())) {
                report.models.push(MissingModel {
                    make_slug: make.slug.clone(),
                    model_slug: model.slug.clone(),
                    name: model.name.clone(),
                    first_model_year: model.first_model_year,
                    last_model_year: model.last_model_year,
                });
                continue;
            }

            for generation in &model.generations {
                let code_key = slug::normalize_key(&generation.code);
                let key = (make_key.clone(), model_key.clone(), code_key);
                if !store_generations.contains(&key) {
                    report.generations.push(MissingGeneration {
                        make_slug: make.slug.clone(),
                        model_slug: model.slug.clone(),
                        code: generation.code.clone(),
                    });
                }
            }
        }
    }

    report
}

/// Store models under one make that share a normalized name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelCluster {
    pub make_slug: String,
    pub key: String,
    /// Sorted by name, then slug, then id
    pub models: Vec<StoredModel>,
}

/// Generations of one model whose codes differ only in case or punctuation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationCluster {
    pub make_slug: String,
    pub model_slug: String,
    pub key: String,
    /// Sorted by start year, then code, then id
    pub generations: Vec<StoredGeneration>,
}

/// Result of the duplicate check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateReport {
    pub models: Vec<ModelCluster>,
    pub generations: Vec<GenerationCluster>,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.generations.is_empty()
    }
}

/// Run both duplicate checks over a snapshot
pub fn find_duplicates(snapshot: &StoreSnapshot) -> DuplicateReport {
    DuplicateReport {
        models: find_duplicate_models(&snapshot.models),
        generations: find_duplicate_generations(&snapshot.generations),
    }
}

/// Cluster models per make by brand-stripped, slugified display name
pub fn find_duplicate_models(models: &[StoredModel]) -> Vec<ModelCluster> {
    let mut groups: BTreeMap<(String, Uuid, String), Vec<StoredModel>> = BTreeMap::new();

    for model in models {
        let key = slug::model_name_key(&model.make_slug, &model.make_name, &model.name);
        groups
            .entry((model.make_slug.clone(), model.make_id, key))
            .or_default()
            .push(model.clone());
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|((make_slug, _, key), mut members)| {
            members.sort_by(|a, b| {
                a.name
                    .cmp(&b.name)
                    .then_with(|| a.slug.cmp(&b.slug))
                    .then_with(|| a.id.cmp(&b.id))
            });
            ModelCluster {
                make_slug,
                key,
                models: members,
            }
        })
        .collect()
}

/// Cluster generations per model by normalized code
pub fn find_duplicate_generations(generations: &[StoredGeneration]) -> Vec<GenerationCluster> {
    let mut groups: BTreeMap<(String, String, Uuid, String), Vec<StoredGeneration>> =
        BTreeMap::new();

    for generation in generations {
        let key = slug::generation_code_key(&generation.code);
        groups
            .entry((
                generation.make_slug.clone(),
                generation.model_slug.clone(),
                generation.model_id,
                key,
            ))
            .or_default()
            .push(generation.clone());
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|((make_slug, model_slug, _, key), mut members)| {
            members.sort_by(|a, b| {
                a.start_year
                    .cmp(&b.start_year)
                    .then_with(|| a.code.cmp(&b.code))
                    .then_with(|| a.id.cmp(&b.id))
            });
            GenerationCluster {
                make_slug,
                model_slug,
                key,
                generations: members,
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::db::StoredMake;
    use vtx_common::types::{Generation, Make, Model};

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn stored_make(n: u128, slug: &str, name: &str) -> StoredMake {
        StoredMake {
            id: id(n),
            slug: slug.to_string(),
            name: name.to_string(),
        }
    }

    fn stored_model(n: u128, make: &StoredMake, slug: &str, name: &str) -> StoredModel {
        StoredModel {
            id: id(n),
            make_id: make.id,
            make_slug: make.slug.clone(),
            make_name: make.name.clone(),
            slug: slug.to_string(),
            name: name.to_string(),
            first_model_year: None,
            last_model_year: None,
            years_available: None,
        }
    }

    fn stored_generation(n: u128, model: &StoredModel, code: &str, start: i32) -> StoredGeneration {
        StoredGeneration {
            id: id(n),
            model_id: model.id,
            make_slug: model.make_slug.clone(),
            model_slug: model.slug.clone(),
            code: code.to_string(),
            start_year: start,
            end_year: None,
        }
    }

    fn bmw_dataset() -> Dataset {
        Dataset::new(vec![Make::new("bmw", "BMW").with_model(
            Model::new("5-series", "5 Series")
                .with_years(Some(1980), Some(2020))
                .with_generation(Generation::new("E39", 1995, Some(2003)))
                .with_generation(Generation::new("E60", 2003, Some(2010))),
        )])
    }

    #[test]
    fn test_empty_store_reports_model_once() {
        let report = find_missing(&bmw_dataset(), &StoreSnapshot::default());

        assert_eq!(report.makes.len(), 1);
        assert_eq!(report.models.len(), 1);
        assert_eq!(report.models[0].make_slug, "bmw");
        assert_eq!(report.models[0].model_slug, "5-series");
        // Generations of a missing model are implied, not listed
        assert!(report.generations.is_empty());
        assert_eq!(report.checked_models, 1);
    }

    #[test]
    fn test_present_model_reports_missing_generations() {
        let bmw = stored_make(1, "bmw", "BMW");
        let five = stored_model(10, &bmw, "5-series", "5 Series");
        let snapshot = StoreSnapshot {
            generations: vec![stored_generation(100, &five, "E39", 1995)],
            makes: vec![bmw],
            models: vec![five],
        };

        let report = find_missing(&bmw_dataset(), &snapshot);
        assert!(report.makes.is_empty());
        assert!(report.models.is_empty());
        assert_eq!(
            report.generations,
            vec![MissingGeneration {
                make_slug: "bmw".to_string(),
                model_slug: "5-series".to_string(),
                code: "E60".to_string(),
            }]
        );
    }

    #[test]
    fn test_presence_is_exact_slug_match() {
        let bmw = stored_make(1, "bmw", "BMW");
        let snapshot = StoreSnapshot {
            models: vec![stored_model(10, &bmw, "5series", "5 Series")],
            makes: vec![bmw],
            generations: vec![],
        };

        let report = find_missing(&bmw_dataset(), &snapshot);
        assert_eq!(report.models.len(), 1);
    }

    #[test]
    fn test_presence_ignores_case() {
        let bmw = stored_make(1, "BMW", "BMW");
        let snapshot = StoreSnapshot {
            models: vec![stored_model(10, &bmw, "5-Series", "5 Series")],
            makes: vec![bmw],
            generations: vec![],
        };

        let dataset = Dataset::new(vec![Make::new("bmw", "BMW")
            .with_model(Model::new("5-series", "5 Series").with_years(Some(1980), None))]);
        assert!(find_missing(&dataset, &snapshot).is_empty());
    }

    #[test]
    fn test_generation_presence_ignores_case() {
        let bmw = stored_make(1, "bmw", "BMW");
        let five = stored_model(10, &bmw, "5-series", "5 Series");
        let snapshot = StoreSnapshot {
            generations: vec![
                stored_generation(100, &five, "e39", 1995),
                stored_generation(101, &five, " E60 ", 2003),
            ],
            makes: vec![bmw],
            models: vec![five],
        };

        assert!(find_missing(&bmw_dataset(), &snapshot).is_empty());
    }

    #[test]
    fn test_model_under_other_make_is_missing() {
        let alpina = stored_make(2, "alpina", "Alpina");
        let snapshot = StoreSnapshot {
            models: vec![stored_model(10, &alpina, "5-series", "B5")],
            makes: vec![stored_make(1, "bmw", "BMW"), alpina],
            generations: vec![],
        };

        let report = find_missing(&bmw_dataset(), &snapshot);
        assert!(report.makes.is_empty());
        assert_eq!(report.models.len(), 1);
    }

    #[test]
    fn test_out_of_scope_models_are_skipped() {
        let dataset = Dataset::new(vec![
            Make::new("bmw", "BMW")
                .with_model(Model::new("5-series", "5 Series").with_years(Some(1972), Some(2024)))
                .with_model(Model::new("2000", "2000").with_years(Some(1961), Some(1972))),
            Make::new("borgward", "Borgward")
                .with_model(Model::new("isabella", "Isabella").with_years_available(vec![1954, 1961])),
        ]);

        let report = find_missing(&dataset, &StoreSnapshot::default());
        assert_eq!(report.makes.len(), 1);
        assert_eq!(report.models.len(), 1);
        assert_eq!(report.out_of_scope_models, 2);
    }

    #[test]
    fn test_duplicate_models_strip_brand_prefix() {
        let bmw = stored_make(1, "bmw", "BMW");
        let models = vec![
            stored_model(10, &bmw, "5-series", "5-series"),
            stored_model(11, &bmw, "bmw-5-series", "BMW 5 Series"),
            stored_model(12, &bmw, "x5", "X5"),
        ];

        let clusters = find_duplicate_models(&models);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].key, "5-series");
        let names: Vec<&str> = clusters[0].models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["5-series", "BMW 5 Series"]);
    }

    #[test]
    fn test_same_name_under_different_makes_is_not_duplicate() {
        let bmw = stored_make(1, "bmw", "BMW");
        let alpina = stored_make(2, "alpina", "Alpina");
        let models = vec![
            stored_model(10, &bmw, "b7", "B7"),
            stored_model(11, &alpina, "b7", "B7"),
        ];

        assert!(find_duplicate_models(&models).is_empty());
    }

    #[test]
    fn test_duplicate_models_ignore_input_order() {
        let bmw = stored_make(1, "bmw", "BMW");
        let lada = stored_make(2, "lada", "Лада");
        let models = vec![
            stored_model(10, &bmw, "3-series", "3 Series"),
            stored_model(11, &lada, "niva", "Niva"),
            stored_model(12, &bmw, "bmw-3-series", "BMW 3 Series"),
            stored_model(13, &lada, "lada-niva", "Лада Niva"),
            stored_model(14, &bmw, "3-series-2", "3 series"),
            stored_model(15, &bmw, "x3", "X3"),
        ];

        let expected = find_duplicate_models(&models);
        assert_eq!(expected.len(), 2);
        assert_eq!(expected[0].models.len(), 3);

        let mut reversed = models.clone();
        reversed.reverse();
        assert_eq!(find_duplicate_models(&reversed), expected);

        let mut rotated = models.clone();
        rotated.rotate_left(4);
        assert_eq!(find_duplicate_models(&rotated), expected);
    }

    #[test]
    fn test_duplicate_generations() {
        let bmw = stored_make(1, "bmw", "BMW");
        let five = stored_model(10, &bmw, "5-series", "5 Series");
        let generations = vec![
            stored_generation(100, &five, "E39", 1995),
            stored_generation(101, &five, "e-39", 1996),
            stored_generation(102, &five, "E60", 2003),
        ];

        let clusters = find_duplicate_generations(&generations);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].key, "E39");
        assert_eq!(clusters[0].generations[0].code, "E39");
        assert_eq!(clusters[0].generations[1].code, "e-39");
    }

    #[test]
    fn test_find_duplicates_clean_store() {
        let bmw = stored_make(1, "bmw", "BMW");
        let five = stored_model(10, &bmw, "5-series", "5 Series");
        let snapshot = StoreSnapshot {
            generations: vec![stored_generation(100, &five, "E39", 1995)],
            models: vec![five],
            makes: vec![bmw],
        };

        assert!(find_duplicates(&snapshot).is_empty());
    }
}
