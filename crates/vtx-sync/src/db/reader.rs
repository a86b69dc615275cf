//! Read-only queries against the taxonomy tables

use serde::Serialize;
use sqlx::FromRow;
use tracing::debug;
use uuid::Uuid;

use super::TaxonomyStore;
use crate::error::Result;

/// A make row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct StoredMake {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

/// A model row joined with its make
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct StoredModel {
    pub id: Uuid,
    pub make_id: Uuid,
    pub make_slug: String,
    pub make_name: String,
    pub slug: String,
    pub name: String,
    pub first_model_year: Option<i32>,
    pub last_model_year: Option<i32>,
    pub years_available: Option<Vec<i32>>,
}

/// A generation row joined with its model and make slugs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct StoredGeneration {
    pub id: Uuid,
    pub model_id: Uuid,
    pub make_slug: String,
    pub model_slug: String,
    pub code: String,
    pub start_year: i32,
    pub end_year: Option<i32>,
}

/// Number of translated names per entity kind and locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct TranslationCount {
    /// `make` or `model`
    pub entity: String,
    pub locale: String,
    pub count: i64,
}

/// One translated name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct StoredTranslation {
    pub locale: String,
    pub name: String,
}

/// Everything the store knows about one model
#[derive(Debug, Clone, Serialize)]
pub struct ModelDetail {
    pub model: StoredModel,
    pub translations: Vec<StoredTranslation>,
    pub generations: Vec<StoredGeneration>,
    pub insight_count: i64,
}

/// The taxonomy tables as read at one point in time
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub makes: Vec<StoredMake>,
    pub models: Vec<StoredModel>,
    pub generations: Vec<StoredGeneration>,
}

const MODEL_COLUMNS: &str = r#"
    mo.id, mo.make_id, ma.slug AS make_slug, ma.name AS make_name,
    mo.slug, mo.name, mo.first_model_year, mo.last_model_year, mo.years_available
"#;

const GENERATION_COLUMNS: &str = r#"
    g.id, g.model_id, ma.slug AS make_slug, mo.slug AS model_slug,
    g.code, g.start_year, g.end_year
"#;

impl TaxonomyStore {
    pub async fn fetch_makes(&self) -> Result<Vec<StoredMake>> {
        let makes = sqlx::query_as::<_, StoredMake>(
            "SELECT id, slug, name FROM vehicle_makes ORDER BY slug",
        )
        .fetch_all(self.pool())
        .await?;

        debug!(count = makes.len(), "Fetched makes");
        Ok(makes)
    }

    pub async fn fetch_models(&self) -> Result<Vec<StoredModel>> {
        let sql = format!(
            r#"
            SELECT {MODEL_COLUMNS}
            FROM vehicle_models mo
            JOIN vehicle_makes ma ON ma.id = mo.make_id
            ORDER BY ma.slug, mo.slug
            "#
        );

        let models = sqlx::query_as::<_, StoredModel>(&sql)
            .fetch_all(self.pool())
            .await?;

        debug!(count = models.len(), "Fetched models");
        Ok(models)
    }

    pub async fn fetch_generations(&self) -> Result<Vec<StoredGeneration>> {
        let sql = format!(
            r#"
            SELECT {GENERATION_COLUMNS}
            FROM vehicle_generations g
            JOIN vehicle_models mo ON mo.id = g.model_id
            JOIN vehicle_makes ma ON ma.id = mo.make_id
            ORDER BY ma.slug, mo.slug, g.start_year, g.code
            "#
        );

        let generations = sqlx::query_as::<_, StoredGeneration>(&sql)
            .fetch_all(self.pool())
            .await?;

        debug!(count = generations.len(), "Fetched generations");
        Ok(generations)
    }

    /// Translated-name counts per locale for makes and models
    pub async fn fetch_translation_counts(&self) -> Result<Vec<TranslationCount>> {
        let counts = sqlx::query_as::<_, TranslationCount>(
            r#"
            SELECT 'make'::text AS entity, locale, COUNT(*) AS count
            FROM vehicle_make_translations
            GROUP BY locale
            UNION ALL
            SELECT 'model'::text AS entity, locale, COUNT(*) AS count
            FROM vehicle_model_translations
            GROUP BY locale
            ORDER BY entity, locale
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(counts)
    }

    /// Look up one make by slug, ignoring case
    pub async fn find_make(&self, make_slug: &str) -> Result<Option<StoredMake>> {
        let make = sqlx::query_as::<_, StoredMake>(
            r#"
            SELECT id, slug, name
            FROM vehicle_makes
            WHERE lower(slug) = lower($1)
            ORDER BY slug = $1 DESC, slug
            LIMIT 1
            "#,
        )
        .bind(make_slug)
        .fetch_optional(self.pool())
        .await?;

        Ok(make)
    }

    /// Look up one model by make slug and model slug, ignoring case.
    ///
    /// An exact slug match wins over a case variant.
    pub async fn find_model(&self, make_slug: &str, model_slug: &str) -> Result<Option<ModelDetail>> {
        let sql = format!(
            r#"
            SELECT {MODEL_COLUMNS}
            FROM vehicle_models mo
            JOIN vehicle_makes ma ON ma.id = mo.make_id
            WHERE lower(ma.slug) = lower($1) AND lower(mo.slug) = lower($2)
            ORDER BY (ma.slug = $1 AND mo.slug = $2) DESC, ma.slug, mo.slug
            LIMIT 1
            "#
        );

        let Some(model) = sqlx::query_as::<_, StoredModel>(&sql)
            .bind(make_slug)
            .bind(model_slug)
            .fetch_optional(self.pool())
            .await?
        else {
            debug!(make_slug, model_slug, "Model not found");
            return Ok(None);
        };

        let translations = sqlx::query_as::<_, StoredTranslation>(
            "SELECT locale, name FROM vehicle_model_translations WHERE model_id = $1 ORDER BY locale",
        )
        .bind(model.id)
        .fetch_all(self.pool())
        .await?;

        let sql = format!(
            r#"
            SELECT {GENERATION_COLUMNS}
            FROM vehicle_generations g
            JOIN vehicle_models mo ON mo.id = g.model_id
            JOIN vehicle_makes ma ON ma.id = mo.make_id
            WHERE g.model_id = $1
            ORDER BY g.start_year, g.code
            "#
        );
        let generations = sqlx::query_as::<_, StoredGeneration>(&sql)
            .bind(model.id)
            .fetch_all(self.pool())
            .await?;

        let insight_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM vehicle_insights i
            JOIN vehicle_generations g ON g.id = i.generation_id
            WHERE g.model_id = $1
            "#,
        )
        .bind(model.id)
        .fetch_one(self.pool())
        .await?;

        Ok(Some(ModelDetail {
            model,
            translations,
            generations,
            insight_count,
        }))
    }

    /// Read makes, models and generations one query after another
    pub async fn snapshot(&self) -> Result<StoreSnapshot> {
        let makes = self.fetch_makes().await?;
        let models = self.fetch_models().await?;
        let generations = self.fetch_generations().await?;

        Ok(StoreSnapshot {
            makes,
            models,
            generations,
        })
    }
}
