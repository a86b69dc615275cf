//! Error types for reconciliation jobs

use std::path::PathBuf;
use thiserror::Error;
use vtx_common::TaxonomyError;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Failures of a reconciliation job.
///
/// Every variant ends the job: nothing is retried.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Missing or malformed connection settings
    #[error("Database configuration error: {0}. Set DATABASE_URL or the SUPABASE_DB_* variables.")]
    Config(String),

    /// Dataset file could not be read or parsed
    #[error("Failed to load dataset '{path}': {reason}")]
    Dataset { path: PathBuf, reason: String },

    /// Dataset parsed but violates a schema invariant
    #[error("Invalid dataset: {0}")]
    Taxonomy(#[from] TaxonomyError),

    /// Connection or query failure
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Seed file rejected before execution
    #[error("Invalid seed: {0}")]
    Seed(String),

    /// YAML taxonomy could not be parsed
    #[error("Failed to parse YAML taxonomy: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a dataset error for a path
    pub fn dataset(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Dataset {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a seed validation error
    pub fn seed(msg: impl Into<String>) -> Self {
        Self::Seed(msg.into())
    }
}
