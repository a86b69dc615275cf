//! Error types for the VTX CLI
//!
//! Every error is shown to an operator, so messages say what to do next.

use thiserror::Error;
use vtx_sync::SyncError;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// User-facing CLI errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Database settings are missing or invalid
    #[error("{0}")]
    DatabaseConfig(String),

    /// Connection or query failure
    #[error("Database error: {0}. Check DATABASE_URL and that the database is reachable.")]
    Database(String),

    /// Dataset could not be loaded
    #[error("{0}. Run 'vtx export-yaml' to regenerate the dataset or pass --dataset.")]
    Dataset(String),

    /// Seed was rejected or failed to apply
    #[error("Seed error: {0}. Regenerate it with 'vtx generate'.")]
    Seed(String),

    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// Invalid combination or format of arguments
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// One or more orchestrated steps failed
    #[error("{failed} of {total} sync steps failed. See the step output above.")]
    StepsFailed { failed: usize, total: usize },

    /// Any other reconciliation failure
    #[error(transparent)]
    Sync(SyncError),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// JSON output could not be produced
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create an invalid arguments error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Config(_) => Self::DatabaseConfig(err.to_string()),
            SyncError::Sqlx(e) => Self::Database(e.to_string()),
            SyncError::Dataset { .. } | SyncError::Taxonomy(_) => Self::Dataset(err.to_string()),
            SyncError::Seed(msg) => Self::Seed(msg),
            other => Self::Sync(other),
        }
    }
}
