//! Error types shared across the VTX workspace

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, TaxonomyError>;

/// Errors raised by the shared schema and helpers
#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("Invalid slug '{slug}': {reason}")]
    InvalidSlug { slug: String, reason: String },

    #[error("Duplicate {kind} slug '{slug}' in dataset")]
    DuplicateSlug { kind: &'static str, slug: String },

    #[error("Invalid year range for {model}: first year {first} is after last year {last}")]
    InvalidYearRange { model: String, first: i32, last: i32 },
}

impl TaxonomyError {
    /// Create an invalid slug error
    pub fn invalid_slug(slug: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSlug {
            slug: slug.into(),
            reason: reason.into(),
        }
    }
}
