//! VTX Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared schema types, slug rules, error handling and logging for the
//! vehicle taxonomy toolkit.
//!
//! # Overview
//!
//! - **Types**: the one `Make` / `Model` / `Generation` / `Insight` schema read
//!   by the dataset loader and written by the seed generator
//! - **Slugs**: transliteration and key normalization
//! - **Checksums**: dataset fingerprints recorded in seed headers
//! - **Logging**: tracing subscriber setup shared by every binary
//!
//! # Example
//!
//! ```
//! use vtx_common::slug::slugify;
//!
//! assert_eq!(slugify("Электроника"), "elektronika");
//! assert_eq!(slugify("BMW 5 Series"), "bmw-5-series");
//! ```

pub mod checksum;
pub mod error;
pub mod logging;
pub mod slug;
pub mod types;

// Re-export commonly used types
pub use error::{Result, TaxonomyError};
pub use types::{Dataset, Generation, Insight, Make, Model, YEAR_CUTOFF};
