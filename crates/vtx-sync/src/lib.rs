//! VTX Sync Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Reconciliation between the bundled vehicle taxonomy dataset and the
//! marketplace database.
//!
//! # Pipeline
//!
//! - [`dataset`]: load and validate the bundled JSON dataset
//! - [`db`]: connection settings, the [`db::TaxonomyStore`] handle and read queries
//! - [`compare`]: missing-entry and duplicate detection
//! - [`seed`]: idempotent SQL seed generation and transactional application
//! - [`yaml`]: YAML taxonomy → JSON dataset export
//!
//! # Example
//!
//! ```no_run
//! use vtx_sync::{compare, dataset, db::{DbConfig, TaxonomyStore}};
//!
//! #[tokio::main]
//! async fn main() -> vtx_sync::Result<()> {
//!     let loaded = dataset::load("data/vehicles.json")?;
//!     let store = TaxonomyStore::connect(&DbConfig::from_env()?).await?;
//!     let snapshot = store.snapshot().await;
//!     store.close().await;
//!
//!     let report = compare::find_missing(&loaded.dataset, &snapshot?);
//!     println!("{} models missing", report.models.len());
//!     Ok(())
//! }
//! ```

pub mod compare;
pub mod dataset;
pub mod db;
pub mod error;
pub mod seed;
pub mod yaml;

pub use error::{Result, SyncError};
