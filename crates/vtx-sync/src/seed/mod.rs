//! SQL seed generation and application
//!
//! A seed is plain SQL text made of idempotent upserts keyed on the natural
//! unique keys of the taxonomy tables. Generating a seed never touches the
//! database; applying one runs the whole file inside a single transaction.

pub mod applier;
pub mod generator;

pub use applier::{apply, read_seed, validate, ApplyMode, ApplyOutcome, CheckedSeed, SeedCheck};
pub use generator::{generate, write_seed, Provenance, SeedScript, SeedStats};
