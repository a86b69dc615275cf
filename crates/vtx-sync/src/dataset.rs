//! Bundled dataset loader

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vtx_common::checksum;
use vtx_common::types::Dataset;

use crate::error::{Result, SyncError};

/// A dataset read from disk together with its provenance
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub path: PathBuf,
    /// SHA-256 of the file bytes
    pub checksum: String,
}

/// Read, parse and validate a dataset file.
///
/// Any IO, parse or validation failure aborts the load; there is no partial
/// result.
pub fn load(path: impl AsRef<Path>) -> Result<LoadedDataset> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Reading dataset");

    let bytes = std::fs::read(path).map_err(|e| SyncError::dataset(path, e))?;
    let dataset = parse(&bytes).map_err(|e| SyncError::dataset(path, e))?;
    dataset.validate()?;

    let checksum = checksum::sha256_hex(&bytes);

    info!(
        path = %path.display(),
        makes = dataset.makes.len(),
        models = dataset.model_count(),
        generations = dataset.generation_count(),
        checksum = checksum::short(&checksum),
        "Loaded dataset"
    );

    Ok(LoadedDataset {
        dataset,
        path: path.to_path_buf(),
        checksum,
    })
}

/// Parse dataset JSON without touching the filesystem
pub fn parse(bytes: &[u8]) -> std::result::Result<Dataset, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Write a dataset as pretty-printed JSON
pub fn save(dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(dataset)?;
    std::fs::write(path.as_ref(), json + "\n")?;
    Ok(())
}
