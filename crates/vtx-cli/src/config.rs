//! File locations used by the CLI
//!
//! Precedence: command-line flag, then environment, then the default below.

use std::path::PathBuf;

// ============================================================================
// Default Locations
// ============================================================================

/// Bundled dataset, relative to the working directory
pub const DEFAULT_DATASET_PATH: &str = "data/vehicles.json";

/// Where `vtx generate` writes and `vtx apply` reads
pub const DEFAULT_SEED_PATH: &str = "seeds/vehicle_taxonomy.sql";

/// Editorial YAML taxonomy
pub const DEFAULT_TAXONOMY_PATH: &str = "data/taxonomy.yaml";

/// Resolved file locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub dataset_path: PathBuf,
    pub seed_path: PathBuf,
    pub taxonomy_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            seed_path: PathBuf::from(DEFAULT_SEED_PATH),
            taxonomy_path: PathBuf::from(DEFAULT_TAXONOMY_PATH),
        }
    }
}

impl Settings {
    /// Load settings from `VTX_DATASET`, `VTX_SEED_PATH` and `VTX_TAXONOMY`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        let defaults = Self::default();

        Self {
            dataset_path: var("VTX_DATASET").unwrap_or(defaults.dataset_path),
            seed_path: var("VTX_SEED_PATH").unwrap_or(defaults.seed_path),
            taxonomy_path: var("VTX_TAXONOMY").unwrap_or(defaults.taxonomy_path),
        }
    }

    /// Dataset path, preferring an explicit flag
    pub fn dataset(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| self.dataset_path.clone())
    }

    /// Seed path, preferring an explicit flag
    pub fn seed(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| self.seed_path.clone())
    }

    /// Taxonomy path, preferring an explicit flag
    pub fn taxonomy(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| self.taxonomy_path.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.dataset_path, PathBuf::from("data/vehicles.json"));
    }

    #[test]
    fn test_env_overrides_default() {
        let vars: HashMap<&str, &str> =
            [("VTX_DATASET", "/srv/vehicles.json"), ("VTX_SEED_PATH", "  ")].into();
        let settings = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(settings.dataset_path, PathBuf::from("/srv/vehicles.json"));
        // Blank values fall back to the default
        assert_eq!(settings.seed_path, PathBuf::from(DEFAULT_SEED_PATH));
    }

    #[test]
    fn test_flag_overrides_env() {
        let settings = Settings::from_lookup(|k| (k == "VTX_DATASET").then(|| "env.json".to_string()));
        assert_eq!(settings.dataset(Some(PathBuf::from("flag.json"))), PathBuf::from("flag.json"));
        assert_eq!(settings.dataset(None), PathBuf::from("env.json"));
    }
}
