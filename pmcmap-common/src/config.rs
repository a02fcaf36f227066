//! Configuration loading and resolution
//!
//! Configuration file location follows this priority order:
//! 1. Explicit path (command-line argument)
//! 2. `PMCMAP_CONFIG` environment variable
//! 3. `~/.config/pmcmap/config.toml`
//! 4. Compiled defaults
//!
//! `PMCMAP_REGISTRY_URL` and `PMCMAP_OUTPUT_DIR` override individual fields
//! from the environment after the file is loaded.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// OAI-PMH endpoint of the PMC registry.
pub const DEFAULT_REGISTRY_URL: &str = "https://pmc.ncbi.nlm.nih.gov/api/oai/v1/mh/";

/// Runtime configuration for the subject-ingest service.
///
/// Every field is optional in the TOML file; missing fields keep their
/// compiled defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry endpoint queried once per fetch attempt.
    pub registry_url: String,
    /// Metadata format requested from the registry.
    pub metadata_prefix: String,
    /// Namespace prepended to the numeric article id in the `identifier`
    /// query parameter.
    pub oai_namespace: String,
    /// Total attempt budget per article, first try included.
    pub max_attempts: u32,
    /// Backoff before the second attempt; later waits grow by
    /// `backoff_factor`.
    pub base_delay_ms: u64,
    pub backoff_factor: f64,
    /// Minimum interval between registry requests, shared across workers.
    pub politeness_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Worker pool size; 1 keeps processing strictly sequential.
    pub workers: usize,
    /// Directory receiving serialized subject trees.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            metadata_prefix: "pmc_fm".to_string(),
            oai_namespace: "oai:pubmedcentral.nih.gov:".to_string(),
            max_attempts: 4,
            base_delay_ms: 1000,
            backoff_factor: 1.5,
            politeness_ms: 340,
            timeout_secs: 20,
            workers: 1,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl Config {
    /// Resolve configuration following the priority order above, then apply
    /// environment overrides and validate.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Config> {
        let mut config = if let Some(path) = cli_path {
            Self::load_file(path)?
        } else if let Ok(path) = std::env::var("PMCMAP_CONFIG") {
            Self::load_file(Path::new(&path))?
        } else if let Some(path) = Self::default_config_path().filter(|p| p.exists()) {
            Self::load_file(&path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pmcmap").join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("PMCMAP_REGISTRY_URL") {
            self.registry_url = url;
        }
        if let Ok(dir) = std::env::var("PMCMAP_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
    }

    /// Validate field ranges.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".to_string()));
        }
        if self.backoff_factor < 1.0 {
            return Err(Error::Config("backoff_factor must be at least 1.0".to_string()));
        }
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }
        Ok(())
    }
}
