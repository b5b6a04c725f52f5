//! Pipeline configuration.
//!
//! Values are layered with figment: built-in defaults, then an optional TOML
//! file, then `PIPELINE_*` environment variables. Command-line flags override
//! whatever the layers produce.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::utils::{validate_test_size, PipelineError};
use crate::Result;

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "pipeline.toml";

/// Environment variable prefix for overrides, e.g. `PIPELINE_TEST_SIZE=0.3`
pub const ENV_PREFIX: &str = "PIPELINE_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw dataset consumed by the local pipeline runner
    pub input_data: PathBuf,
    /// Root directory for pipeline artifacts
    pub output_dir: PathBuf,
    /// Held-out fraction used by the prep step
    pub test_size: f64,
    /// Shuffle seed used by the prep step
    pub seed: u64,
    /// Where the test step writes its metrics document
    pub metrics_file: PathBuf,
    /// Rows shown in the prediction preview
    pub preview_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_data: PathBuf::from("data/sample_data.csv"),
            output_dir: PathBuf::from("outputs"),
            test_size: 0.2,
            seed: 42,
            metrics_file: PathBuf::from("outputs/metrics.json"),
            preview_rows: 5,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from defaults, the TOML file and the environment
    ///
    /// An explicitly requested file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(PipelineError::ConfigError(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }
        Self::from_figment(Self::figment(path))
    }

    /// The provider stack used by [`PipelineConfig::load`]
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(PipelineConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: PipelineConfig = figment
            .extract()
            .map_err(|e| PipelineError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_test_size(self.test_size)
            .map_err(|e| PipelineError::ConfigError(e.to_string()))
    }
}
