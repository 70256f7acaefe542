use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

use crate::error::Result;
use crate::processors::{CompletenessPolicy, DatasetPreparer};
use crate::readers::AirQualityReader;
use crate::utils::constants::{DEFAULT_BIN_COUNT, DEFAULT_DATA_PATH, DEFAULT_OUTPUT_DIR};

/// Settings read from an optional configuration file (TOML, JSON or YAML).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,

    pub output_dir: PathBuf,

    #[validate(range(min = 1, max = 50))]
    pub temp_bins: usize,

    #[validate(range(min = 1, max = 50))]
    pub wind_bins: usize,

    pub completeness: CompletenessPolicy,

    pub use_mmap: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            temp_bins: DEFAULT_BIN_COUNT,
            wind_bins: DEFAULT_BIN_COUNT,
            completeness: CompletenessPolicy::default(),
            use_mmap: false,
        }
    }
}

impl DashboardConfig {
    /// Load from `path`, or fall back to defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(config::File::from(path));
        }

        let settings: DashboardConfig = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn reader(&self) -> AirQualityReader {
        AirQualityReader::with_mmap(self.use_mmap)
    }

    pub fn preparer(&self) -> DatasetPreparer {
        DatasetPreparer::new()
            .with_bin_counts(self.temp_bins, self.wind_bins)
            .with_boxed_completeness(self.completeness.predicate())
    }
}
