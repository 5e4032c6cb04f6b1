pub mod toml_config;

use crate::adapters::http::DEFAULT_STATS_ENDPOINT;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_url, validate_years, Validate,
};
use std::time::Duration;

#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "park-visitation"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Collect monthly visitation for every park listed in a parks file")
)]
pub struct CliConfig {
    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_STATS_ENDPOINT))]
    pub api_endpoint: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "data/parks.json"))]
    pub parks_file: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "data/park_visitation_data.json"))]
    pub output_file: String,

    /// Also write per-park monthly averages across the years to this file
    #[cfg_attr(feature = "cli", arg(long))]
    pub averages_file: Option<String>,

    #[cfg_attr(
        feature = "cli",
        arg(long, value_delimiter = ',', default_value = "2022,2023,2024")
    )]
    pub years: Vec<i32>,

    #[cfg_attr(feature = "cli", arg(long, default_value = "10"))]
    pub chunk_size: usize,

    /// Pause between consecutive chunk requests
    #[cfg_attr(feature = "cli", arg(long, default_value = "2000"))]
    pub delay_ms: u64,

    #[cfg_attr(feature = "cli", arg(long))]
    pub timeout_seconds: Option<u64>,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn parks_file(&self) -> &str {
        &self.parks_file
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn averages_file(&self) -> Option<&str> {
        self.averages_file.as_deref()
    }

    fn target_years(&self) -> &[i32] {
        &self.years
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_endpoint", &self.api_endpoint)?;
        validate_path("parks_file", &self.parks_file)?;
        validate_path("output_file", &self.output_file)?;
        if let Some(averages_file) = &self.averages_file {
            validate_path("averages_file", averages_file)?;
        }
        validate_years("years", &self.years)?;
        validate_positive_number("chunk_size", self.chunk_size, 1)?;
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("timeout_seconds", timeout as usize, 1)?;
        }
        Ok(())
    }
}
