use crate::adapters::http::DEFAULT_STATS_ENDPOINT;
use crate::core::batch::{DEFAULT_CHUNK_SIZE, DEFAULT_REQUEST_DELAY};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_url, validate_years, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Bulk collection settings read from a TOML file:
///
/// ```toml
/// [source]
/// endpoint = "https://irmaservices.nps.gov/Stats/v1/visitation"
/// timeout_seconds = 30
///
/// [extract]
/// parks_file = "data/parks.json"
/// years = [2022, 2023, 2024]
/// chunk_size = 10
/// delay_ms = 2000
///
/// [load]
/// output_path = "data/park_visitation_data.json"
/// averages_path = "data/monthly_visitation.json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    pub extract: ExtractConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub parks_file: String,
    pub years: Vec<i32>,
    pub chunk_size: Option<usize>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub averages_path: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_STATS_ENDPOINT.to_string()
}

impl TomlConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replace `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn parks_file(&self) -> &str {
        &self.extract.parks_file
    }

    fn output_file(&self) -> &str {
        &self.load.output_path
    }

    fn averages_file(&self) -> Option<&str> {
        self.load.averages_path.as_deref()
    }

    fn target_years(&self) -> &[i32] {
        &self.extract.years
    }

    fn chunk_size(&self) -> usize {
        self.extract.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    fn request_delay(&self) -> Duration {
        self.extract
            .delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REQUEST_DELAY)
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("source.endpoint", &self.source.endpoint)?;
        validate_path("extract.parks_file", &self.extract.parks_file)?;
        validate_path("load.output_path", &self.load.output_path)?;
        if let Some(averages_path) = &self.load.averages_path {
            validate_path("load.averages_path", averages_path)?;
        }
        validate_years("extract.years", &self.extract.years)?;
        validate_positive_number("extract.chunk_size", self.chunk_size(), 1)?;
        Ok(())
    }
}
