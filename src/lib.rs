pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{LocalStorage, NpsStatsClient};
pub use app::pipelines::{fetch_park_year, BulkPipeline};
pub use config::{toml_config::TomlConfig, CliConfig};
pub use crate::core::etl::EtlEngine;
pub use domain::model::{MonthRecord, ParkRecord};
pub use utils::error::{EtlError, Result};
