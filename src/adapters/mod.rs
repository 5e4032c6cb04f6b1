// Adapters layer: concrete implementations for external systems.

pub mod http;
pub mod storage;

pub use http::{NpsStatsClient, DEFAULT_STATS_ENDPOINT};
pub use storage::LocalStorage;
