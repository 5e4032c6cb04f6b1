pub mod bulk_pipeline;
pub mod single_pipeline;

pub use bulk_pipeline::BulkPipeline;
pub use single_pipeline::fetch_park_year;
