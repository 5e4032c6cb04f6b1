use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting visitation collection");

        // Extract
        let raw_batches = self.pipeline.extract().await?;
        tracing::info!("Extracted {} batch(es)", raw_batches.len());

        // Transform
        let transformed = self.pipeline.transform(raw_batches).await?;
        tracing::info!(
            "Transformed {} park-year records ({} batch(es) skipped)",
            transformed.records.len(),
            transformed.skipped_batches
        );

        // Load
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!(
            "Output saved to: {} in {:?}",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
