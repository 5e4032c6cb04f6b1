use crate::domain::model::{BatchRequest, RawBatch, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Anything that can answer a batch request with the raw visitation XML.
pub trait VisitationSource: Send + Sync {
    fn fetch_visitation_xml(
        &self,
        request: &BatchRequest,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn parks_file(&self) -> &str;
    fn output_file(&self) -> &str;
    /// Where to write per-park monthly averages, if anywhere.
    fn averages_file(&self) -> Option<&str>;
    fn target_years(&self) -> &[i32];
    fn chunk_size(&self) -> usize;
    fn request_delay(&self) -> Duration;
    fn request_timeout(&self) -> Option<Duration>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawBatch>>;
    async fn transform(&self, data: Vec<RawBatch>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
