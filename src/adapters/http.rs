use crate::domain::model::BatchRequest;
use crate::domain::ports::VisitationSource;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::time::Duration;

/// Public NPS visitation statistics endpoint; answers in XML only.
pub const DEFAULT_STATS_ENDPOINT: &str = "https://irmaservices.nps.gov/Stats/v1/visitation";

#[derive(Debug, Clone)]
pub struct NpsStatsClient {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl NpsStatsClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl VisitationSource for NpsStatsClient {
    async fn fetch_visitation_xml(&self, request: &BatchRequest) -> Result<String> {
        let unit_codes = request.unit_codes_param();
        tracing::info!(
            "Requesting data for {} parks: {}-{} to {}-{}",
            request.unit_codes.len(),
            request.start_year,
            request.start_month,
            request.end_year,
            request.end_month
        );
        tracing::debug!("Making API request to: {} (unitCodes={})", self.endpoint, unit_codes);

        let mut builder = self.client.get(&self.endpoint).query(&[
            ("unitCodes", unit_codes.clone()),
            ("startMonth", request.start_month.to_string()),
            ("startYear", request.start_year.to_string()),
            ("endMonth", request.end_month.to_string()),
            ("endYear", request.end_year.to_string()),
        ]);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        tracing::debug!(
            "HTTP {}: Content-Type: {}",
            response.status(),
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("<none>")
        );

        let text = response.error_for_status()?.text().await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(EtlError::EmptyResponse { unit_codes });
        }
        Ok(text.to_string())
    }
}
