//! Chunked, sequential fetching of park codes from a [`VisitationSource`].

use crate::domain::model::{BatchRequest, RawBatch};
use crate::domain::ports::VisitationSource;
use crate::utils::error::{EtlError, Result};
use std::time::Duration;

pub const DEFAULT_CHUNK_SIZE: usize = 10;
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(2);

/// Split `codes` into chunks of at most `chunk_size`, each covering January
/// of the earliest year through December of the latest.
pub fn plan_batches(codes: &[String], years: &[i32], chunk_size: usize) -> Result<Vec<BatchRequest>> {
    if chunk_size == 0 {
        return Err(EtlError::InvalidConfigValueError {
            field: "chunk_size".to_string(),
            value: chunk_size.to_string(),
            reason: "Value must be at least 1".to_string(),
        });
    }
    let (Some(&start_year), Some(&end_year)) = (years.iter().min(), years.iter().max()) else {
        return Err(EtlError::MissingConfigError {
            field: "years".to_string(),
        });
    };

    Ok(codes
        .chunks(chunk_size)
        .map(|chunk| BatchRequest {
            unit_codes: chunk.to_vec(),
            start_year,
            start_month: 1,
            end_year,
            end_month: 12,
        })
        .collect())
}

#[derive(Debug)]
pub struct BatchFailure {
    pub unit_codes: Vec<String>,
    pub error: EtlError,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub batches: Vec<RawBatch>,
    pub failures: Vec<BatchFailure>,
}

pub struct BatchFetcher<'a, V: VisitationSource> {
    source: &'a V,
    delay: Duration,
}

impl<'a, V: VisitationSource> BatchFetcher<'a, V> {
    pub fn new(source: &'a V, delay: Duration) -> Self {
        Self { source, delay }
    }

    /// Fetch every request in order. A failed chunk is logged and recorded;
    /// it never stops the remaining chunks and is not retried.
    pub async fn run(&self, requests: &[BatchRequest]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let total_codes: usize = requests.iter().map(|r| r.unit_codes.len()).sum();
        let mut first = 0usize;

        for (i, request) in requests.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tracing::debug!("Waiting {:?} before next request", self.delay);
                tokio::time::sleep(self.delay).await;
            }

            let last = first + request.unit_codes.len();
            tracing::info!("Processing parks {}-{} of {}", first + 1, last, total_codes);
            first = last;

            match self.source.fetch_visitation_xml(request).await {
                Ok(xml) => outcome.batches.push(RawBatch {
                    unit_codes: request.unit_codes.clone(),
                    xml,
                }),
                Err(error) => {
                    tracing::warn!(
                        "Error processing chunk {:?}: {}; continuing with remaining parks",
                        request.unit_codes,
                        error
                    );
                    outcome.failures.push(BatchFailure {
                        unit_codes: request.unit_codes.clone(),
                        error,
                    });
                }
            }
        }

        outcome
    }
}
