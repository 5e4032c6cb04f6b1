use crate::adapters::http::NpsStatsClient;
use crate::core::averages::monthly_averages;
use crate::core::batch::{plan_batches, BatchFetcher};
use crate::core::park_codes::load_park_codes;
use crate::core::visitation_xml::parse_visitation_xml;
use crate::core::{ConfigProvider, Pipeline, RawBatch, Storage, TransformResult, VisitationSource};
use crate::utils::error::{EtlError, Result};
use std::collections::{BTreeSet, HashSet};

/// Collects visitation for every park listed in the parks file, chunk by
/// chunk, and writes the flattened records as one JSON array.
pub struct BulkPipeline<S: Storage, C: ConfigProvider, V: VisitationSource = NpsStatsClient> {
    storage: S,
    config: C,
    source: V,
}

impl<S: Storage, C: ConfigProvider> BulkPipeline<S, C, NpsStatsClient> {
    pub fn new(storage: S, config: C) -> Self {
        let source = NpsStatsClient::new(config.api_endpoint()).with_timeout(config.request_timeout());
        Self::with_source(storage, config, source)
    }
}

impl<S: Storage, C: ConfigProvider, V: VisitationSource> BulkPipeline<S, C, V> {
    pub fn with_source(storage: S, config: C, source: V) -> Self {
        Self {
            storage,
            config,
            source,
        }
    }

    pub async fn park_codes(&self) -> Result<Vec<String>> {
        let parks_file = self.config.parks_file();
        let data = self.storage.read_file(parks_file).await?;
        let codes = load_park_codes(&data)?;
        tracing::info!("Found {} parks in {}", codes.len(), parks_file);

        if codes.is_empty() {
            return Err(EtlError::ValidationError {
                message: format!("No park codes found in {}", parks_file),
            });
        }
        Ok(codes)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, V: VisitationSource> Pipeline for BulkPipeline<S, C, V> {
    async fn extract(&self) -> Result<Vec<RawBatch>> {
        let codes = self.park_codes().await?;
        let requests = plan_batches(&codes, self.config.target_years(), self.config.chunk_size())?;
        tracing::info!(
            "Fetching visitation data for {} parks in {} chunk(s), years {:?}",
            codes.len(),
            requests.len(),
            self.config.target_years()
        );

        let outcome = BatchFetcher::new(&self.source, self.config.request_delay())
            .run(&requests)
            .await;

        if !outcome.failures.is_empty() {
            tracing::warn!(
                "{} of {} chunk(s) failed and were skipped",
                outcome.failures.len(),
                requests.len()
            );
        }
        Ok(outcome.batches)
    }

    async fn transform(&self, data: Vec<RawBatch>) -> Result<TransformResult> {
        let years: BTreeSet<i32> = self.config.target_years().iter().copied().collect();
        let mut records = Vec::new();
        let mut skipped_batches = 0;

        for batch in data {
            match parse_visitation_xml(&batch.xml, &years) {
                Ok(chunk_records) => {
                    tracing::info!(
                        "Successfully processed {} park-year combinations",
                        chunk_records.len()
                    );
                    records.extend(chunk_records);
                }
                Err(e) => {
                    tracing::warn!(
                        "Error processing chunk {:?}: {}; continuing with remaining parks",
                        batch.unit_codes,
                        e
                    );
                    skipped_batches += 1;
                }
            }
        }

        for record in &records {
            let missing = record.missing_months();
            if !missing.is_empty() {
                tracing::debug!(
                    "{} {} has no data for month(s) {:?}",
                    record.park_code,
                    record.year,
                    missing
                );
            }
        }

        if records.is_empty() {
            return Err(EtlError::NoDataError);
        }

        Ok(TransformResult {
            records,
            skipped_batches,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_file = self.config.output_file();
        let json = serde_json::to_string_pretty(&result.records)?;

        tracing::debug!("Writing {} bytes to {}", json.len(), output_file);
        self.storage.write_file(output_file, json.as_bytes()).await?;

        let parks: HashSet<&str> = result.records.iter().map(|r| r.park_code.as_str()).collect();
        let years: HashSet<i32> = result.records.iter().map(|r| r.year).collect();
        tracing::info!(
            "Saved {} park-year records to {}",
            result.records.len(),
            output_file
        );
        tracing::info!(
            "Data includes {} parks across {} years",
            parks.len(),
            years.len()
        );

        if let Some(averages_file) = self.config.averages_file() {
            let averages = monthly_averages(&result.records);
            let json = serde_json::to_string_pretty(&averages)?;
            self.storage.write_file(averages_file, json.as_bytes()).await?;
            tracing::info!(
                "Saved monthly averages for {} parks to {}",
                averages.len(),
                averages_file
            );
        }

        Ok(output_file.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::averages::ParkMonthlyAverages;
    use crate::core::visitation_xml::VISITATION_NS;
    use crate::domain::model::{BatchRequest, MonthRecord, ParkRecord};
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_parks(parks: serde_json::Value) -> Self {
            let mut files = HashMap::new();
            files.insert("parks.json".to_string(), parks.to_string().into_bytes());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        api_endpoint: String,
        years: Vec<i32>,
        chunk_size: usize,
        averages_file: Option<String>,
    }

    impl MockConfig {
        fn new(api_endpoint: String) -> Self {
            Self {
                api_endpoint,
                years: vec![2023, 2024],
                chunk_size: 2,
                averages_file: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn api_endpoint(&self) -> &str {
            &self.api_endpoint
        }

        fn parks_file(&self) -> &str {
            "parks.json"
        }

        fn output_file(&self) -> &str {
            "out/visitation.json"
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
            Duration::ZERO
        }

        fn request_timeout(&self) -> Option<Duration> {
            None
        }
    }

    /// Serves a canned body per unit-code chunk, or fails for unknown chunks.
    struct CannedSource {
        bodies: HashMap<String, String>,
    }

    impl VisitationSource for CannedSource {
        async fn fetch_visitation_xml(&self, request: &BatchRequest) -> Result<String> {
            let key = request.unit_codes_param();
            self.bodies
                .get(&key)
                .cloned()
                .ok_or(EtlError::EmptyResponse { unit_codes: key })
        }
    }

    fn visitation_xml(rows: &[(&str, i32, u32, u64, u64)]) -> String {
        let body: String = rows
            .iter()
            .map(|(unit, year, month, rec, nonrec)| {
                format!(
                    "<VisitationData><UnitCode>{unit}</UnitCode><Year>{year}</Year>\
                     <Month>{month}</Month><RecreationVisitors>{rec}</RecreationVisitors>\
                     <NonRecreationVisitors>{nonrec}</NonRecreationVisitors></VisitationData>"
                )
            })
            .collect();
        format!(r#"<ArrayOfVisitationData xmlns="{VISITATION_NS}">{body}</ArrayOfVisitationData>"#)
    }

    fn three_parks() -> serde_json::Value {
        serde_json::json!([
            {"parkCode": "acad"},
            {"parkCode": "olym"},
            {"parkCode": "yell"}
        ])
    }

    #[tokio::test]
    async fn test_extract_requests_each_chunk() {
        let server = MockServer::start_async().await;
        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/visitation")
                    .query_param("unitCodes", "ACAD,OLYM")
                    .query_param("startYear", "2023")
                    .query_param("endYear", "2024");
                then.status(200).body(visitation_xml(&[("ACAD", 2023, 1, 1, 1)]));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/visitation")
                    .query_param("unitCodes", "YELL");
                then.status(200).body(visitation_xml(&[("YELL", 2024, 1, 1, 1)]));
            })
            .await;

        let storage = MockStorage::with_parks(three_parks());
        let config = MockConfig::new(server.url("/visitation"));
        let pipeline = BulkPipeline::new(storage, config);

        let batches = pipeline.extract().await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].unit_codes, vec!["YELL"]);
    }

    #[tokio::test]
    async fn test_extract_skips_failed_chunk() {
        let mut bodies = HashMap::new();
        bodies.insert("YELL".to_string(), visitation_xml(&[("YELL", 2024, 1, 1, 1)]));

        let storage = MockStorage::with_parks(three_parks());
        let config = MockConfig::new("http://unused".to_string());
        let pipeline = BulkPipeline::with_source(storage, config, CannedSource { bodies });

        let batches = pipeline.extract().await.unwrap();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].unit_codes, vec!["YELL"]);
    }

    #[tokio::test]
    async fn test_extract_without_park_codes_is_error() {
        let storage = MockStorage::with_parks(serde_json::json!([{"name": "no code"}]));
        let config = MockConfig::new("http://unused".to_string());
        let source = CannedSource {
            bodies: HashMap::new(),
        };
        let pipeline = BulkPipeline::with_source(storage, config, source);

        let err = pipeline.extract().await.unwrap_err();

        assert!(matches!(err, EtlError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_transform_skips_unparseable_batch() {
        let storage = MockStorage::with_parks(three_parks());
        let config = MockConfig::new("http://unused".to_string());
        let pipeline = BulkPipeline::new(storage, config);

        let batches = vec![
            RawBatch {
                unit_codes: vec!["ACAD".to_string(), "OLYM".to_string()],
                xml: "<not-closed>".to_string(),
            },
            RawBatch {
                unit_codes: vec!["YELL".to_string()],
                xml: visitation_xml(&[
                    ("YELL", 2024, 2, 10, 1),
                    ("YELL", 2024, 1, 20, 2),
                    ("YELL", 2022, 1, 99, 9),
                ]),
            },
        ];

        let result = pipeline.transform(batches).await.unwrap();

        assert_eq!(result.skipped_batches, 1);
        assert_eq!(result.records.len(), 1);
        let months: Vec<&str> = result.records[0]
            .monthly
            .iter()
            .map(|m| m.month.as_str())
            .collect();
        assert_eq!(months, vec!["2024-01", "2024-02"]);
    }

    #[tokio::test]
    async fn test_transform_skips_batch_with_overflowing_total() {
        let storage = MockStorage::with_parks(three_parks());
        let config = MockConfig::new("http://unused".to_string());
        let pipeline = BulkPipeline::new(storage, config);

        let batches = vec![
            RawBatch {
                unit_codes: vec!["ACAD".to_string(), "OLYM".to_string()],
                xml: visitation_xml(&[("ACAD", 2023, 1, u64::MAX, 1)]),
            },
            RawBatch {
                unit_codes: vec!["YELL".to_string()],
                xml: visitation_xml(&[("YELL", 2023, 1, 7, 3)]),
            },
        ];

        let result = pipeline.transform(batches).await.unwrap();

        assert_eq!(result.skipped_batches, 1);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].park_code, "YELL");
        assert_eq!(result.records[0].monthly[0].total_visits, 10);
    }

    #[tokio::test]
    async fn test_transform_without_records_is_no_data() {
        let storage = MockStorage::with_parks(three_parks());
        let config = MockConfig::new("http://unused".to_string());
        let pipeline = BulkPipeline::new(storage, config);

        let err = pipeline.transform(vec![]).await.unwrap_err();

        assert!(matches!(err, EtlError::NoDataError));
    }

    #[tokio::test]
    async fn test_load_writes_json_array() {
        let storage = MockStorage::with_parks(three_parks());
        let config = MockConfig::new("http://unused".to_string());
        let pipeline = BulkPipeline::new(storage.clone(), config);

        let mut record = ParkRecord::new("OLYM", 2024);
        record.monthly.push(MonthRecord::new(2024, 7, 500, 25));
        let result = TransformResult {
            records: vec![record.clone()],
            skipped_batches: 0,
        };

        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "out/visitation.json");
        let written = storage.get_file("out/visitation.json").await.unwrap();
        let parsed: Vec<ParkRecord> = serde_json::from_slice(&written).unwrap();
        assert_eq!(parsed, vec![record]);
        let raw: serde_json::Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(raw[0]["monthly"][0]["totalVisits"], 525);
        assert!(storage.get_file("out/monthly.json").await.is_none());
    }

    #[tokio::test]
    async fn test_load_writes_monthly_averages_when_configured() {
        let storage = MockStorage::with_parks(three_parks());
        let config = MockConfig {
            averages_file: Some("out/monthly.json".to_string()),
            ..MockConfig::new("http://unused".to_string())
        };
        let pipeline = BulkPipeline::new(storage.clone(), config);

        let mut first = ParkRecord::new("OLYM", 2023);
        first.monthly.push(MonthRecord::new(2023, 1, 100, 0));
        first.monthly.push(MonthRecord::new(2023, 3, 30, 0));
        let mut second = ParkRecord::new("OLYM", 2024);
        second.monthly.push(MonthRecord::new(2024, 1, 200, 0));
        let result = TransformResult {
            records: vec![first, second],
            skipped_batches: 0,
        };

        pipeline.load(result).await.unwrap();

        let written = storage.get_file("out/monthly.json").await.unwrap();
        let averages: Vec<ParkMonthlyAverages> = serde_json::from_slice(&written).unwrap();
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].park_code, "OLYM");
        assert_eq!(averages[0].monthly_averages.get(&1), Some(&150));
        assert_eq!(averages[0].monthly_averages.get(&2), None);
        assert_eq!(averages[0].monthly_averages.get(&3), Some(&30));
    }
}
