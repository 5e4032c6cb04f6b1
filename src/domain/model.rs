use serde::{Deserialize, Serialize};

/// One month of visitation for a single park.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRecord {
    /// `YYYY-MM`
    pub month: String,
    pub recreation: u64,
    pub non_recreation: u64,
    pub total_visits: u64,
}

impl MonthRecord {
    /// Build a month whose total does not fit in `u64` as `None`.
    pub fn try_new(year: i32, month: u32, recreation: u64, non_recreation: u64) -> Option<Self> {
        let total_visits = recreation.checked_add(non_recreation)?;
        Some(Self {
            month: format!("{:04}-{:02}", year, month),
            recreation,
            non_recreation,
            total_visits,
        })
    }

    /// Like [`MonthRecord::try_new`], with the total saturating at `u64::MAX`.
    pub fn new(year: i32, month: u32, recreation: u64, non_recreation: u64) -> Self {
        Self {
            month: format!("{:04}-{:02}", year, month),
            recreation,
            non_recreation,
            total_visits: recreation.saturating_add(non_recreation),
        }
    }

    /// Month number parsed back out of the `YYYY-MM` key.
    pub fn month_number(&self) -> Option<u32> {
        self.month.split_once('-')?.1.parse().ok()
    }
}

/// Monthly visitation series for one park in one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkRecord {
    pub park_code: String,
    pub year: i32,
    pub monthly: Vec<MonthRecord>,
}

impl ParkRecord {
    pub fn new(park_code: impl Into<String>, year: i32) -> Self {
        Self {
            park_code: park_code.into(),
            year,
            monthly: Vec::new(),
        }
    }

    pub fn sort_monthly(&mut self) {
        self.monthly.sort_by(|a, b| a.month.cmp(&b.month));
    }

    pub fn total_visits(&self) -> u64 {
        self.monthly.iter().map(|m| m.total_visits).sum()
    }

    /// Months of the year with no entry. Gaps are reported, never zero-filled.
    pub fn missing_months(&self) -> Vec<u32> {
        let present: Vec<u32> = self.monthly.iter().filter_map(MonthRecord::month_number).collect();
        (1..=12).filter(|m| !present.contains(m)).collect()
    }
}

/// One upstream call: a chunk of park codes over a contiguous month range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub unit_codes: Vec<String>,
    pub start_year: i32,
    pub start_month: u32,
    pub end_year: i32,
    pub end_month: u32,
}

impl BatchRequest {
    pub fn unit_codes_param(&self) -> String {
        self.unit_codes.join(",")
    }
}

/// XML body fetched for one chunk, not yet parsed.
#[derive(Debug, Clone)]
pub struct RawBatch {
    pub unit_codes: Vec<String>,
    pub xml: String,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<ParkRecord>,
    pub skipped_batches: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_record_total_and_key() {
        let m = MonthRecord::new(2024, 3, 1200, 34);
        assert_eq!(m.month, "2024-03");
        assert_eq!(m.total_visits, 1234);
        assert_eq!(m.month_number(), Some(3));
    }

    #[test]
    fn test_try_new_rejects_overflowing_total() {
        assert!(MonthRecord::try_new(2024, 1, u64::MAX, 1).is_none());
        assert_eq!(
            MonthRecord::try_new(2024, 1, u64::MAX, 0).map(|m| m.total_visits),
            Some(u64::MAX)
        );
        assert_eq!(MonthRecord::new(2024, 1, u64::MAX, 1).total_visits, u64::MAX);
    }

    #[test]
    fn test_park_record_serializes_camel_case() {
        let mut record = ParkRecord::new("OLYM", 2024);
        record.monthly.push(MonthRecord::new(2024, 1, 10, 5));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["parkCode"], "OLYM");
        assert_eq!(json["year"], 2024);
        assert_eq!(json["monthly"][0]["nonRecreation"], 5);
        assert_eq!(json["monthly"][0]["totalVisits"], 15);
    }

    #[test]
    fn test_missing_months() {
        let mut record = ParkRecord::new("ACAD", 2023);
        for month in [1, 2, 4, 12] {
            record.monthly.push(MonthRecord::new(2023, month, 1, 0));
        }
        assert_eq!(record.missing_months(), vec![3, 5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(record.total_visits(), 4);
    }
}
