//! Per-park monthly averages across the collected years.
//!
//! Months are keyed by calendar month, so a park that lacks a month in one
//! year still averages the remaining years for that month correctly.

use crate::domain::model::ParkRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkMonthlyAverages {
    pub park_code: String,
    /// calendar month (1-12) -> rounded mean of `totalVisits`
    pub monthly_averages: BTreeMap<u32, u64>,
}

/// Average each park's `totalVisits` per calendar month over every year it
/// reported that month. Months no year reported are left out.
pub fn monthly_averages(records: &[ParkRecord]) -> Vec<ParkMonthlyAverages> {
    let mut sums: BTreeMap<&str, BTreeMap<u32, (u128, u64)>> = BTreeMap::new();

    for record in records {
        let months = sums.entry(record.park_code.as_str()).or_default();
        for month in &record.monthly {
            let Some(number) = month.month_number() else {
                tracing::debug!("Ignoring unkeyed month '{}' for {}", month.month, record.park_code);
                continue;
            };
            let (sum, count) = months.entry(number).or_default();
            *sum += u128::from(month.total_visits);
            *count += 1;
        }
    }

    sums.into_iter()
        .map(|(park_code, months)| ParkMonthlyAverages {
            park_code: park_code.to_string(),
            monthly_averages: months
                .into_iter()
                .map(|(month, (sum, count))| (month, rounded_mean(sum, count)))
                .collect(),
        })
        .collect()
}

/// Integer mean, ties rounded to even.
fn rounded_mean(sum: u128, count: u64) -> u64 {
    let count = u128::from(count);
    let quotient = sum / count;
    let rounded = match ((sum % count) * 2).cmp(&count) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal => quotient + quotient % 2,
    };
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MonthRecord;

    fn record(park: &str, year: i32, months: &[(u32, u64)]) -> ParkRecord {
        let mut record = ParkRecord::new(park, year);
        for &(month, total) in months {
            record.monthly.push(MonthRecord::new(year, month, total, 0));
        }
        record
    }

    #[test]
    fn test_averages_same_month_across_years() {
        let records = vec![
            record("OLYM", 2022, &[(1, 100), (2, 10)]),
            record("OLYM", 2023, &[(1, 201), (2, 20)]),
        ];

        let averages = monthly_averages(&records);

        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].park_code, "OLYM");
        assert_eq!(averages[0].monthly_averages, BTreeMap::from([(1, 150), (2, 15)]));
    }

    #[test]
    fn test_missing_month_does_not_shift_later_months() {
        let records = vec![
            record("ZION", 2022, &[(1, 10), (3, 30)]),
            record("ZION", 2023, &[(1, 20), (2, 1_000), (3, 50)]),
        ];

        let averages = monthly_averages(&records);
        let zion = &averages[0].monthly_averages;

        assert_eq!(zion.get(&1), Some(&15));
        assert_eq!(zion.get(&2), Some(&1_000));
        assert_eq!(zion.get(&3), Some(&40));
        assert_eq!(zion.get(&4), None);
    }

    #[test]
    fn test_parks_are_kept_apart_and_sorted() {
        let records = vec![
            record("YELL", 2023, &[(7, 9)]),
            record("ACAD", 2023, &[(7, 3)]),
        ];

        let codes: Vec<String> = monthly_averages(&records)
            .into_iter()
            .map(|a| a.park_code)
            .collect();

        assert_eq!(codes, vec!["ACAD", "YELL"]);
    }

    #[test]
    fn test_rounding_ties_to_even() {
        assert_eq!(rounded_mean(3, 2), 2);
        assert_eq!(rounded_mean(5, 2), 2);
        assert_eq!(rounded_mean(7, 3), 2);
        assert_eq!(rounded_mean(8, 3), 3);
        assert_eq!(rounded_mean(u128::from(u64::MAX) * 2, 2), u64::MAX);
    }

    #[test]
    fn test_serializes_month_keys_as_strings() {
        let averages = monthly_averages(&[record("OLYM", 2024, &[(12, 4)])]);

        let json = serde_json::to_value(&averages).unwrap();

        assert_eq!(json[0]["parkCode"], "OLYM");
        assert_eq!(json[0]["monthlyAverages"]["12"], 4);
    }
}
