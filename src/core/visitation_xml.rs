//! Parsing of the NPS Stats `ArrayOfVisitationData` XML document.
//!
//! Each `VisitationData` element carries one park-month. Rows are grouped
//! by park code and year into [`ParkRecord`]s whose monthly series is sorted
//! ascending by month. Months the service does not report stay absent.

use crate::domain::model::{MonthRecord, ParkRecord};
use crate::utils::error::{EtlError, Result};
use roxmltree::{Document, Node};
use std::collections::{BTreeMap, BTreeSet};

/// Default namespace declared on every response from the stats service.
pub const VISITATION_NS: &str = "http://schemas.datacontract.org/2004/07/NPS.Stats.Service.Rest.v3";

const VISITATION_DATA: &str = "VisitationData";
const UNIT_CODE: &str = "UnitCode";
const YEAR: &str = "Year";
const MONTH: &str = "Month";
const RECREATION_VISITORS: &str = "RecreationVisitors";
const NON_RECREATION_VISITORS: &str = "NonRecreationVisitors";

/// park code -> year -> record
pub type VisitationIndex = BTreeMap<String, BTreeMap<i32, ParkRecord>>;

/// Parse a multi-park response, keeping only rows whose year is in `years`.
pub fn parse_visitation_xml(xml: &str, years: &BTreeSet<i32>) -> Result<Vec<ParkRecord>> {
    let index = index_visitation(xml, |_, year| years.contains(&year))?;
    Ok(flatten(index))
}

/// Parse a response for exactly one park and year.
///
/// A response without matching rows yields a record with an empty series.
pub fn parse_single_visitation(xml: &str, unit: &str, year: i32) -> Result<ParkRecord> {
    let mut index = index_visitation(xml, |code, y| code == unit && y == year)?;

    let record = index
        .remove(unit)
        .and_then(|mut years| years.remove(&year))
        .unwrap_or_else(|| ParkRecord::new(unit, year));

    if record.monthly.is_empty() {
        tracing::warn!("No data for {} in {}", unit, year);
    }
    Ok(record)
}

/// Group every accepted row into the park/year index with sorted series.
pub fn index_visitation<F>(xml: &str, mut accept: F) -> Result<VisitationIndex>
where
    F: FnMut(&str, i32) -> bool,
{
    let doc = Document::parse(xml)?;
    let mut index = VisitationIndex::new();
    let mut rows = 0usize;

    for row in doc
        .root_element()
        .children()
        .filter(|n| n.is_element() && n.has_tag_name((VISITATION_NS, VISITATION_DATA)))
    {
        rows += 1;
        let unit = field_text(row, UNIT_CODE)?;
        let year: i32 = numeric_field(row, YEAR)?;
        if !accept(unit, year) {
            continue;
        }

        let month: u32 = numeric_field(row, MONTH)?;
        if !(1..=12).contains(&month) {
            return Err(EtlError::FieldParseError {
                field: MONTH.to_string(),
                message: format!("{} is outside 1-12", month),
            });
        }
        let recreation: u64 = numeric_field(row, RECREATION_VISITORS)?;
        let non_recreation: u64 = numeric_field(row, NON_RECREATION_VISITORS)?;
        let month_record = MonthRecord::try_new(year, month, recreation, non_recreation)
            .ok_or_else(|| EtlError::FieldParseError {
                field: NON_RECREATION_VISITORS.to_string(),
                message: format!(
                    "total of {} recreation and {} non-recreation visitors overflows",
                    recreation, non_recreation
                ),
            })?;

        index
            .entry(unit.to_string())
            .or_default()
            .entry(year)
            .or_insert_with(|| ParkRecord::new(unit, year))
            .monthly
            .push(month_record);
    }

    for record in index.values_mut().flat_map(|years| years.values_mut()) {
        record.sort_monthly();
    }

    tracing::debug!(
        "Parsed {} VisitationData rows into {} park(s)",
        rows,
        index.len()
    );
    Ok(index)
}

/// Flatten the index into a list ordered by park code, then year.
pub fn flatten(index: VisitationIndex) -> Vec<ParkRecord> {
    index
        .into_values()
        .flat_map(|years| years.into_values())
        .collect()
}

fn field_text<'a>(row: Node<'a, '_>, name: &str) -> Result<&'a str> {
    row.children()
        .find(|n| n.is_element() && n.has_tag_name((VISITATION_NS, name)))
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| EtlError::FieldParseError {
            field: name.to_string(),
            message: "missing from VisitationData element".to_string(),
        })
}

fn numeric_field<T: std::str::FromStr>(row: Node<'_, '_>, name: &str) -> Result<T> {
    let text = field_text(row, name)?;
    text.parse().map_err(|_| EtlError::FieldParseError {
        field: name.to_string(),
        message: format!("not a number: '{}'", text),
    })
}
