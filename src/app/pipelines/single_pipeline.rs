use crate::core::visitation_xml::parse_single_visitation;
use crate::core::VisitationSource;
use crate::domain::model::{BatchRequest, ParkRecord};
use crate::utils::error::Result;
use crate::utils::validation::{validate_park_code, validate_range, MAX_YEAR, MIN_YEAR};

/// Fetch January through December of `year` for one park.
///
/// Unlike the bulk pipeline every failure is fatal: an HTTP error, an
/// empty body or an unparseable document is returned to the caller.
pub async fn fetch_park_year<V: VisitationSource>(source: &V, park: &str, year: i32) -> Result<ParkRecord> {
    validate_park_code("park", park)?;
    validate_range("year", year, MIN_YEAR, MAX_YEAR)?;

    let park = park.to_uppercase();
    let request = BatchRequest {
        unit_codes: vec![park.clone()],
        start_year: year,
        start_month: 1,
        end_year: year,
        end_month: 12,
    };

    let xml = source.fetch_visitation_xml(&request).await?;
    parse_single_visitation(&xml, &park, year)
}
