//! Bogotá-local timestamp formatting used in API responses.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::Serializer;

/// Colombia does not observe daylight saving time.
const BOGOTA_OFFSET_SECONDS: i32 = 5 * 3600;

/// America/Bogota as a fixed UTC-5 offset
pub fn bogota() -> FixedOffset {
    FixedOffset::west_opt(BOGOTA_OFFSET_SECONDS).expect("UTC-5 is a valid offset")
}

/// Format as `yyyy-MM-dd h:mm:ssam` in Bogotá time, e.g. `2025-09-08 3:18:00pm`.
pub fn format_bogota_short(instant: &DateTime<Utc>) -> String {
    instant
        .with_timezone(&bogota())
        .format("%Y-%m-%d %-I:%M:%S%P")
        .to_string()
}

/// Noon in Bogotá on the given calendar day.
///
/// Date-only inputs are pinned to midday so that the UTC conversion never
/// moves them to a neighbouring day.
pub fn bogota_noon(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_hms_opt(12, 0, 0).unwrap_or_default();
    bogota()
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Serde adapter for `#[serde(serialize_with = ...)]`
pub fn serialize_bogota<S: Serializer>(
    instant: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_bogota_short(instant))
}
