//! Conversion between viewer-local wall-clock times and storage instants.
//!
//! Every stored slot is keyed by a canonical UTC instant. Viewers submit and
//! read wall-clock times together with an explicit minute offset; nothing in
//! this module consults the host's timezone.
//!
//! The offset follows the "minutes to add to local time to reach the instant"
//! convention, so zones west of UTC carry positive offsets (New York in winter
//! is `+300`) and zones east of UTC carry negative ones (Tokyo is `-540`).

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};

/// A canonical point in time, used as the storage and query key.
pub type Instant = DateTime<Utc>;

/// A wall-clock time as seen by a viewer, with no zone attached.
pub type LocalTime = NaiveDateTime;

/// Signed minutes to add to a local wall-clock time to obtain its instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OffsetMinutes(pub i32);

impl OffsetMinutes {
    pub const UTC: OffsetMinutes = OffsetMinutes(0);

    pub fn minutes(self) -> i32 {
        self.0
    }

    fn as_duration(self) -> Duration {
        Duration::minutes(i64::from(self.0))
    }

    /// Resolve the fixed offset an IANA timezone has at a local wall-clock time.
    ///
    /// The result is a single fixed offset: slots submitted under it do not
    /// follow later DST transitions.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::Validation`] for an unknown timezone name or
    /// for a wall-clock time that does not exist in that zone (a spring-forward gap).
    pub fn for_timezone(timezone: &str, at: LocalTime) -> Result<Self> {
        let tz = timezone
            .parse::<Tz>()
            .map_err(|_| AvailabilityError::Validation(format!("unknown timezone '{timezone}'")))?;

        // Fall-back ambiguity resolves to the earlier (pre-transition) offset.
        let local = tz.from_local_datetime(&at).earliest().ok_or_else(|| {
            AvailabilityError::Validation(format!("'{at}' does not exist in {timezone}"))
        })?;

        let east_of_utc_secs = local.offset().fix().local_minus_utc();
        Ok(OffsetMinutes(-east_of_utc_secs / 60))
    }
}

impl From<i32> for OffsetMinutes {
    fn from(minutes: i32) -> Self {
        OffsetMinutes(minutes)
    }
}

/// Years a submitted local time may fall in.
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a wall-clock time such as `2024-01-03T18:30` or `2024-01-03 18:30:00`.
///
/// A bare date (`2024-01-03`) is read as midnight. Inputs carrying a zone
/// designator (`Z`, `+02:00`) are rejected: a local time is zone-less by definition.
///
/// # Errors
///
/// Returns [`AvailabilityError::Validation`] if the input is not a valid
/// calendar date/time in one of the accepted layouts, or its year lies
/// outside 0001..=9999.
pub fn parse_local_time(s: &str) -> Result<LocalTime> {
    let trimmed = s.trim();

    let local = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| {
            AvailabilityError::Validation(format!(
                "'{s}': expected a local time like 2024-01-03T18:30"
            ))
        })?;

    if !SUPPORTED_YEARS.contains(&local.year()) {
        return Err(AvailabilityError::Validation(format!(
            "'{s}': year must be between 1 and 9999"
        )));
    }
    Ok(local)
}

/// Parse an RFC 3339 instant such as `2024-01-03T18:00:00Z`.
pub fn parse_instant(s: &str) -> Result<Instant> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AvailabilityError::Validation(format!("'{s}': {e}")))
}

fn out_of_range(what: impl std::fmt::Display, offset: OffsetMinutes) -> AvailabilityError {
    AvailabilityError::Validation(format!(
        "'{what}' shifted by {} minutes is out of range",
        offset.minutes()
    ))
}

/// Shift a local wall-clock time by `offset` to get its storage instant.
///
/// # Errors
///
/// Returns [`AvailabilityError::Validation`] if the shift leaves the
/// representable date range.
pub fn to_storage_instant(local: LocalTime, offset: OffsetMinutes) -> Result<Instant> {
    local
        .checked_add_signed(offset.as_duration())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| out_of_range(local, offset))
}

/// Inverse of [`to_storage_instant`].
pub fn to_local_time(instant: Instant, offset: OffsetMinutes) -> Result<LocalTime> {
    instant
        .naive_utc()
        .checked_sub_signed(offset.as_duration())
        .ok_or_else(|| out_of_range(instant, offset))
}

/// Parse a local time string and normalize it to its storage instant.
///
/// Validation happens before anything else, so a malformed input never reaches a store.
pub fn normalize(local: &str, offset: OffsetMinutes) -> Result<Instant> {
    parse_local_time(local).and_then(|lt| to_storage_instant(lt, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> LocalTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_local_accepts_common_layouts() {
        let expected = local(2024, 1, 3, 18, 30);
        assert_eq!(parse_local_time("2024-01-03T18:30").unwrap(), expected);
        assert_eq!(parse_local_time("2024-01-03T18:30:00").unwrap(), expected);
        assert_eq!(parse_local_time("2024-01-03 18:30").unwrap(), expected);
        assert_eq!(parse_local_time(" 2024-01-03 18:30:00 ").unwrap(), expected);
    }

    #[test]
    fn test_parse_local_bare_date_is_midnight() {
        assert_eq!(
            parse_local_time("2024-01-03").unwrap(),
            local(2024, 1, 3, 0, 0)
        );
    }

    #[test]
    fn test_parse_local_rejects_garbage_and_impossible_dates() {
        for bad in ["", "tomorrow", "2024-02-30T10:00", "2024-01-03T25:00", "2024-01-03T18:00:00Z"] {
            let err = parse_local_time(bad).unwrap_err();
            assert!(
                matches!(err, AvailabilityError::Validation(_)),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_instant_normalizes_to_utc() {
        let instant = parse_instant("2024-01-03T13:00:00-05:00").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 3, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_instant_rejects_naive() {
        assert!(parse_instant("2024-01-03T18:00:00").is_err());
    }

    #[test]
    fn test_storage_instant_adds_offset() {
        // 13:00 in New York (winter, +300) is 18:00 UTC
        let instant = to_storage_instant(local(2024, 1, 3, 13, 0), OffsetMinutes(300)).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 3, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_storage_instant_crosses_midnight() {
        // 08:00 in Tokyo (-540) is 23:00 UTC the previous day
        let instant = to_storage_instant(local(2024, 1, 3, 8, 0), OffsetMinutes(-540)).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 2, 23, 0, 0).unwrap());
    }

    #[test]
    fn test_local_time_subtracts_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 3, 18, 0, 0).unwrap();
        assert_eq!(
            to_local_time(instant, OffsetMinutes(300)).unwrap(),
            local(2024, 1, 3, 13, 0)
        );
    }

    #[test]
    fn test_parse_local_rejects_years_outside_calendar_range() {
        for bad in ["-262143-01-01T00:30", "0000-06-01T12:00", "-0001-12-31", "10000-01-01"] {
            let err = parse_local_time(bad).unwrap_err();
            assert!(
                matches!(err, AvailabilityError::Validation(_)),
                "{bad:?} gave {err:?}"
            );
        }
        assert!(parse_local_time("0001-01-01T00:00").is_ok());
        assert!(parse_local_time("9999-12-31T23:59:59").is_ok());
    }

    #[test]
    fn test_conversion_overflow_is_validation_error() {
        let err = to_storage_instant(NaiveDateTime::MAX, OffsetMinutes(60)).unwrap_err();
        assert!(matches!(err, AvailabilityError::Validation(_)), "got: {err:?}");

        let earliest = Utc.from_utc_datetime(&NaiveDateTime::MIN);
        let err = to_local_time(earliest, OffsetMinutes(60)).unwrap_err();
        assert!(matches!(err, AvailabilityError::Validation(_)), "got: {err:?}");
    }

    #[test]
    fn test_normalize_at_bottom_of_range() {
        // 0001-01-01 00:30 an hour east of UTC lands in year 0, which is still representable
        let instant = normalize("0001-01-01T00:30", OffsetMinutes(-60)).unwrap();
        assert_eq!(instant.naive_utc(), local(0, 12, 31, 23, 30));
        assert!(matches!(
            normalize("-262143-01-01T00:30", OffsetMinutes(-60)),
            Err(AvailabilityError::Validation(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_before_conversion() {
        assert!(matches!(
            normalize("not a time", OffsetMinutes::UTC),
            Err(AvailabilityError::Validation(_))
        ));
    }

    #[test]
    fn test_offset_for_timezone_winter_and_summer() {
        let winter = OffsetMinutes::for_timezone("America/New_York", local(2024, 1, 3, 12, 0)).unwrap();
        assert_eq!(winter, OffsetMinutes(300));
        let summer = OffsetMinutes::for_timezone("America/New_York", local(2024, 7, 3, 12, 0)).unwrap();
        assert_eq!(summer, OffsetMinutes(240));
        let tokyo = OffsetMinutes::for_timezone("Asia/Tokyo", local(2024, 7, 3, 12, 0)).unwrap();
        assert_eq!(tokyo, OffsetMinutes(-540));
    }

    #[test]
    fn test_offset_for_timezone_rejects_unknown_zone() {
        let err = OffsetMinutes::for_timezone("Invalid/Zone", local(2024, 1, 3, 12, 0)).unwrap_err();
        assert!(err.to_string().contains("unknown timezone"), "got: {err}");
    }

    #[test]
    fn test_offset_for_timezone_rejects_spring_forward_gap() {
        // 2024-03-10 02:30 does not exist in New York
        let result = OffsetMinutes::for_timezone("America/New_York", local(2024, 3, 10, 2, 30));
        assert!(matches!(result, Err(AvailabilityError::Validation(_))));
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            secs in 0i64..4_102_444_800, // 1970..2100
            offset in -14 * 60i32..=14 * 60,
        ) {
            let t = DateTime::from_timestamp(secs, 0).unwrap().naive_utc();
            let o = OffsetMinutes(offset);
            let instant = to_storage_instant(t, o).unwrap();
            prop_assert_eq!(to_local_time(instant, o).unwrap(), t);
        }
    }
}
