//! Monday-to-Sunday calendar week boundaries.
//!
//! Weeks follow ISO 8601: Monday is the first day and Sunday the last, so a
//! Sunday belongs to the week that began six days earlier.
//!
//! Every time [`parse_local_time`](crate::time::parse_local_time) accepts has
//! a week; only weeks straddling chrono's representable range fail.

use chrono::{Datelike, Days, Duration, NaiveTime};
use serde::Serialize;

use crate::error::{AvailabilityError, Result};
use crate::time::{to_storage_instant, Instant, LocalTime, OffsetMinutes};

fn week_out_of_range(local: LocalTime) -> AvailabilityError {
    AvailabilityError::Validation(format!("week of '{local}' is out of range"))
}

/// Monday 00:00:00 of the week containing `local`.
pub fn start_of_week(local: LocalTime) -> Result<LocalTime> {
    let days_since_monday = u64::from(local.weekday().num_days_from_monday());
    local
        .date()
        .checked_sub_days(Days::new(days_since_monday))
        .map(|monday| monday.and_time(NaiveTime::MIN))
        .ok_or_else(|| week_out_of_range(local))
}

/// Sunday 23:59:59 of the week containing `local`.
pub fn end_of_week(local: LocalTime) -> Result<LocalTime> {
    start_of_week(local)?
        .checked_add_signed(Duration::days(7) - Duration::seconds(1))
        .ok_or_else(|| week_out_of_range(local))
}

/// Inclusive storage-instant bounds of one viewer-local calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekWindow {
    pub start: Instant,
    pub end: Instant,
}

impl WeekWindow {
    /// The week containing `anchor`, as the viewer at `offset` sees it.
    ///
    /// Boundaries are computed on the viewer's wall clock and only then
    /// shifted into storage instants, so the window covers the viewer's own
    /// Monday-to-Sunday rather than the UTC one.
    pub fn containing(anchor: LocalTime, offset: OffsetMinutes) -> Result<Self> {
        Ok(WeekWindow {
            start: to_storage_instant(start_of_week(anchor)?, offset)?,
            end: to_storage_instant(end_of_week(anchor)?, offset)?,
        })
    }

    pub fn contains(&self, instant: Instant) -> bool {
        self.start <= instant && instant <= self.end
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }
}
