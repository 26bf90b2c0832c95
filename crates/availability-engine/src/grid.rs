//! Fold one week of availability instants into a per-time-of-day grid.
//!
//! Each row covers one `"HHMM"` time of day and flags the days of the week
//! that have a slot at that time:
//!
//! ```text
//! {"time":"1830","m":"","t":"","w":"available","th":"","f":"available","s":"","su":""}
//! ```
//!
//! Rows come out in the order their time of day was first seen in the input,
//! not sorted. Callers that want chronological rows opt in with [`sorted_by_time`].

use std::collections::HashMap;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::time::{to_local_time, Instant, LocalTime, OffsetMinutes};

/// Day of the week, indexed from Sunday = 0 for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

/// Display labels, indexed by [`DayOfWeek::index`].
const DAY_LABELS: [&str; 7] = ["su", "m", "t", "w", "th", "f", "s"];

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire label of this day (`"su"`, `"m"`, ... `"s"`).
    pub fn label(self) -> &'static str {
        DAY_LABELS[self.index()]
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        DayOfWeek::ALL[weekday.num_days_from_sunday() as usize]
    }
}

/// Whether a day column is marked in a grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DayFlag {
    #[serde(rename = "available")]
    Available,
    #[default]
    #[serde(rename = "")]
    Empty,
}

/// One time of day across the seven days of a week.
///
/// Field names are the stable wire shape consumed by rendering clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityGridRow {
    pub time: String,
    #[serde(default)]
    pub m: DayFlag,
    #[serde(default)]
    pub t: DayFlag,
    #[serde(default)]
    pub w: DayFlag,
    #[serde(default)]
    pub th: DayFlag,
    #[serde(default)]
    pub f: DayFlag,
    #[serde(default)]
    pub s: DayFlag,
    #[serde(default)]
    pub su: DayFlag,
}

impl AvailabilityGridRow {
    /// A row with every day empty.
    pub fn empty(time: impl Into<String>) -> Self {
        AvailabilityGridRow {
            time: time.into(),
            m: DayFlag::Empty,
            t: DayFlag::Empty,
            w: DayFlag::Empty,
            th: DayFlag::Empty,
            f: DayFlag::Empty,
            s: DayFlag::Empty,
            su: DayFlag::Empty,
        }
    }

    pub fn day(&self, day: DayOfWeek) -> DayFlag {
        match day {
            DayOfWeek::Sunday => self.su,
            DayOfWeek::Monday => self.m,
            DayOfWeek::Tuesday => self.t,
            DayOfWeek::Wednesday => self.w,
            DayOfWeek::Thursday => self.th,
            DayOfWeek::Friday => self.f,
            DayOfWeek::Saturday => self.s,
        }
    }

    fn day_mut(&mut self, day: DayOfWeek) -> &mut DayFlag {
        match day {
            DayOfWeek::Sunday => &mut self.su,
            DayOfWeek::Monday => &mut self.m,
            DayOfWeek::Tuesday => &mut self.t,
            DayOfWeek::Wednesday => &mut self.w,
            DayOfWeek::Thursday => &mut self.th,
            DayOfWeek::Friday => &mut self.f,
            DayOfWeek::Saturday => &mut self.s,
        }
    }

    /// Flag `day` as available. Marking the same day twice is a no-op.
    pub fn mark(&mut self, day: DayOfWeek) {
        *self.day_mut(day) = DayFlag::Available;
    }

    /// Days flagged available, Sunday first.
    pub fn available_days(&self) -> Vec<DayOfWeek> {
        DayOfWeek::ALL
            .into_iter()
            .filter(|&d| self.day(d) == DayFlag::Available)
            .collect()
    }
}

/// Zero-padded 24-hour `"HHMM"` key for a local time.
pub fn time_of_day_key(local: LocalTime) -> String {
    local.format("%H%M").to_string()
}

/// Build the weekly grid for a set of slot instants as seen at `offset`.
///
/// The input is expected to be one week's worth of slots (see
/// [`crate::week::WeekWindow`]); instants from different weeks that share a
/// weekday and time of day collapse into the same cell.
///
/// Fails only if an instant shifted by `offset` leaves chrono's range.
pub fn structure<I>(slots: I, offset: OffsetMinutes) -> Result<Vec<AvailabilityGridRow>>
where
    I: IntoIterator<Item = Instant>,
{
    let mut rows: Vec<AvailabilityGridRow> = Vec::new();
    let mut row_for_time: HashMap<String, usize> = HashMap::new();
    let mut seen = 0usize;

    for instant in slots {
        seen += 1;
        let local = to_local_time(instant, offset)?;
        let key = time_of_day_key(local);
        let day = DayOfWeek::from(local.weekday());

        let idx = *row_for_time.entry(key.clone()).or_insert_with(|| {
            rows.push(AvailabilityGridRow::empty(key));
            rows.len() - 1
        });
        rows[idx].mark(day);
    }

    debug!(slots = seen, rows = rows.len(), "structured availability grid");
    Ok(rows)
}

/// Sort grid rows chronologically by time of day.
pub fn sorted_by_time(mut rows: Vec<AvailabilityGridRow>) -> Vec<AvailabilityGridRow> {
    // "HHMM" is fixed-width, so lexical order is chronological.
    rows.sort_by(|a, b| a.time.cmp(&b.time));
    rows
}
