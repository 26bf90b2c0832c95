//! Operations exposed to the surrounding service (HTTP handlers, the CLI).
//!
//! Inputs arrive as strings straight from the transport and are validated
//! before any store is touched. Results are plain serializable values.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AvailabilityError, Result};
use crate::grid::{structure, AvailabilityGridRow};
use crate::resolver::{available_tutors, hydrate};
use crate::store::{
    AvailabilitySlot, AvailabilityStore, BookedLesson, LessonBook, LessonStore, Profile,
    UserDirectory, DEFAULT_LESSON_CODE,
};
use crate::time::{normalize, parse_instant, parse_local_time, Instant, OffsetMinutes};
use crate::week::WeekWindow;

/// One tutor's weekly grid as seen at a viewer offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekGrid {
    pub rows: Vec<AvailabilityGridRow>,
    pub week_start: Instant,
    pub week_end: Instant,
}

/// A lesson with both participants' profiles resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDetail {
    pub tutor: Profile,
    pub student: Profile,
    pub instant: Instant,
    pub lesson_code: String,
}

/// Availability operations over a backend that provides every collaborator.
pub struct AvailabilityService<'a, S: ?Sized> {
    backend: &'a mut S,
}

impl<'a, S> AvailabilityService<'a, S>
where
    S: AvailabilityStore + LessonStore + UserDirectory + ?Sized,
{
    pub fn new(backend: &'a mut S) -> Self {
        AvailabilityService { backend }
    }

    /// Publish a slot for `tutor_id` at a viewer-local time.
    ///
    /// The duplicate check here is advisory. The store's own insert is what
    /// guarantees uniqueness under concurrent writers.
    pub fn add_slot(
        &mut self,
        tutor_id: &str,
        local_time: &str,
        offset: OffsetMinutes,
    ) -> Result<AvailabilitySlot> {
        let instant = normalize(local_time, offset)?;

        let existing = AvailabilityStore::query_by_instant(&*self.backend, instant)?;
        if existing.iter().any(|t| t == tutor_id) {
            warn!(tutor_id, %instant, "availability already declared");
            return Err(AvailabilityError::DuplicateSlot {
                tutor_id: tutor_id.to_string(),
                instant: instant.to_rfc3339(),
            });
        }

        let slot = self.backend.insert(tutor_id, instant)?;
        info!(tutor_id, %instant, "added availability");
        Ok(slot)
    }

    /// Withdraw a previously published slot.
    ///
    /// Fails with `SlotNotFound` if there is nothing to remove, including
    /// when another caller removed it first.
    pub fn remove_slot(
        &mut self,
        tutor_id: &str,
        local_time: &str,
        offset: OffsetMinutes,
    ) -> Result<()> {
        let instant = normalize(local_time, offset)?;
        self.backend.delete(tutor_id, instant)?;
        info!(tutor_id, %instant, "removed availability");
        Ok(())
    }

    /// Weekly grid of `tutor_id`'s slots for the week containing `anchor_local`.
    pub fn get_week_grid(
        &self,
        tutor_id: &str,
        anchor_local: &str,
        offset: OffsetMinutes,
    ) -> Result<WeekGrid> {
        let anchor = parse_local_time(anchor_local)?;
        let window = WeekWindow::containing(anchor, offset)?;

        let instants = self
            .backend
            .query_by_tutor_and_range(tutor_id, window.start, window.end)?;
        let rows = structure(instants, offset)?;

        debug!(tutor_id, week_start = %window.start, rows = rows.len(), "built week grid");
        Ok(WeekGrid {
            rows,
            week_start: window.start,
            week_end: window.end,
        })
    }

    /// Profiles of the tutors free at an RFC 3339 `instant`.
    pub fn get_available_tutors(&self, instant: &str) -> Result<Vec<Profile>> {
        let instant = parse_instant(instant)?;
        let ids = available_tutors(instant, &*self.backend, &*self.backend)?;
        hydrate(&ids, &*self.backend)
    }
}

impl<'a, S> AvailabilityService<'a, S>
where
    S: AvailabilityStore + LessonBook + UserDirectory + ?Sized,
{
    /// Book a lesson at an RFC 3339 `instant` between two known users.
    ///
    /// Without a `lesson_code` the lesson is booked as [`DEFAULT_LESSON_CODE`].
    pub fn book_lesson(
        &mut self,
        tutor_id: &str,
        student_id: &str,
        instant: &str,
        lesson_code: Option<&str>,
    ) -> Result<BookedLesson> {
        let instant = parse_instant(instant)?;
        self.backend.get(tutor_id)?;
        self.backend.get(student_id)?;

        let code = lesson_code.unwrap_or(DEFAULT_LESSON_CODE);
        let lesson = self.backend.book(tutor_id, student_id, instant, code)?;
        info!(tutor_id, student_id, %instant, lesson_code = code, "booked lesson");
        Ok(lesson)
    }

    /// A user's lessons in ascending time order, as tutor or as student
    /// depending on their profile.
    pub fn lessons_for(&self, user_id: &str) -> Result<Vec<LessonDetail>> {
        let user = self.backend.get(user_id)?;
        self.backend
            .query_by_participant(user_id, user.is_tutor)?
            .into_iter()
            .map(|lesson| -> Result<LessonDetail> {
                Ok(LessonDetail {
                    tutor: self.backend.get(&lesson.tutor_id)?,
                    student: self.backend.get(&lesson.student_id)?,
                    instant: lesson.instant,
                    lesson_code: lesson.lesson_code,
                })
            })
            .collect()
    }
}
