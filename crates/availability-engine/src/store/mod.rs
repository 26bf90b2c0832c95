//! Records and collaborator contracts consumed by the engine.
//!
//! The engine never owns persisted data. It reads and writes through the
//! three traits below, and every call can fail with a typed
//! [`AvailabilityError`](crate::error::AvailabilityError) that is passed
//! straight back to the caller.
//!
//! Uniqueness of `(tutor_id, instant)` is the store's job. An engine-level
//! duplicate check before `insert` only saves a round trip; `insert` itself
//! must still reject a pair that already exists.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::time::Instant;

/// Identifier of a user in the directory (tutors and students alike).
pub type UserId = String;

/// A single declared availability time-point for one tutor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub tutor_id: UserId,
    pub instant: Instant,
}

/// Lesson type used when a booking names none.
pub const DEFAULT_LESSON_CODE: &str = "eng";

fn default_lesson_code() -> String {
    DEFAULT_LESSON_CODE.to_string()
}

/// A lesson booked between a tutor and a student at an instant.
///
/// `lesson_code` keys the lesson-type catalog, which lives outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedLesson {
    pub tutor_id: UserId,
    pub student_id: UserId,
    pub instant: Instant,
    #[serde(default = "default_lesson_code")]
    pub lesson_code: String,
}

/// Directory record for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: UserId,
    pub full_name: String,
    #[serde(default)]
    pub is_tutor: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Storage of tutor availability slots.
pub trait AvailabilityStore {
    /// Insert a slot. Fails with `DuplicateSlot` if the pair already exists.
    fn insert(&mut self, tutor_id: &str, instant: Instant) -> Result<AvailabilitySlot>;

    /// Tutor ids with a slot exactly at `instant`.
    fn query_by_instant(&self, instant: Instant) -> Result<Vec<UserId>>;

    /// Slot instants for one tutor within `[start, end]`, both inclusive.
    fn query_by_tutor_and_range(
        &self,
        tutor_id: &str,
        start: Instant,
        end: Instant,
    ) -> Result<Vec<Instant>>;

    /// Remove a slot. Fails with `SlotNotFound` if it is absent.
    fn delete(&mut self, tutor_id: &str, instant: Instant) -> Result<()>;
}

/// Read access to booked lessons.
pub trait LessonStore {
    fn query_by_instant(&self, instant: Instant) -> Result<Vec<BookedLesson>>;
}

/// Write access to lessons, for backends that own them.
pub trait LessonBook: LessonStore {
    /// Book a lesson. Fails with `DuplicateLesson` if the tutor is already
    /// booked at that instant.
    fn book(
        &mut self,
        tutor_id: &str,
        student_id: &str,
        instant: Instant,
        lesson_code: &str,
    ) -> Result<BookedLesson>;

    /// Lessons where `user_id` is the tutor (`as_tutor`) or the student,
    /// in ascending time order.
    fn query_by_participant(&self, user_id: &str, as_tutor: bool) -> Result<Vec<BookedLesson>>;
}

/// Lookup of user profiles by id.
pub trait UserDirectory {
    /// Fails with `ProfileNotFound` if no user has this id.
    fn get(&self, id: &str) -> Result<Profile>;
}
