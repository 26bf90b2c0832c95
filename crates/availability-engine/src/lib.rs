//! # availability-engine
//!
//! Availability resolution for a tutoring platform.
//!
//! Tutors publish discrete weekly time-points; the engine answers two kinds
//! of question about them at query time: what a tutor's week looks like to a
//! given viewer, and which tutors are free at a given instant.
//!
//! ## Modules
//!
//! - [`time`] — Viewer-local wall-clock time ↔ canonical storage instant
//! - [`week`] — Monday-to-Sunday week boundaries and week windows
//! - [`grid`] — Fold a week of slots into per-time-of-day rows
//! - [`resolver`] — Tutors with a slot and no booking at an instant
//! - [`store`] — Records, collaborator traits, in-memory and JSON backends
//! - [`service`] — Validated operations for the transport layer
//! - [`error`] — Error types

pub mod error;
pub mod grid;
pub mod resolver;
pub mod service;
pub mod store;
pub mod time;
pub mod week;

pub use error::{AvailabilityError, Result};
pub use grid::{sorted_by_time, structure, AvailabilityGridRow, DayFlag, DayOfWeek};
pub use resolver::{available_tutors, hydrate, hydrate_best_effort};
pub use service::{AvailabilityService, LessonDetail, WeekGrid};
pub use store::{
    AvailabilitySlot, AvailabilityStore, BookedLesson, JsonStore, LessonBook, LessonStore,
    MemoryStore, Profile, UserDirectory, UserId, DEFAULT_LESSON_CODE,
};
pub use time::{
    normalize, parse_instant, parse_local_time, to_local_time, to_storage_instant, Instant,
    LocalTime, OffsetMinutes,
};
pub use week::{end_of_week, start_of_week, WeekWindow};
