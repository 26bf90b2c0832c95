//! Point-in-time resolution of which tutors are free.
//!
//! A tutor is free at an instant when they declared a slot exactly there and
//! no lesson is already booked with them at that instant. Each call is an
//! independent pair of queries; nothing is cached between calls.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{AvailabilityError, Result};
use crate::store::{AvailabilityStore, LessonStore, Profile, UserDirectory, UserId};
use crate::time::Instant;

/// Tutor ids with a slot at `instant` and no lesson booked then.
///
/// Order follows the availability store's answer. Duplicates are not removed
/// here; the store's uniqueness invariant rules them out.
pub fn available_tutors<A, L>(instant: Instant, slots: &A, lessons: &L) -> Result<Vec<UserId>>
where
    A: AvailabilityStore + ?Sized,
    L: LessonStore + ?Sized,
{
    let declared = slots.query_by_instant(instant)?;
    let booked: HashSet<UserId> = lessons
        .query_by_instant(instant)?
        .into_iter()
        .map(|lesson| lesson.tutor_id)
        .collect();

    let free: Vec<UserId> = declared
        .into_iter()
        .filter(|tutor| !booked.contains(tutor))
        .collect();

    debug!(%instant, booked = booked.len(), free = free.len(), "resolved available tutors");
    Ok(free)
}

/// Look up the profile for each id, in order.
///
/// Stops at the first id the directory cannot resolve and returns its
/// `ProfileNotFound`; no partial list is returned.
pub fn hydrate<D>(ids: &[UserId], directory: &D) -> Result<Vec<Profile>>
where
    D: UserDirectory + ?Sized,
{
    ids.iter().map(|id| directory.get(id)).collect()
}

/// Best-effort variant of [`hydrate`] that skips unresolvable ids.
///
/// Only for callers that explicitly accept an incomplete list; other
/// collaborator failures still propagate.
pub fn hydrate_best_effort<D>(ids: &[UserId], directory: &D) -> Result<Vec<Profile>>
where
    D: UserDirectory + ?Sized,
{
    let mut profiles = Vec::with_capacity(ids.len());
    for id in ids {
        match directory.get(id) {
            Ok(profile) => profiles.push(profile),
            Err(AvailabilityError::ProfileNotFound(missing)) => {
                debug!(user_id = %missing, "skipped unresolvable tutor");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BookedLesson;
    use chrono::{TimeZone, Utc};

    /// Availability stub answering a fixed tutor list for every instant.
    struct FixedSlots(Vec<&'static str>);

    impl AvailabilityStore for FixedSlots {
        fn insert(&mut self, _: &str, _: Instant) -> Result<crate::store::AvailabilitySlot> {
            Err(AvailabilityError::Store("read-only".into()))
        }
        fn query_by_instant(&self, _: Instant) -> Result<Vec<UserId>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
        fn query_by_tutor_and_range(&self, _: &str, _: Instant, _: Instant) -> Result<Vec<Instant>> {
            Ok(vec![])
        }
        fn delete(&mut self, _: &str, _: Instant) -> Result<()> {
            Err(AvailabilityError::Store("read-only".into()))
        }
    }

    struct FixedLessons(Vec<&'static str>);

    impl LessonStore for FixedLessons {
        fn query_by_instant(&self, instant: Instant) -> Result<Vec<BookedLesson>> {
            Ok(self
                .0
                .iter()
                .map(|t| BookedLesson {
                    tutor_id: t.to_string(),
                    student_id: "student".into(),
                    instant,
                    lesson_code: "eng".into(),
                })
                .collect())
        }
    }

    struct FailingLessons;

    impl LessonStore for FailingLessons {
        fn query_by_instant(&self, _: Instant) -> Result<Vec<BookedLesson>> {
            Err(AvailabilityError::Store("timeout".into()))
        }
    }

    struct Directory(Vec<&'static str>);

    impl UserDirectory for Directory {
        fn get(&self, id: &str) -> Result<Profile> {
            self.0
                .iter()
                .find(|known| **known == id)
                .map(|known| Profile {
                    id: known.to_string(),
                    full_name: known.to_string(),
                    is_tutor: true,
                    bio: None,
                })
                .ok_or_else(|| AvailabilityError::ProfileNotFound(id.to_string()))
        }
    }

    fn t() -> Instant {
        Utc.with_ymd_and_hms(2024, 1, 3, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_booked_tutor_is_excluded() {
        let free = available_tutors(t(), &FixedSlots(vec!["A", "B"]), &FixedLessons(vec!["A"])).unwrap();
        assert_eq!(free, vec!["B".to_string()]);
    }

    #[test]
    fn test_order_follows_availability_store() {
        let free = available_tutors(
            t(),
            &FixedSlots(vec!["C", "A", "D", "B"]),
            &FixedLessons(vec!["D"]),
        )
        .unwrap();
        assert_eq!(free, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_booking_without_slot_changes_nothing() {
        let free = available_tutors(t(), &FixedSlots(vec!["A"]), &FixedLessons(vec!["Z"])).unwrap();
        assert_eq!(free, vec!["A"]);
    }

    #[test]
    fn test_lesson_store_failure_propagates() {
        let err = available_tutors(t(), &FixedSlots(vec!["A"]), &FailingLessons).unwrap_err();
        assert!(matches!(err, AvailabilityError::Store(_)));
    }

    #[test]
    fn test_hydrate_fails_on_first_missing_profile() {
        let ids: Vec<UserId> = vec!["A".into(), "ghost".into(), "B".into()];
        let err = hydrate(&ids, &Directory(vec!["A", "B"])).unwrap_err();
        assert!(matches!(err, AvailabilityError::ProfileNotFound(ref id) if id == "ghost"));
    }

    #[test]
    fn test_hydrate_best_effort_skips_missing_profile() {
        let ids: Vec<UserId> = vec!["A".into(), "ghost".into(), "B".into()];
        let profiles = hydrate_best_effort(&ids, &Directory(vec!["A", "B"])).unwrap();
        let names: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }
}
