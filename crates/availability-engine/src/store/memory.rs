//! In-process backend implementing every collaborator trait.

use tracing::{debug, info, warn};

use super::{
    AvailabilitySlot, AvailabilityStore, BookedLesson, LessonBook, LessonStore, Profile,
    UserDirectory, UserId,
};
use crate::error::{AvailabilityError, Result};
use crate::time::Instant;

/// Vector-backed store. Every write re-checks its uniqueness key, so the
/// invariants hold no matter what the caller checked beforehand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    users: Vec<Profile>,
    slots: Vec<AvailabilitySlot>,
    lessons: Vec<BookedLesson>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user to the directory. Fails with `DuplicateProfile` for a repeated id.
    pub fn register(&mut self, profile: Profile) -> Result<Profile> {
        if self.users.iter().any(|u| u.id == profile.id) {
            warn!(user_id = %profile.id, "rejected duplicate user");
            return Err(AvailabilityError::DuplicateProfile(profile.id));
        }
        info!(user_id = %profile.id, is_tutor = profile.is_tutor, "registered user");
        self.users.push(profile.clone());
        Ok(profile)
    }

    pub fn users(&self) -> &[Profile] {
        &self.users
    }

    pub fn slots(&self) -> &[AvailabilitySlot] {
        &self.slots
    }

    pub fn lessons(&self) -> &[BookedLesson] {
        &self.lessons
    }

    /// Rebuild a store from raw records, enforcing every uniqueness key.
    pub fn from_records(
        users: Vec<Profile>,
        slots: Vec<AvailabilitySlot>,
        lessons: Vec<BookedLesson>,
    ) -> Result<Self> {
        let mut store = MemoryStore::new();
        for user in users {
            store.register(user)?;
        }
        for slot in slots {
            store.insert(&slot.tutor_id, slot.instant)?;
        }
        for lesson in lessons {
            store.book(
                &lesson.tutor_id,
                &lesson.student_id,
                lesson.instant,
                &lesson.lesson_code,
            )?;
        }
        Ok(store)
    }

    /// Split the store back into its raw records.
    pub fn into_records(self) -> (Vec<Profile>, Vec<AvailabilitySlot>, Vec<BookedLesson>) {
        (self.users, self.slots, self.lessons)
    }
}

impl AvailabilityStore for MemoryStore {
    fn insert(&mut self, tutor_id: &str, instant: Instant) -> Result<AvailabilitySlot> {
        if self
            .slots
            .iter()
            .any(|s| s.tutor_id == tutor_id && s.instant == instant)
        {
            warn!(tutor_id, %instant, "rejected duplicate availability");
            return Err(AvailabilityError::DuplicateSlot {
                tutor_id: tutor_id.to_string(),
                instant: instant.to_rfc3339(),
            });
        }

        let slot = AvailabilitySlot {
            tutor_id: tutor_id.to_string(),
            instant,
        };
        self.slots.push(slot.clone());
        Ok(slot)
    }

    fn query_by_instant(&self, instant: Instant) -> Result<Vec<UserId>> {
        let tutors: Vec<UserId> = self
            .slots
            .iter()
            .filter(|s| s.instant == instant)
            .map(|s| s.tutor_id.clone())
            .collect();
        debug!(%instant, found = tutors.len(), "queried availability by instant");
        Ok(tutors)
    }

    fn query_by_tutor_and_range(
        &self,
        tutor_id: &str,
        start: Instant,
        end: Instant,
    ) -> Result<Vec<Instant>> {
        let instants: Vec<Instant> = self
            .slots
            .iter()
            .filter(|s| s.tutor_id == tutor_id && start <= s.instant && s.instant <= end)
            .map(|s| s.instant)
            .collect();
        debug!(tutor_id, %start, %end, found = instants.len(), "queried availability by range");
        Ok(instants)
    }

    fn delete(&mut self, tutor_id: &str, instant: Instant) -> Result<()> {
        let pos = self
            .slots
            .iter()
            .position(|s| s.tutor_id == tutor_id && s.instant == instant)
            .ok_or_else(|| AvailabilityError::SlotNotFound {
                tutor_id: tutor_id.to_string(),
                instant: instant.to_rfc3339(),
            })?;
        self.slots.remove(pos);
        Ok(())
    }
}

impl LessonStore for MemoryStore {
    fn query_by_instant(&self, instant: Instant) -> Result<Vec<BookedLesson>> {
        let lessons: Vec<BookedLesson> = self
            .lessons
            .iter()
            .filter(|l| l.instant == instant)
            .cloned()
            .collect();
        debug!(%instant, found = lessons.len(), "queried lessons by instant");
        Ok(lessons)
    }
}

impl LessonBook for MemoryStore {
    fn book(
        &mut self,
        tutor_id: &str,
        student_id: &str,
        instant: Instant,
        lesson_code: &str,
    ) -> Result<BookedLesson> {
        if self
            .lessons
            .iter()
            .any(|l| l.tutor_id == tutor_id && l.instant == instant)
        {
            warn!(tutor_id, %instant, "rejected duplicate lesson");
            return Err(AvailabilityError::DuplicateLesson {
                tutor_id: tutor_id.to_string(),
                instant: instant.to_rfc3339(),
            });
        }

        let lesson = BookedLesson {
            tutor_id: tutor_id.to_string(),
            student_id: student_id.to_string(),
            instant,
            lesson_code: lesson_code.to_string(),
        };
        self.lessons.push(lesson.clone());
        Ok(lesson)
    }

    fn query_by_participant(&self, user_id: &str, as_tutor: bool) -> Result<Vec<BookedLesson>> {
        let mut lessons: Vec<BookedLesson> = self
            .lessons
            .iter()
            .filter(|l| {
                if as_tutor {
                    l.tutor_id == user_id
                } else {
                    l.student_id == user_id
                }
            })
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.instant);
        Ok(lessons)
    }
}

impl UserDirectory for MemoryStore {
    fn get(&self, id: &str) -> Result<Profile> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AvailabilityError::ProfileNotFound(id.to_string()))
    }
}
