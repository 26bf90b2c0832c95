//! Error types for availability-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Invalid time: {0}")]
    Validation(String),

    #[error("Duplicate availability: {tutor_id} at {instant}")]
    DuplicateSlot { tutor_id: String, instant: String },

    #[error("No availability: {tutor_id} at {instant}")]
    SlotNotFound { tutor_id: String, instant: String },

    #[error("No user: {0}")]
    ProfileNotFound(String),

    #[error("Duplicate lesson: {tutor_id} at {instant}")]
    DuplicateLesson { tutor_id: String, instant: String },

    #[error("Duplicate user: {0}")]
    DuplicateProfile(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl AvailabilityError {
    /// The HTTP status a transport layer should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AvailabilityError::Validation(_)
            | AvailabilityError::DuplicateSlot { .. }
            | AvailabilityError::DuplicateLesson { .. }
            | AvailabilityError::DuplicateProfile(_) => 400,
            AvailabilityError::SlotNotFound { .. } | AvailabilityError::ProfileNotFound(_) => 404,
            AvailabilityError::Store(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
