use thiserror::Error;

use crate::mirror_framework::FrameworkError;

/// Errors that can occur during reservation operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReservationError {
    #[error("Reservation validation error: {0}")]
    Validation(String),
    #[error("Failed to create reservation: {0}")]
    Insert(String),
    #[error("Failed to update status: {0}")]
    Update(String),
    #[error("Failed to load reservations: {0}")]
    Fetch(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ReservationError {
    pub(crate) fn on_insert(error: FrameworkError) -> Self {
        match error {
            FrameworkError::Invalid(reason) => Self::Validation(reason),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => Self::ActorCommunicationError(error.to_string()),
            other => Self::Insert(other.to_string()),
        }
    }

    pub(crate) fn on_update(error: FrameworkError) -> Self {
        match error {
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => Self::ActorCommunicationError(error.to_string()),
            other => Self::Update(other.to_string()),
        }
    }

    pub(crate) fn on_fetch(error: FrameworkError) -> Self {
        match error {
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => Self::ActorCommunicationError(error.to_string()),
            other => Self::Fetch(other.to_string()),
        }
    }
}
