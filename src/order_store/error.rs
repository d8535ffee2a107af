use thiserror::Error;

use crate::mirror_framework::FrameworkError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Failed to create order: {0}")]
    Insert(String),
    #[error("Failed to update status: {0}")]
    Update(String),
    #[error("Failed to load orders: {0}")]
    Fetch(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    pub(crate) fn on_insert(error: FrameworkError) -> Self {
        match error {
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
