//! Error types for session operations.

use std::any::Any;

use thiserror::Error;

use crate::model::{RegistryError, VectorError};

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur during session operations.
///
/// Every failing operation returns one of these and leaves session state
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No usable session: never initialized, or already disposed.
    #[error("not initialized")]
    NotInitialized,

    /// The license credential was rejected.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// No model with this identifier is registered.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The identifier is already registered or being loaded.
    #[error("model already loaded: {0}")]
    DuplicateId(String),

    /// A malformed argument (bad vector, empty identifier, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The asset pipeline could not prepare the model.
    #[error("failed to load model {id}: {reason}")]
    LoadFailed { id: String, reason: String },

    /// The load was cancelled, timed out, or overtaken by disposal.
    #[error("load of model {0} was cancelled")]
    LoadCancelled(String),

    /// Unexpected fault in the bridge or an external collaborator.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RegistryError> for SessionError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::DuplicateId(id) => SessionError::DuplicateId(id),
            RegistryError::ModelNotFound(id) => SessionError::ModelNotFound(id),
        }
    }
}

impl From<VectorError> for SessionError {
    fn from(e: VectorError) -> Self {
        SessionError::InvalidArgument(e.to_string())
    }
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_message() {
        assert_eq!(SessionError::NotInitialized.to_string(), "not initialized");
    }

    #[test]
    fn test_from_registry_error() {
        let err: SessionError = RegistryError::ModelNotFound("m1".to_string()).into();
        assert_eq!(err, SessionError::ModelNotFound("m1".to_string()));

        let err: SessionError = RegistryError::DuplicateId("m1".to_string()).into();
        assert_eq!(err, SessionError::DuplicateId("m1".to_string()));
    }

    #[test]
    fn test_from_vector_error() {
        let err: SessionError = VectorError::Arity {
            field: "position",
            actual: 2,
        }
        .into();
        assert!(matches!(err, SessionError::InvalidArgument(_)));
        assert!(err.to_string().contains("position"));
    }

    #[test]
    fn test_load_failed_display() {
        let err = SessionError::LoadFailed {
            id: "dress".to_string(),
            reason: "file not found".to_string(),
        };
        assert_eq!(err.to_string(), "failed to load model dress: file not found");
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "handler panicked");
    }
}
