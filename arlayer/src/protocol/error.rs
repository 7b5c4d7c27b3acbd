//! Dispatch errors and their wire classification.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SessionError;

/// Machine-readable error class carried in a failure envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NotInitialized,
    InvalidCredential,
    ModelNotFound,
    DuplicateId,
    InvalidArgument,
    MethodNotImplemented,
    LoadFailed,
    LoadCancelled,
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotInitialized => "notInitialized",
            ErrorKind::InvalidCredential => "invalidCredential",
            ErrorKind::ModelNotFound => "modelNotFound",
            ErrorKind::DuplicateId => "duplicateId",
            ErrorKind::InvalidArgument => "invalidArgument",
            ErrorKind::MethodNotImplemented => "methodNotImplemented",
            ErrorKind::LoadFailed => "loadFailed",
            ErrorKind::LoadCancelled => "loadCancelled",
            ErrorKind::InternalError => "internalError",
        };
        f.write_str(name)
    }
}

/// Errors raised while turning a request into a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The method name is not known on its channel.
    #[error("method not implemented: {channel}.{method}")]
    MethodNotImplemented { channel: String, method: String },

    /// An argument was missing or had the wrong shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The session layer rejected the operation.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A fault outside the session layer (panic, serialization).
    #[error("internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    /// Wire classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::MethodNotImplemented { .. } => ErrorKind::MethodNotImplemented,
            DispatchError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            DispatchError::Internal(_) => ErrorKind::InternalError,
            DispatchError::Session(e) => match e {
                SessionError::NotInitialized => ErrorKind::NotInitialized,
                SessionError::InvalidCredential(_) => ErrorKind::InvalidCredential,
                SessionError::ModelNotFound(_) => ErrorKind::ModelNotFound,
                SessionError::DuplicateId(_) => ErrorKind::DuplicateId,
                SessionError::InvalidArgument(_) => ErrorKind::InvalidArgument,
                SessionError::LoadFailed { .. } => ErrorKind::LoadFailed,
                SessionError::LoadCancelled(_) => ErrorKind::LoadCancelled,
                SessionError::Internal(_) => ErrorKind::InternalError,
            },
        }
    }
}
