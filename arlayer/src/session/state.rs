//! Session lifecycle state machine.

use std::fmt;

use super::error::SessionError;

/// Lifecycle state of an AR session.
///
/// ```text
/// Uninitialized ──initialize──▶ Initialized ──start──▶ Active
///                                    ▲                  │
///                                    └──────stop────────┘
/// Initialized | Active ──dispose──▶ Disposed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session exists.
    #[default]
    Uninitialized,
    /// Credential accepted, camera session not running.
    Initialized,
    /// Camera session running.
    Active,
    /// Resources released; every further operation is rejected.
    Disposed,
}

impl SessionState {
    /// Whether model and tracking operations may run.
    pub fn is_initialized(&self) -> bool {
        matches!(self, SessionState::Initialized | SessionState::Active)
    }

    /// Whether the camera session is running.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    /// Transition for `startSession`. Starting an active session is a no-op.
    pub fn start(self) -> Result<SessionState, SessionError> {
        if self.is_initialized() {
            Ok(SessionState::Active)
        } else {
            Err(SessionError::NotInitialized)
        }
    }

    /// Transition for `stopSession`. Always succeeds; only `Active` changes.
    pub fn stop(self) -> SessionState {
        match self {
            SessionState::Active => SessionState::Initialized,
            other => other,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initialized => "initialized",
            SessionState::Active => "active",
            SessionState::Disposed => "disposed",
        };
        f.write_str(name)
    }
}
