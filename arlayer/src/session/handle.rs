//! Handle to an in-flight model load.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::error::{SessionError, SessionResult};
use crate::model::Model;

/// Handle to a model load running in the background.
///
/// Dropping the handle does not cancel the load; the model is still
/// committed when preparation finishes.
#[derive(Debug)]
pub struct LoadHandle {
    model_id: String,
    result: oneshot::Receiver<SessionResult<Model>>,
    cancel: CancellationToken,
}

impl LoadHandle {
    pub(crate) fn new(
        model_id: String,
        result: oneshot::Receiver<SessionResult<Model>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            model_id,
            result,
            cancel,
        }
    }

    /// Identifier of the model being loaded.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Request cancellation. The model will not be committed unless the
    /// commit already happened.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the load to finish.
    pub async fn wait(self) -> SessionResult<Model> {
        let LoadHandle {
            model_id, result, ..
        } = self;
        match result.await {
            Ok(outcome) => outcome,
            // Task dropped without reporting, i.e. the runtime shut down.
            Err(_) => Err(SessionError::LoadCancelled(model_id)),
        }
    }

    /// Wait for the load, cancelling it once `timeout` elapses.
    ///
    /// After a timeout the load task is still awaited, so the returned
    /// result always matches what the registry holds.
    pub async fn wait_timeout(self, timeout: Option<Duration>) -> SessionResult<Model> {
        let Some(timeout) = timeout else {
            return self.wait().await;
        };

        let LoadHandle {
            model_id,
            mut result,
            cancel,
        } = self;

        let outcome = match tokio::time::timeout(timeout, &mut result).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    model_id = %model_id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Model load timed out, cancelling"
                );
                cancel.cancel();
                result.await
            }
        };

        outcome.unwrap_or(Err(SessionError::LoadCancelled(model_id)))
    }
}
