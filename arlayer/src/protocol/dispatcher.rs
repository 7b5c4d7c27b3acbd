//! The command dispatcher.
//!
//! The single entry point for host requests. Every request yields exactly
//! one [`Response`]: parse failures, session errors, and panics inside a
//! handler are all folded into the failure envelope.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::runtime::Handle;
use tracing::{debug, error, info};

use super::command::Command;
use super::database::{DatabaseCommand, PlaceholderTargetDatabase, TargetDatabase};
use super::envelope::{Channel, Request, Response};
use super::error::{DispatchError, ErrorKind};
use crate::config::BridgeConfig;
use crate::session::{
    panic_message, SessionError, SessionManager, SessionServices, SessionState,
};

/// Routes requests to the current session and the target database.
///
/// Lifecycle commands (`initialize`, `dispose`) are serialized with each
/// other; everything else runs concurrently against the session's own
/// lock.
pub struct Dispatcher {
    config: BridgeConfig,
    services: SessionServices,
    database: Arc<dyn TargetDatabase>,
    session: RwLock<Option<Arc<SessionManager>>>,
    lifecycle: tokio::sync::Mutex<()>,
    body_tracking: AtomicBool,
}

impl Dispatcher {
    /// Create a dispatcher whose collaborators follow `config`.
    pub fn new(config: BridgeConfig, runtime: Handle) -> Self {
        let services = SessionServices::from_config(&config.loader, &config.tracking, runtime);
        Self::with_services(config, services)
    }

    /// Create a dispatcher with explicit collaborators.
    pub fn with_services(config: BridgeConfig, services: SessionServices) -> Self {
        let database = Arc::new(PlaceholderTargetDatabase::new(config.database_name.clone()));
        Self {
            config,
            services,
            database,
            session: RwLock::new(None),
            lifecycle: tokio::sync::Mutex::new(()),
            body_tracking: AtomicBool::new(false),
        }
    }

    /// Replace the target database backend.
    pub fn with_database(mut self, database: Arc<dyn TargetDatabase>) -> Self {
        self.database = database;
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The current session, if one is initialized.
    pub fn session(&self) -> Option<Arc<SessionManager>> {
        self.session.read().clone()
    }

    /// State of the current session, `Uninitialized` if there is none.
    pub fn session_state(&self) -> SessionState {
        self.session()
            .map(|session| session.state())
            .unwrap_or(SessionState::Uninitialized)
    }

    /// Last value passed to `enableBodyTracking`.
    pub fn body_tracking_enabled(&self) -> bool {
        self.body_tracking.load(Ordering::SeqCst)
    }

    /// Handle one request.
    pub async fn dispatch(&self, request: Request) -> Response {
        let channel = request.channel;
        let method = request.method.clone();

        match AssertUnwindSafe(self.route(request)).catch_unwind().await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                let kind = e.kind();
                if kind == ErrorKind::InternalError {
                    error!(%channel, %method, error = %e, "Request failed");
                } else {
                    debug!(%channel, %method, error_kind = %kind, error = %e, "Request rejected");
                }
                Response::from(e)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(%channel, %method, panic = %message, "Handler panicked");
                Response::from(DispatchError::Internal(message))
            }
        }
    }

    /// Shorthand for a session-channel request.
    pub async fn call(&self, method: &str, arguments: Map<String, Value>) -> Response {
        self.dispatch(Request {
            channel: Channel::Session,
            method: method.to_string(),
            arguments,
        })
        .await
    }

    /// Dispose the current session, if any.
    pub async fn dispose(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        let current = self.session.write().take();
        match current {
            Some(session) => session.dispose().await,
            None => debug!("Dispose without a session ignored"),
        }
    }

    async fn route(&self, request: Request) -> Result<Response, DispatchError> {
        match request.channel {
            Channel::Session => {
                let info = Command::resolve(&request.method)?;
                if Command::requires_session(info) {
                    self.require_session()?;
                }
                let command = Command::from_arguments(info, &request.arguments)?;
                self.execute(command).await
            }
            Channel::Database => {
                let command = DatabaseCommand::parse(&request.method, &request.arguments)?;
                self.execute_database(command)
            }
        }
    }

    fn require_session(&self) -> Result<Arc<SessionManager>, DispatchError> {
        self.session()
            .ok_or(DispatchError::Session(SessionError::NotInitialized))
    }

    /// Run a parsed session command.
    pub async fn execute(&self, command: Command) -> Result<Response, DispatchError> {
        if command.is_mutation() {
            debug!(method = command.name(), "Executing command");
        }

        match command {
            Command::Initialize { credential } => {
                self.initialize(&credential).await?;
                Ok(Response::ok())
            }
            Command::StartSession => {
                self.require_session()?.start_session()?;
                Ok(Response::ok())
            }
            Command::StopSession => {
                if let Some(session) = self.session() {
                    session.stop_session()?;
                }
                Ok(Response::ok())
            }
            Command::LoadModel(descriptor) => {
                let handle = self.require_session()?.load_model(descriptor)?;
                handle.wait_timeout(self.config.loader.load_timeout).await?;
                Ok(Response::ok())
            }
            Command::SetVisibility { id, visible } => {
                self.require_session()?.set_visibility(&id, visible)?;
                Ok(Response::ok())
            }
            Command::UpdateTransform { id, update } => {
                self.require_session()?.update_transform(&id, &update)?;
                Ok(Response::ok())
            }
            Command::RemoveModel { id } => {
                self.require_session()?.remove_model(&id)?;
                Ok(Response::ok())
            }
            Command::ListModels => {
                let models = self.require_session()?.models()?;
                let models = serde_json::to_value(models)
                    .map_err(|e| DispatchError::Internal(e.to_string()))?;
                Ok(Response::ok().with("models", models))
            }
            Command::GetTrackingState => {
                let report = self.require_session()?.tracking_state()?;
                Response::from_body(&report)
            }
            Command::GetBodyTrackingData => {
                let report = self.require_session()?.body_tracking_data()?;
                Response::from_body(&report)
            }
            Command::EnableBodyTracking { enable } => {
                self.body_tracking.store(enable, Ordering::SeqCst);
                self.services.tracker.set_body_tracking(enable);
                info!(enabled = enable, "Body tracking preference set");
                Ok(Response::ok().with("bodyTrackingEnabled", enable))
            }
            Command::Dispose => {
                self.dispose().await;
                Ok(Response::ok())
            }
        }
    }

    /// Validate first; only a valid credential replaces the current session.
    async fn initialize(&self, credential: &str) -> Result<(), DispatchError> {
        let _lifecycle = self.lifecycle.lock().await;

        let manager =
            SessionManager::initialize(credential, &self.config.session, self.services.clone())?;

        let previous = self.session.write().take();
        if let Some(previous) = previous {
            info!("Replacing existing AR session");
            previous.dispose().await;
        }

        *self.session.write() = Some(Arc::new(manager));
        Ok(())
    }

    fn execute_database(&self, command: DatabaseCommand) -> Result<Response, DispatchError> {
        let db = &self.database;

        let response = match command {
            DatabaseCommand::LoadDatabase { name } => {
                db.load(name.as_deref().unwrap_or(&self.config.database_name));
                Response::ok()
            }
            DatabaseCommand::UnloadDatabase => {
                db.unload();
                Response::ok()
            }
            DatabaseCommand::ActivateDataset { database, dataset } => {
                db.activate_dataset(database.as_deref(), dataset.as_deref());
                Response::ok()
            }
            DatabaseCommand::DeactivateDataset { dataset } => {
                db.deactivate_dataset(dataset.as_deref());
                Response::ok()
            }
            DatabaseCommand::GetImageTargets => {
                Response::ok().with("targets", to_json(db.image_targets())?)
            }
            DatabaseCommand::AddImageTarget { name, image_path } => {
                db.add_image_target(name.as_deref(), image_path.as_deref());
                Response::ok()
            }
            DatabaseCommand::RemoveImageTarget { name } => {
                db.remove_image_target(name.as_deref());
                Response::ok()
            }
            DatabaseCommand::GetTrackingResults => {
                Response::ok().with("results", to_json(db.tracking_results())?)
            }
            DatabaseCommand::SearchTargets { query } => {
                Response::ok().with("items", to_json(db.search(query.as_deref()))?)
            }
            DatabaseCommand::GetTargetsByCategory { category } => {
                Response::ok().with("items", to_json(db.by_category(category.as_deref()))?)
            }
            DatabaseCommand::SyncDatabase => {
                db.sync();
                Response::ok()
            }
            DatabaseCommand::GetDatabaseStats => Response::ok().with("stats", to_json(db.stats())?),
        };

        Ok(response)
    }
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, DispatchError> {
    serde_json::to_value(value).map_err(|e| DispatchError::Internal(e.to_string()))
}
