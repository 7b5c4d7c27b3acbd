//! The session manager.
//!
//! A [`SessionManager`] is created by a successful initialize and lives
//! until it is disposed. All state sits behind a single lock, so every
//! operation observes and produces a consistent registry. Model loads
//! reserve their identifier under that lock, prepare the asset without it,
//! and commit under it again.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use super::config::{LoaderConfig, SessionConfig};
use super::credential::LicenseCredential;
use super::error::{panic_message, SessionError, SessionResult};
use super::handle::LoadHandle;
use super::loader::{AssetLoader, FileAssetLoader, LoadError, PassthroughLoader};
use super::state::SessionState;
use crate::model::{Model, ModelDescriptor, ModelRegistry, Transform, TransformUpdate};
use crate::tracking::{
    BodyReport, SimulatedTracker, TrackingConfig, TrackingReport, TrackingSource,
};

/// External collaborators a session talks to.
///
/// Cloned into every new session; the tracker is shared, so its settings
/// survive re-initialization.
#[derive(Clone)]
pub struct SessionServices {
    pub loader: Arc<dyn AssetLoader>,
    pub tracker: Arc<dyn TrackingSource>,
    pub runtime: Handle,
}

impl SessionServices {
    /// Passthrough loading and simulated tracking on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self {
            loader: Arc::new(PassthroughLoader),
            tracker: Arc::new(SimulatedTracker::default()),
            runtime,
        }
    }

    /// Services matching the loader and tracking settings.
    pub fn from_config(loader: &LoaderConfig, tracking: &TrackingConfig, runtime: Handle) -> Self {
        let asset_loader: Arc<dyn AssetLoader> = if loader.verify_files {
            Arc::new(FileAssetLoader::new(loader.large_asset_bytes))
        } else {
            Arc::new(PassthroughLoader)
        };

        Self {
            loader: asset_loader,
            tracker: Arc::new(SimulatedTracker::new(tracking.clone())),
            runtime,
        }
    }

    pub fn with_loader(mut self, loader: Arc<dyn AssetLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn TrackingSource>) -> Self {
        self.tracker = tracker;
        self
    }
}

/// A reserved identifier whose asset is still being prepared.
#[derive(Debug)]
struct PendingLoad {
    seq: u64,
    cancel: CancellationToken,
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    registry: ModelRegistry,
    pending: HashMap<String, PendingLoad>,
    next_load: u64,
}

impl SessionInner {
    fn ensure_initialized(&self) -> SessionResult<()> {
        if self.state.is_initialized() {
            Ok(())
        } else {
            Err(SessionError::NotInitialized)
        }
    }

    /// Whether `id` is still reserved by the load numbered `seq`.
    fn holds_reservation(&self, id: &str, seq: u64) -> bool {
        matches!(self.pending.get(id), Some(pending) if pending.seq == seq)
    }
}

/// Owner of one AR session: its state, registry, and background loads.
pub struct SessionManager {
    credential: LicenseCredential,
    inner: Arc<RwLock<SessionInner>>,
    services: SessionServices,
    loads: TaskTracker,
    shutdown: CancellationToken,
}

impl SessionManager {
    /// Validate the credential and create an initialized session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidCredential`] if the credential fails
    /// validation. Nothing is created in that case.
    pub fn initialize(
        credential: &str,
        config: &SessionConfig,
        services: SessionServices,
    ) -> SessionResult<Self> {
        let credential = LicenseCredential::parse(credential, config.min_credential_length)?;

        info!(
            credential_chars = credential.len(),
            "AR session initialized"
        );

        Ok(Self {
            credential,
            inner: Arc::new(RwLock::new(SessionInner {
                state: SessionState::Initialized,
                registry: ModelRegistry::new(),
                pending: HashMap::new(),
                next_load: 0,
            })),
            services,
            loads: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        })
    }

    /// The accepted credential.
    pub fn credential(&self) -> &LicenseCredential {
        &self.credential
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.inner.read().state
    }

    /// Whether the camera session is running.
    pub fn is_active(&self) -> bool {
        self.inner.read().state.is_active()
    }

    /// Number of registered models.
    pub fn model_count(&self) -> usize {
        self.inner.read().registry.len()
    }

    /// Number of loads reserved but not yet committed.
    pub fn pending_loads(&self) -> usize {
        self.inner.read().pending.len()
    }

    /// The shared tracking source.
    pub fn tracker(&self) -> &Arc<dyn TrackingSource> {
        &self.services.tracker
    }

    /// Start the camera session. Starting twice is a no-op.
    pub fn start_session(&self) -> SessionResult<()> {
        let mut inner = self.inner.write();
        let was_active = inner.state.is_active();
        inner.state = inner.state.start()?;
        if !was_active {
            info!(models = inner.registry.len(), "AR session started");
        }
        Ok(())
    }

    /// Stop the camera session. Always succeeds.
    pub fn stop_session(&self) -> SessionResult<()> {
        let mut inner = self.inner.write();
        if inner.state.is_active() {
            info!("AR session stopped");
        }
        inner.state = inner.state.stop();
        Ok(())
    }

    /// Begin loading a model.
    ///
    /// The identifier is reserved immediately; a second load of the same
    /// identifier fails with [`SessionError::DuplicateId`] whether the first
    /// has committed or is still in flight. The returned handle resolves
    /// once the model is registered or the load fails.
    pub fn load_model(&self, descriptor: ModelDescriptor) -> SessionResult<LoadHandle> {
        if descriptor.id.trim().is_empty() {
            return Err(SessionError::InvalidArgument(
                "model id must not be empty".to_string(),
            ));
        }
        if descriptor.source_path.trim().is_empty() {
            return Err(SessionError::InvalidArgument(
                "model path must not be empty".to_string(),
            ));
        }

        let mut inner = self.inner.write();
        inner.ensure_initialized()?;

        if inner.registry.contains(&descriptor.id) || inner.pending.contains_key(&descriptor.id) {
            return Err(SessionError::DuplicateId(descriptor.id));
        }

        let seq = inner.next_load;
        inner.next_load += 1;

        let cancel = self.shutdown.child_token();
        inner.pending.insert(
            descriptor.id.clone(),
            PendingLoad {
                seq,
                cancel: cancel.clone(),
            },
        );

        debug!(
            model_id = %descriptor.id,
            path = %descriptor.source_path,
            seq,
            "Model load reserved"
        );

        let model_id = descriptor.id.clone();
        let task = LoadTask {
            seq,
            descriptor,
            cancel: cancel.clone(),
            loader: Arc::clone(&self.services.loader),
            inner: Arc::clone(&self.inner),
        };

        let (tx, rx) = oneshot::channel();
        self.loads.spawn_on(
            async move {
                let _ = tx.send(task.run().await);
            },
            &self.services.runtime,
        );

        Ok(LoadHandle::new(model_id, rx, cancel))
    }

    /// Show or hide a model.
    pub fn set_visibility(&self, id: &str, visible: bool) -> SessionResult<()> {
        let mut inner = self.inner.write();
        inner.ensure_initialized()?;
        inner.registry.set_visibility(id, visible)?;
        debug!(model_id = %id, visible, "Model visibility changed");
        Ok(())
    }

    /// Apply a partial transform update and return the new transform.
    pub fn update_transform(&self, id: &str, update: &TransformUpdate) -> SessionResult<Transform> {
        let mut inner = self.inner.write();
        inner.ensure_initialized()?;
        let transform = inner.registry.apply_transform(id, update)?;
        debug!(
            model_id = %id,
            position = %transform.position,
            rotation = %transform.rotation,
            scale = %transform.scale,
            "Model transform updated"
        );
        Ok(transform)
    }

    /// Remove a model. Removing an unknown identifier succeeds.
    ///
    /// A load still in flight for `id` is cancelled. Returns whether
    /// anything was removed or cancelled.
    pub fn remove_model(&self, id: &str) -> SessionResult<bool> {
        let mut inner = self.inner.write();
        inner.ensure_initialized()?;

        let removed = inner.registry.remove(id).is_some();
        let cancelled = match inner.pending.remove(id) {
            Some(pending) => {
                pending.cancel.cancel();
                true
            }
            None => false,
        };

        if removed || cancelled {
            debug!(model_id = %id, removed, cancelled, "Model removed");
        } else {
            warn!(model_id = %id, "Remove of unknown model ignored");
        }
        Ok(removed || cancelled)
    }

    /// Look up a single model.
    pub fn model(&self, id: &str) -> SessionResult<Model> {
        let inner = self.inner.read();
        inner.ensure_initialized()?;
        inner
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::ModelNotFound(id.to_string()))
    }

    /// All registered models, sorted by identifier.
    pub fn models(&self) -> SessionResult<Vec<Model>> {
        let inner = self.inner.read();
        inner.ensure_initialized()?;
        Ok(inner.registry.snapshot())
    }

    /// World-tracking report.
    ///
    /// While the camera is stopped the report is idle and the tracker is
    /// not consulted.
    pub fn tracking_state(&self) -> SessionResult<TrackingReport> {
        let (active, count) = {
            let inner = self.inner.read();
            inner.ensure_initialized()?;
            (inner.state.is_active(), inner.registry.len())
        };

        if !active {
            return Ok(TrackingReport::idle(count));
        }

        let sample = self
            .services
            .tracker
            .sample()
            .map_err(|e| SessionError::Internal(e.to_string()))?;
        Ok(TrackingReport::tracking(sample, count))
    }

    /// Body landmark report.
    pub fn body_tracking_data(&self) -> SessionResult<BodyReport> {
        self.inner.read().ensure_initialized()?;
        self.services
            .tracker
            .body_landmarks()
            .map_err(|e| SessionError::Internal(e.to_string()))
    }

    /// Release the session.
    ///
    /// Stops the camera, cancels in-flight loads and waits for their tasks,
    /// then drops every model. Idempotent; operations afterwards fail with
    /// [`SessionError::NotInitialized`].
    pub async fn dispose(&self) {
        let cancelled_loads = {
            let mut inner = self.inner.write();
            if inner.state == SessionState::Disposed {
                return;
            }
            if inner.state.is_active() {
                info!("AR session stopped for disposal");
            }
            inner.state = SessionState::Disposed;
            let count = inner.pending.len();
            inner.pending.clear();
            count
        };

        self.shutdown.cancel();
        self.loads.close();
        self.loads.wait().await;

        let released = self.inner.write().registry.clear();
        info!(
            models_released = released,
            loads_cancelled = cancelled_loads,
            "AR session disposed"
        );
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Background half of a model load.
struct LoadTask {
    seq: u64,
    descriptor: ModelDescriptor,
    cancel: CancellationToken,
    loader: Arc<dyn AssetLoader>,
    inner: Arc<RwLock<SessionInner>>,
}

impl LoadTask {
    async fn run(self) -> SessionResult<Model> {
        let LoadTask {
            seq,
            descriptor,
            cancel,
            loader,
            inner,
        } = self;

        let prepare = AssertUnwindSafe(async { loader.prepare(&descriptor, cancel.clone()).await });
        let prepared = tokio::select! {
            biased;
            _ = cancel.cancelled() => Ok(Err(LoadError::Cancelled)),
            result = prepare.catch_unwind() => result,
        };

        let mut guard = inner.write();
        let reserved = guard.holds_reservation(&descriptor.id, seq);
        if reserved {
            guard.pending.remove(&descriptor.id);
        }

        let asset = match prepared {
            Ok(Ok(asset)) => asset,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(model_id = %descriptor.id, panic = %message, "Asset loader panicked");
                return Err(SessionError::Internal(format!(
                    "asset loader panicked while loading {}: {}",
                    descriptor.id, message
                )));
            }
            Ok(Err(LoadError::Cancelled)) => {
                debug!(model_id = %descriptor.id, "Model load cancelled");
                return Err(SessionError::LoadCancelled(descriptor.id));
            }
            Ok(Err(e)) => {
                warn!(model_id = %descriptor.id, error = %e, "Model load failed");
                return Err(SessionError::LoadFailed {
                    id: descriptor.id,
                    reason: e.to_string(),
                });
            }
        };

        // Cancelled, removed, or disposed while preparing.
        if !reserved || cancel.is_cancelled() || !guard.state.is_initialized() {
            debug!(model_id = %descriptor.id, "Model load discarded after preparation");
            return Err(SessionError::LoadCancelled(descriptor.id));
        }

        let model = guard.registry.insert(descriptor, asset)?.clone();
        info!(
            model_id = %model.id,
            format = %model.format,
            bytes = model.byte_size,
            "Model loaded"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vec3;
    use crate::session::loader::BoxFuture;
    use crate::model::PreparedAsset;
    use crate::tracking::TrackingQuality;
    use tokio::sync::Notify;

    fn credential() -> String {
        "K".repeat(64)
    }

    fn services() -> SessionServices {
        SessionServices::new(Handle::current())
    }

    fn manager() -> SessionManager {
        SessionManager::initialize(&credential(), &SessionConfig::default(), services()).unwrap()
    }

    fn descriptor(id: &str) -> ModelDescriptor {
        ModelDescriptor::new(id, format!("/models/{id}.glb"), id, "tops")
    }

    /// Loader that blocks until released.
    struct GatedLoader {
        gate: Arc<Notify>,
    }

    impl AssetLoader for GatedLoader {
        fn prepare<'a>(
            &'a self,
            descriptor: &'a ModelDescriptor,
            cancel: CancellationToken,
        ) -> BoxFuture<'a, Result<PreparedAsset, LoadError>> {
            Box::pin(async move {
                tokio::select! {
                    _ = cancel.cancelled() => Err(LoadError::Cancelled),
                    _ = self.gate.notified() => Ok(PreparedAsset {
                        byte_size: 1,
                        format: descriptor.format(),
                    }),
                }
            })
        }
    }

    fn gated_manager() -> (SessionManager, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let services = services().with_loader(Arc::new(GatedLoader {
            gate: Arc::clone(&gate),
        }));
        let manager =
            SessionManager::initialize(&credential(), &SessionConfig::default(), services).unwrap();
        (manager, gate)
    }

    #[tokio::test]
    async fn test_initialize_rejects_short_credential() {
        let result = SessionManager::initialize("short", &SessionConfig::default(), services());
        assert!(matches!(result, Err(SessionError::InvalidCredential(_))));
    }

    #[tokio::test]
    async fn test_initialize_honors_min_length() {
        let config = SessionConfig::default().with_min_credential_length(4);
        let manager = SessionManager::initialize("abcd", &config, services()).unwrap();
        assert_eq!(manager.state(), SessionState::Initialized);
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let manager = manager();
        manager.start_session().unwrap();
        assert!(manager.is_active());
        manager.start_session().unwrap();
        manager.stop_session().unwrap();
        assert_eq!(manager.state(), SessionState::Initialized);
        manager.stop_session().unwrap();
    }

    #[tokio::test]
    async fn test_load_model_registers_hidden() {
        let manager = manager();
        let model = manager
            .load_model(descriptor("shirt1"))
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert!(model.loaded);
        assert!(!model.visible);
        assert_eq!(model.transform, Transform::default());
        assert_eq!(manager.model_count(), 1);
    }

    #[tokio::test]
    async fn test_load_duplicate_rejected() {
        let manager = manager();
        manager.load_model(descriptor("m1")).unwrap().wait().await.unwrap();
        manager.set_visibility("m1", true).unwrap();

        let err = manager.load_model(descriptor("m1")).unwrap_err();
        assert_eq!(err, SessionError::DuplicateId("m1".to_string()));
        assert!(manager.model("m1").unwrap().visible);
    }

    #[tokio::test]
    async fn test_load_duplicate_while_in_flight() {
        let (manager, gate) = gated_manager();
        let handle = manager.load_model(descriptor("m1")).unwrap();

        assert_eq!(
            manager.load_model(descriptor("m1")).unwrap_err(),
            SessionError::DuplicateId("m1".to_string())
        );
        assert_eq!(manager.pending_loads(), 1);

        gate.notify_one();
        handle.wait().await.unwrap();
        assert_eq!(manager.pending_loads(), 0);
        assert_eq!(manager.model_count(), 1);
    }

    #[tokio::test]
    async fn test_load_rejects_empty_id() {
        let manager = manager();
        let err = manager
            .load_model(ModelDescriptor::new("", "/a.glb", "A", "tops"))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_cancelled_load_is_not_committed() {
        let (manager, _gate) = gated_manager();
        let handle = manager.load_model(descriptor("m1")).unwrap();
        handle.cancel();

        assert_eq!(
            handle.wait().await.unwrap_err(),
            SessionError::LoadCancelled("m1".to_string())
        );
        assert_eq!(manager.model_count(), 0);
        assert_eq!(manager.pending_loads(), 0);
    }

    #[tokio::test]
    async fn test_remove_cancels_in_flight_load() {
        let (manager, _gate) = gated_manager();
        let handle = manager.load_model(descriptor("m1")).unwrap();

        assert!(manager.remove_model("m1").unwrap());
        assert!(handle.wait().await.is_err());
        assert_eq!(manager.model_count(), 0);
    }

    #[tokio::test]
    async fn test_reload_after_remove_during_load() {
        let (manager, gate) = gated_manager();
        let first = manager.load_model(descriptor("m1")).unwrap();
        manager.remove_model("m1").unwrap();
        assert!(first.wait().await.is_err());

        let second = manager.load_model(descriptor("m1")).unwrap();
        gate.notify_one();
        second.wait().await.unwrap();
        assert_eq!(manager.model_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_reports_reason() {
        let services = services().with_loader(Arc::new(FileAssetLoader::default()));
        let manager =
            SessionManager::initialize(&credential(), &SessionConfig::default(), services).unwrap();

        let err = manager
            .load_model(ModelDescriptor::new("m1", "/does/not/exist.glb", "M", "tops"))
            .unwrap()
            .wait()
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::LoadFailed { ref id, .. } if id == "m1"));
        assert_eq!(manager.model_count(), 0);
        assert_eq!(manager.pending_loads(), 0);
    }

    /// Loader that panics on its first call and succeeds afterwards.
    #[derive(Default)]
    struct FlakyLoader {
        panicked: std::sync::atomic::AtomicBool,
    }

    impl AssetLoader for FlakyLoader {
        fn prepare<'a>(
            &'a self,
            descriptor: &'a ModelDescriptor,
            _cancel: CancellationToken,
        ) -> BoxFuture<'a, Result<PreparedAsset, LoadError>> {
            Box::pin(async move {
                if !self.panicked.swap(true, std::sync::atomic::Ordering::SeqCst) {
                    panic!("corrupt asset header");
                }
                Ok(PreparedAsset {
                    byte_size: 8,
                    format: descriptor.format(),
                })
            })
        }
    }

    #[tokio::test]
    async fn test_loader_panic_releases_reservation() {
        let services = services().with_loader(Arc::new(FlakyLoader::default()));
        let manager =
            SessionManager::initialize(&credential(), &SessionConfig::default(), services).unwrap();

        let err = manager
            .load_model(descriptor("m1"))
            .unwrap()
            .wait()
            .await
            .unwrap_err();
        assert!(
            matches!(err, SessionError::Internal(ref msg) if msg.contains("corrupt asset header"))
        );
        assert_eq!(manager.pending_loads(), 0);
        assert_eq!(manager.model_count(), 0);

        let model = manager
            .load_model(descriptor("m1"))
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(model.byte_size, 8);
    }

    #[tokio::test]
    async fn test_update_transform_partial() {
        let manager = manager();
        manager.load_model(descriptor("m1")).unwrap().wait().await.unwrap();

        let transform = manager
            .update_transform(
                "m1",
                &TransformUpdate::new().with_position(Vec3::new(1.0, 2.0, 3.0)),
            )
            .unwrap();
        assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.scale, Vec3::new(1.0, 1.0, 1.0));

        let err = manager
            .update_transform("ghost", &TransformUpdate::new())
            .unwrap_err();
        assert_eq!(err, SessionError::ModelNotFound("ghost".to_string()));
    }

    #[tokio::test]
    async fn test_remove_unknown_succeeds() {
        let manager = manager();
        assert!(!manager.remove_model("nothing").unwrap());
    }

    #[tokio::test]
    async fn test_tracking_state_follows_session() {
        let manager = manager();
        manager.load_model(descriptor("m1")).unwrap().wait().await.unwrap();

        let idle = manager.tracking_state().unwrap();
        assert!(!idle.is_tracking);
        assert_eq!(idle.tracked_object_count, 1);

        manager.start_session().unwrap();
        let report = manager.tracking_state().unwrap();
        assert!(report.is_tracking);
        assert_eq!(report.tracking_quality, TrackingQuality::Good);
        assert_eq!(report.tracked_object_count, 1);
    }

    #[tokio::test]
    async fn test_body_tracking_data() {
        let manager = manager();
        let report = manager.body_tracking_data().unwrap();
        assert_eq!(report.body_height, 170.0);
    }

    #[tokio::test]
    async fn test_dispose_clears_and_rejects() {
        let manager = manager();
        manager.start_session().unwrap();
        manager.load_model(descriptor("m1")).unwrap().wait().await.unwrap();

        manager.dispose().await;
        assert_eq!(manager.state(), SessionState::Disposed);
        assert_eq!(manager.model_count(), 0);
        assert_eq!(
            manager.set_visibility("m1", true).unwrap_err(),
            SessionError::NotInitialized
        );
        assert_eq!(
            manager.tracking_state().unwrap_err(),
            SessionError::NotInitialized
        );

        // Second dispose is a no-op.
        manager.dispose().await;
    }

    #[tokio::test]
    async fn test_dispose_during_load() {
        let (manager, _gate) = gated_manager();
        let handle = manager.load_model(descriptor("m1")).unwrap();

        manager.dispose().await;

        assert_eq!(
            handle.wait().await.unwrap_err(),
            SessionError::LoadCancelled("m1".to_string())
        );
        assert_eq!(manager.model_count(), 0);
        assert!(matches!(
            manager.load_model(descriptor("m2")),
            Err(SessionError::NotInitialized)
        ));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_remove_is_idempotent(ids in proptest::collection::vec("[a-z]{1,4}", 1..8)) {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();

                runtime.block_on(async {
                    let manager = SessionManager::initialize(
                        &credential(),
                        &SessionConfig::default(),
                        SessionServices::new(Handle::current()),
                    )
                    .unwrap();

                    for id in &ids {
                        if let Ok(handle) = manager.load_model(descriptor(id)) {
                            handle.wait().await.unwrap();
                        }
                    }

                    for id in &ids {
                        manager.remove_model(id).unwrap();
                        prop_assert!(!manager.remove_model(id).unwrap());
                        prop_assert!(manager.model(id).is_err());
                    }
                    prop_assert_eq!(manager.model_count(), 0);
                    Ok(())
                })?;
            }
        }
    }
}
