//! AR session lifecycle.
//!
//! This module owns everything that lives between an accepted credential
//! and disposal: the lifecycle state, the model registry, and background
//! model loads.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    SessionManager                       │
//! │  RwLock<state + registry + pending reservations>        │
//! └───────┬───────────────────────────────────┬────────────┘
//!         │ load_model                        │ tracking_state
//!         ▼                                   ▼
//! ┌───────────────┐  prepare (unlocked)  ┌───────────────┐
//! │  TaskTracker  │─────────────────────▶│ AssetLoader   │
//! │  (load tasks) │◀──── commit (locked) │ TrackingSource│
//! └───────────────┘                      └───────────────┘
//! ```
//!
//! Every load reserves its identifier before spawning, so duplicate
//! detection covers in-flight loads as well as registered models.
//! Disposal cancels outstanding loads and waits for their tasks before it
//! clears the registry.

mod config;
mod credential;
mod error;
mod handle;
mod loader;
mod manager;
mod state;

pub use config::{
    LoaderConfig, SessionConfig, DEFAULT_LARGE_ASSET_BYTES, DEFAULT_LOAD_TIMEOUT_SECS,
    DEFAULT_MIN_CREDENTIAL_LENGTH,
};
pub use credential::LicenseCredential;
pub(crate) use error::panic_message;
pub use error::{SessionError, SessionResult};
pub use handle::LoadHandle;
pub use loader::{AssetLoader, BoxFuture, FileAssetLoader, LoadError, PassthroughLoader};
pub use manager::{SessionManager, SessionServices};
pub use state::SessionState;
