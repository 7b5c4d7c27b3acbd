//! ARLayer - AR try-on session bridge
//!
//! This library sits between a host application and an AR engine. The host
//! sends named method calls with JSON arguments; the bridge validates the
//! license credential, tracks the session lifecycle, keeps a registry of
//! placed 3D models, and reports tracking state back in a uniform
//! `{success, error, ...}` envelope.
//!
//! # Modules
//!
//! - [`model`]: models, transforms, and the registry
//! - [`session`]: lifecycle, credential checks, background model loading
//! - [`tracking`]: world and body tracking reports
//! - [`protocol`]: request/response envelopes and the dispatcher
//! - [`config`]: INI configuration file
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod session;
pub mod tracking;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
