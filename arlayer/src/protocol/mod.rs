//! Host-facing command protocol.
//!
//! Requests name a channel (`session` or `database`), a method, and a map
//! of JSON arguments. The [`Dispatcher`] parses them into typed commands,
//! runs them, and answers with a flat [`Response`] envelope.
//!
//! # Example
//!
//! ```no_run
//! use arlayer::config::BridgeConfig;
//! use arlayer::protocol::{Dispatcher, Request};
//!
//! # async fn run() {
//! let dispatcher = Dispatcher::new(BridgeConfig::default(), tokio::runtime::Handle::current());
//!
//! let response = dispatcher
//!     .dispatch(Request::new("initialize").arg("credential", "x".repeat(60)))
//!     .await;
//! assert!(response.success);
//! # }
//! ```

mod args;
mod command;
mod database;
mod dispatcher;
mod envelope;
mod error;

pub use command::{Command, MethodInfo, SESSION_METHODS};
pub use database::{
    DatabaseCommand, DatabaseStats, ImageTarget, PlaceholderTargetDatabase, TargetDatabase,
    TargetResult, DATABASE_METHODS, DEFAULT_DATABASE_NAME,
};
pub use dispatcher::Dispatcher;
pub use envelope::{Channel, Request, Response};
pub use error::{DispatchError, ErrorKind};
