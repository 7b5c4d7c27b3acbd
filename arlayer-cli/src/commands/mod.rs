//! CLI command implementations.

pub mod config;
pub mod methods;
pub mod serve;
