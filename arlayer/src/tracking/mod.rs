//! World and body tracking readings.
//!
//! Reports are produced by a [`TrackingSource`], normally the AR engine.
//! Confidence values are always clamped into `[0, 1]`.

mod source;
mod types;

pub use source::{
    SimulatedTracker, TrackingConfig, TrackingError, TrackingSource, DEFAULT_CONFIDENCE,
    DEFAULT_QUALITY,
};
pub use types::{
    BodyReport, TrackingQuality, TrackingReport, TrackingSample, CHEST_ANCHOR, TORSO_ANCHOR,
    WAIST_ANCHOR,
};
