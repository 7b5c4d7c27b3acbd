//! Tracking sources.
//!
//! The AR engine owns the camera and pose estimation; the bridge only asks
//! it for readings through [`TrackingSource`]. [`SimulatedTracker`] stands
//! in for the engine with fixed readings.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::debug;

use super::types::{
    BodyReport, TrackingQuality, TrackingSample, CHEST_ANCHOR, TORSO_ANCHOR, WAIST_ANCHOR,
};
use crate::model::Vec3;

/// Default simulated quality.
pub const DEFAULT_QUALITY: TrackingQuality = TrackingQuality::Good;

/// Default simulated confidence.
pub const DEFAULT_CONFIDENCE: f32 = 0.95;

/// Errors raised by a tracking source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    /// The engine could not produce a reading.
    #[error("tracking unavailable: {0}")]
    Unavailable(String),
}

/// Tracking settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingConfig {
    pub default_quality: TrackingQuality,
    pub default_confidence: f32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_QUALITY,
            default_confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl TrackingConfig {
    pub fn with_quality(mut self, quality: TrackingQuality) -> Self {
        self.default_quality = quality;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.default_confidence = confidence;
        self
    }
}

/// A provider of world and body tracking readings.
///
/// Shared across sessions, so body tracking preferences outlive any single
/// session.
pub trait TrackingSource: Send + Sync + 'static {
    /// Current world-tracking reading.
    fn sample(&self) -> Result<TrackingSample, TrackingError>;

    /// Current body landmarks.
    fn body_landmarks(&self) -> Result<BodyReport, TrackingError>;

    /// Turn body tracking on or off.
    fn set_body_tracking(&self, enabled: bool);

    /// Whether body tracking is on.
    fn body_tracking_enabled(&self) -> bool;
}

/// Fixed readings in place of a real engine.
#[derive(Debug)]
pub struct SimulatedTracker {
    config: TrackingConfig,
    body_tracking: AtomicBool,
}

impl Default for SimulatedTracker {
    fn default() -> Self {
        Self::new(TrackingConfig::default())
    }
}

impl SimulatedTracker {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            config,
            body_tracking: AtomicBool::new(false),
        }
    }
}

impl TrackingSource for SimulatedTracker {
    fn sample(&self) -> Result<TrackingSample, TrackingError> {
        Ok(TrackingSample::new(
            self.config.default_quality,
            self.config.default_confidence,
        ))
    }

    fn body_landmarks(&self) -> Result<BodyReport, TrackingError> {
        Ok(BodyReport::new(170.0, 45.0, 0.9)
            .with_anchor(CHEST_ANCHOR, Vec3::new(0.0, 0.1, -1.0))
            .with_anchor(TORSO_ANCHOR, Vec3::new(0.0, -0.2, -1.0))
            .with_anchor(WAIST_ANCHOR, Vec3::new(0.0, -0.5, -1.0)))
    }

    fn set_body_tracking(&self, enabled: bool) {
        let previous = self.body_tracking.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            debug!(enabled, "Body tracking toggled");
        }
    }

    fn body_tracking_enabled(&self) -> bool {
        self.body_tracking.load(Ordering::SeqCst)
    }
}
