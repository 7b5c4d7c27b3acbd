//! Tracking report types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::Vec3;

/// Anchor name for the chest landmark.
pub const CHEST_ANCHOR: &str = "chestAnchor";
/// Anchor name for the torso landmark.
pub const TORSO_ANCHOR: &str = "torsoAnchor";
/// Anchor name for the waist landmark.
pub const WAIST_ANCHOR: &str = "waistAnchor";

/// World-tracking quality reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackingQuality {
    /// No tracking.
    #[default]
    None,
    /// Tracking with reduced accuracy.
    Limited,
    /// Normal tracking.
    Good,
}

impl fmt::Display for TrackingQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackingQuality::None => "NONE",
            TrackingQuality::Limited => "LIMITED",
            TrackingQuality::Good => "GOOD",
        };
        f.write_str(name)
    }
}

impl FromStr for TrackingQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(TrackingQuality::None),
            "LIMITED" => Ok(TrackingQuality::Limited),
            "GOOD" => Ok(TrackingQuality::Good),
            other => Err(format!(
                "unknown tracking quality '{}' (expected NONE, LIMITED, or GOOD)",
                other
            )),
        }
    }
}

/// One reading from a tracking source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingSample {
    pub quality: TrackingQuality,
    pub confidence: f32,
}

impl TrackingSample {
    /// Create a sample, clamping confidence into `[0, 1]`.
    pub fn new(quality: TrackingQuality, confidence: f32) -> Self {
        Self {
            quality,
            confidence: clamp_unit(confidence),
        }
    }
}

/// The `getTrackingState` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingReport {
    pub is_tracking: bool,
    pub tracking_quality: TrackingQuality,
    pub confidence: f32,
    pub tracked_object_count: usize,
}

impl TrackingReport {
    /// Report for a running session.
    pub fn tracking(sample: TrackingSample, tracked_object_count: usize) -> Self {
        Self {
            is_tracking: true,
            tracking_quality: sample.quality,
            confidence: clamp_unit(sample.confidence),
            tracked_object_count,
        }
    }

    /// Report for a session whose camera is not running.
    pub fn idle(tracked_object_count: usize) -> Self {
        Self {
            is_tracking: false,
            tracking_quality: TrackingQuality::None,
            confidence: 0.0,
            tracked_object_count,
        }
    }
}

/// The `getBodyTrackingData` payload.
///
/// Anchors are flattened into the top level of the serialized object, so a
/// report reads `{"chestAnchor": [..], "bodyHeight": 170.0, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyReport {
    #[serde(flatten)]
    pub anchors: BTreeMap<String, Vec3>,
    /// Estimated height in centimetres.
    pub body_height: f32,
    /// Estimated shoulder width in centimetres.
    pub shoulder_width: f32,
    pub confidence: f32,
}

impl BodyReport {
    /// A report with no anchors.
    pub fn new(body_height: f32, shoulder_width: f32, confidence: f32) -> Self {
        Self {
            anchors: BTreeMap::new(),
            body_height,
            shoulder_width,
            confidence: clamp_unit(confidence),
        }
    }

    /// Add or replace a named anchor.
    pub fn with_anchor(mut self, name: impl Into<String>, position: Vec3) -> Self {
        self.anchors.insert(name.into(), position);
        self
    }

    /// Look up an anchor by name.
    pub fn anchor(&self, name: &str) -> Option<Vec3> {
        self.anchors.get(name).copied()
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
