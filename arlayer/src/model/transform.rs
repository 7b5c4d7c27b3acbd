//! Partial transform updates.
//!
//! Each vector is independently optional. An absent vector leaves the
//! corresponding field untouched; it never resets it to the default.

use super::types::{Transform, Vec3, VectorError};

/// A partial update to a model's transform.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformUpdate {
    pub position: Option<Vec3>,
    pub rotation: Option<Vec3>,
    pub scale: Option<Vec3>,
}

impl TransformUpdate {
    /// An update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an update from optional raw component slices.
    ///
    /// # Errors
    ///
    /// Returns the first [`VectorError`] found, checking position, rotation
    /// and scale in that order. Nothing is applied when any vector is bad.
    pub fn from_slices(
        position: Option<&[f32]>,
        rotation: Option<&[f32]>,
        scale: Option<&[f32]>,
    ) -> Result<Self, VectorError> {
        Ok(Self {
            position: position
                .map(|v| Vec3::from_slice("position", v))
                .transpose()?,
            rotation: rotation
                .map(|v| Vec3::from_slice("rotation", v))
                .transpose()?,
            scale: scale.map(|v| Vec3::from_slice("scale", v)).transpose()?,
        })
    }

    /// Set the position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the rotation (degrees, see [`Transform`]).
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Set the scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = Some(scale);
        self
    }

    /// True when no vector is present.
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.scale.is_none()
    }

    /// Apply to a transform in place.
    pub fn apply_to(&self, transform: &mut Transform) {
        if let Some(position) = self.position {
            transform.position = position;
        }
        if let Some(rotation) = self.rotation {
            transform.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            transform.scale = scale;
        }
    }
}
