//! Core data types for placed models.
//!
//! A model is a placed 3D asset: identity, spatial transform and a visibility
//! flag. How its geometry is decoded or rendered is the engine's business;
//! these types only describe what the bridge tracks about it.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of components in every transform vector.
pub const VECTOR_COMPONENTS: usize = 3;

/// Default model position: one metre in front of the camera.
pub const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// Default model rotation (no rotation).
pub const DEFAULT_ROTATION: Vec3 = Vec3::new(0.0, 0.0, 0.0);

/// Default model scale (unit scale).
pub const DEFAULT_SCALE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

/// Errors raised while building a vector from caller-supplied components.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VectorError {
    /// The component list did not have exactly three entries.
    #[error("{field} must have exactly 3 components, got {actual}")]
    Arity { field: &'static str, actual: usize },

    /// A component was NaN or infinite.
    #[error("{field} contains a non-finite component")]
    NonFinite { field: &'static str },
}

/// A three-component float vector.
///
/// Serialized as a plain `[x, y, z]` array, which is the wire format callers
/// use for position, rotation and scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Create a vector from its components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Build a vector from a component slice, naming the field in errors.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::Arity`] unless the slice has exactly three
    /// entries, and [`VectorError::NonFinite`] if any entry is NaN or infinite.
    pub fn from_slice(field: &'static str, values: &[f32]) -> Result<Self, VectorError> {
        let [x, y, z] = <[f32; VECTOR_COMPONENTS]>::try_from(values).map_err(|_| {
            VectorError::Arity {
                field,
                actual: values.len(),
            }
        })?;

        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(VectorError::NonFinite { field });
        }

        Ok(Self { x, y, z })
    }

    /// Components as an array.
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// Asset container format, derived from the source path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFormat {
    /// Binary glTF.
    Glb,
    /// JSON glTF with external buffers.
    Gltf,
    /// Autodesk FBX (needs offline conversion to GLB).
    Fbx,
    /// Wavefront OBJ (needs offline conversion to GLB).
    Obj,
    /// Anything else.
    #[default]
    Unknown,
}

impl AssetFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("glb") => AssetFormat::Glb,
            Some("gltf") => AssetFormat::Gltf,
            Some("fbx") => AssetFormat::Fbx,
            Some("obj") => AssetFormat::Obj,
            _ => AssetFormat::Unknown,
        }
    }

    /// Whether the engine can consume this format directly.
    pub fn is_engine_ready(&self) -> bool {
        matches!(self, AssetFormat::Glb | AssetFormat::Gltf)
    }
}

impl fmt::Display for AssetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetFormat::Glb => "glb",
            AssetFormat::Gltf => "gltf",
            AssetFormat::Fbx => "fbx",
            AssetFormat::Obj => "obj",
            AssetFormat::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Spatial transform of a placed model.
///
/// # Rotation Convention
///
/// `rotation` holds Euler angles in **degrees**, applied X then Y then Z
/// (intrinsic). The frame is right-handed and a positive angle turns
/// counter-clockwise when looking from the positive axis toward the origin.
/// Values are stored exactly as given; no wrapping into a canonical range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            rotation: DEFAULT_ROTATION,
            scale: DEFAULT_SCALE,
        }
    }
}

impl Transform {
    /// Rotation converted to radians, same axis order.
    pub fn rotation_radians(&self) -> Vec3 {
        Vec3::new(
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        )
    }
}

/// Caller-supplied description of a model to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Unique identifier chosen by the caller.
    pub id: String,
    /// Path or URI of the source asset.
    pub source_path: String,
    /// Human-readable name.
    pub display_name: String,
    /// Free-form grouping (e.g. "tops").
    pub category: String,
}

impl ModelDescriptor {
    /// Create a new descriptor.
    pub fn new(
        id: impl Into<String>,
        source_path: impl Into<String>,
        display_name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_path: source_path.into(),
            display_name: display_name.into(),
            category: category.into(),
        }
    }

    /// Format derived from the source path.
    pub fn format(&self) -> AssetFormat {
        AssetFormat::from_path(&self.source_path)
    }
}

/// What the external asset pipeline reports after preparing a source asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreparedAsset {
    /// Size of the source asset in bytes (0 when unknown).
    pub byte_size: u64,
    /// Detected container format.
    pub format: AssetFormat,
}

/// A model held by the registry.
///
/// Only the registry creates models, and only once the asset has been
/// prepared, so every registered model has `loaded == true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    pub source_path: String,
    pub display_name: String,
    pub category: String,
    pub loaded: bool,
    pub visible: bool,
    #[serde(flatten)]
    pub transform: Transform,
    pub format: AssetFormat,
    pub byte_size: u64,
}

impl Model {
    /// Build a freshly loaded model: hidden, default transform.
    pub(crate) fn loaded(descriptor: ModelDescriptor, asset: PreparedAsset) -> Self {
        Self {
            id: descriptor.id,
            source_path: descriptor.source_path,
            display_name: descriptor.display_name,
            category: descriptor.category,
            loaded: true,
            visible: false,
            transform: Transform::default(),
            format: asset.format,
            byte_size: asset.byte_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_from_slice_accepts_three_components() {
        let v = Vec3::from_slice("position", &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(v, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_vec3_from_slice_rejects_wrong_arity() {
        let err = Vec3::from_slice("scale", &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            VectorError::Arity {
                field: "scale",
                actual: 2
            }
        );
        assert!(err.to_string().contains("scale must have exactly 3 components"));

        assert!(Vec3::from_slice("scale", &[1.0, 2.0, 3.0, 4.0]).is_err());
        assert!(Vec3::from_slice("scale", &[]).is_err());
    }

    #[test]
    fn test_vec3_from_slice_rejects_non_finite() {
        let err = Vec3::from_slice("rotation", &[0.0, f32::NAN, 0.0]).unwrap_err();
        assert_eq!(err, VectorError::NonFinite { field: "rotation" });
    }

    #[test]
    fn test_vec3_serializes_as_array() {
        let json = serde_json::to_value(Vec3::new(0.5, -1.0, 2.0)).unwrap();
        assert_eq!(json, serde_json::json!([0.5, -1.0, 2.0]));
    }

    #[test]
    fn test_transform_defaults() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(t.rotation, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(t.scale, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_rotation_radians() {
        let t = Transform {
            rotation: Vec3::new(180.0, 90.0, 0.0),
            ..Transform::default()
        };
        let r = t.rotation_radians();
        assert!((r.x - std::f32::consts::PI).abs() < 1e-6);
        assert!((r.y - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(r.z, 0.0);
    }

    #[test]
    fn test_asset_format_detection() {
        assert_eq!(AssetFormat::from_path("/a/b.glb"), AssetFormat::Glb);
        assert_eq!(AssetFormat::from_path("shirt.GLTF"), AssetFormat::Gltf);
        assert_eq!(AssetFormat::from_path("dress.fbx"), AssetFormat::Fbx);
        assert_eq!(AssetFormat::from_path("pants.obj"), AssetFormat::Obj);
        assert_eq!(AssetFormat::from_path("noext"), AssetFormat::Unknown);
        assert!(AssetFormat::Glb.is_engine_ready());
        assert!(!AssetFormat::Fbx.is_engine_ready());
    }

    #[test]
    fn test_loaded_model_defaults() {
        let descriptor = ModelDescriptor::new("shirt1", "/a/b.glb", "Shirt", "tops");
        let model = Model::loaded(
            descriptor,
            PreparedAsset {
                byte_size: 42,
                format: AssetFormat::Glb,
            },
        );
        assert!(model.loaded);
        assert!(!model.visible);
        assert_eq!(model.transform, Transform::default());
        assert_eq!(model.byte_size, 42);
    }

    #[test]
    fn test_model_serializes_flat_camel_case() {
        let model = Model::loaded(
            ModelDescriptor::new("m1", "/m.glb", "M", "tops"),
            PreparedAsset::default(),
        );
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["sourcePath"], "/m.glb");
        assert_eq!(json["displayName"], "M");
        assert_eq!(json["position"], serde_json::json!([0.0, 0.0, -1.0]));
        assert_eq!(json["scale"], serde_json::json!([1.0, 1.0, 1.0]));
    }
}
