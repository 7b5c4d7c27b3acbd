//! Placed 3D models and their registry.
//!
//! This module holds the leaf of the system: the mapping from caller-chosen
//! identifiers to model state, plus the transform types that mutate it.
//! It has no notion of sessions; the [`crate::session`] module gates access.
//!
//! # Example
//!
//! ```
//! use arlayer::model::{ModelDescriptor, ModelRegistry, PreparedAsset, TransformUpdate, Vec3};
//!
//! let mut registry = ModelRegistry::new();
//! registry
//!     .insert(
//!         ModelDescriptor::new("shirt1", "/a/b.glb", "Shirt", "tops"),
//!         PreparedAsset::default(),
//!     )
//!     .unwrap();
//!
//! let update = TransformUpdate::new().with_position(Vec3::new(1.0, 2.0, 3.0));
//! let transform = registry.apply_transform("shirt1", &update).unwrap();
//! assert_eq!(transform.scale, Vec3::new(1.0, 1.0, 1.0));
//! ```

mod registry;
mod transform;
mod types;

pub use registry::{ModelRegistry, RegistryError};
pub use transform::TransformUpdate;
pub use types::{
    AssetFormat, Model, ModelDescriptor, PreparedAsset, Transform, Vec3, VectorError,
    DEFAULT_POSITION, DEFAULT_ROTATION, DEFAULT_SCALE, VECTOR_COMPONENTS,
};
