//! The model registry: identifier → model state.
//!
//! The registry exclusively owns every [`Model`]. Callers address models by
//! identifier only and receive clones when they need to look at one; no
//! mutable reference ever leaves the registry.

use std::collections::HashMap;

use thiserror::Error;

use super::transform::TransformUpdate;
use super::types::{Model, ModelDescriptor, PreparedAsset, Transform};

/// Errors raised by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A model with this identifier is already registered.
    #[error("model already loaded: {0}")]
    DuplicateId(String),

    /// No model with this identifier is registered.
    #[error("model not found: {0}")]
    ModelNotFound(String),
}

/// Mapping from model identifier to model state.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Model>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Whether a model with this identifier is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// Look up a model.
    pub fn get(&self, id: &str) -> Option<&Model> {
        self.models.get(id)
    }

    /// Register a freshly prepared model with default visibility and transform.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if the identifier is taken; the
    /// existing entry is left untouched.
    pub fn insert(
        &mut self,
        descriptor: ModelDescriptor,
        asset: PreparedAsset,
    ) -> Result<&Model, RegistryError> {
        use std::collections::hash_map::Entry;

        match self.models.entry(descriptor.id.clone()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateId(descriptor.id)),
            Entry::Vacant(slot) => Ok(slot.insert(Model::loaded(descriptor, asset))),
        }
    }

    /// Set a model's visibility. The transform is untouched.
    pub fn set_visibility(&mut self, id: &str, visible: bool) -> Result<(), RegistryError> {
        let model = self
            .models
            .get_mut(id)
            .ok_or_else(|| RegistryError::ModelNotFound(id.to_string()))?;
        model.visible = visible;
        Ok(())
    }

    /// Apply a partial transform update and return the resulting transform.
    pub fn apply_transform(
        &mut self,
        id: &str,
        update: &TransformUpdate,
    ) -> Result<Transform, RegistryError> {
        let model = self
            .models
            .get_mut(id)
            .ok_or_else(|| RegistryError::ModelNotFound(id.to_string()))?;
        update.apply_to(&mut model.transform);
        Ok(model.transform)
    }

    /// Remove a model, returning it if it was registered.
    pub fn remove(&mut self, id: &str) -> Option<Model> {
        self.models.remove(id)
    }

    /// Remove every model. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.models.len();
        self.models.clear();
        count
    }

    /// Clones of every model, sorted by identifier.
    pub fn snapshot(&self) -> Vec<Model> {
        let mut models: Vec<Model> = self.models.values().cloned().collect();
        models.sort_by(|a, b| a.id.cmp(&b.id));
        models
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vec3;

    fn descriptor(id: &str) -> ModelDescriptor {
        ModelDescriptor::new(id, format!("/models/{id}.glb"), id.to_uppercase(), "tops")
    }

    #[test]
    fn test_insert_and_get() {
        let mut registry = ModelRegistry::new();
        registry
            .insert(descriptor("shirt1"), PreparedAsset::default())
            .unwrap();

        assert_eq!(registry.len(), 1);
        let model = registry.get("shirt1").unwrap();
        assert!(model.loaded);
        assert!(!model.visible);
    }

    #[test]
    fn test_insert_duplicate_is_rejected() {
        let mut registry = ModelRegistry::new();
        registry
            .insert(descriptor("shirt1"), PreparedAsset::default())
            .unwrap();
        registry.set_visibility("shirt1", true).unwrap();

        let err = registry
            .insert(descriptor("shirt1"), PreparedAsset::default())
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId("shirt1".to_string()));

        // Existing entry untouched
        assert!(registry.get("shirt1").unwrap().visible);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_set_visibility_missing_model() {
        let mut registry = ModelRegistry::new();
        let err = registry.set_visibility("ghost", true).unwrap_err();
        assert_eq!(err, RegistryError::ModelNotFound("ghost".to_string()));
    }

    #[test]
    fn test_visibility_does_not_touch_transform() {
        let mut registry = ModelRegistry::new();
        registry
            .insert(descriptor("m1"), PreparedAsset::default())
            .unwrap();
        registry
            .apply_transform(
                "m1",
                &TransformUpdate::new().with_scale(Vec3::new(2.0, 2.0, 2.0)),
            )
            .unwrap();

        registry.set_visibility("m1", true).unwrap();

        let model = registry.get("m1").unwrap();
        assert_eq!(model.transform.scale, Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(model.transform.position, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_remove_frees_identifier() {
        let mut registry = ModelRegistry::new();
        registry
            .insert(descriptor("m1"), PreparedAsset::default())
            .unwrap();

        assert!(registry.remove("m1").is_some());
        assert!(registry.remove("m1").is_none());
        assert!(registry
            .insert(descriptor("m1"), PreparedAsset::default())
            .is_ok());
    }

    #[test]
    fn test_snapshot_sorted_by_id() {
        let mut registry = ModelRegistry::new();
        for id in ["c", "a", "b"] {
            registry.insert(descriptor(id), PreparedAsset::default()).unwrap();
        }
        let ids: Vec<_> = registry.snapshot().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_clear_returns_count() {
        let mut registry = ModelRegistry::new();
        registry.insert(descriptor("a"), PreparedAsset::default()).unwrap();
        registry.insert(descriptor("b"), PreparedAsset::default()).unwrap();
        assert_eq!(registry.clear(), 2);
        assert!(registry.is_empty());
    }
}
