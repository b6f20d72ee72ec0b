//! Live scene transforms.

use std::sync::Arc;

use nalgebra::{UnitQuaternion, Vector3};
use parking_lot::RwLock;

use crate::registry::ObjectRegistry;

/// Mutable world-space placement of a mounted object.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

/// Shared handle to a live transform. The scene node owns the strong
/// reference; the registry only ever holds weak ones.
pub type TransformHandle = Arc<RwLock<Transform>>;

/// A mounted object in the render tree. Owns its transform's lifetime;
/// registers a weak handle in the [`ObjectRegistry`] on mount and
/// removes it on unmount.
#[derive(Debug)]
pub struct SceneNode {
    id: Arc<str>,
    transform: TransformHandle,
}

impl SceneNode {
    pub fn mount(id: Arc<str>, registry: &mut ObjectRegistry) -> Self {
        let transform: TransformHandle = Arc::new(RwLock::new(Transform::default()));
        registry.register(id.clone(), Arc::downgrade(&transform));
        Self { id, transform }
    }

    pub fn unmount(&self, registry: &mut ObjectRegistry) {
        registry.unregister(&self.id);
    }

    pub fn id(&self) -> &Arc<str> {
        &self.id
    }

    pub fn transform(&self) -> &TransformHandle {
        &self.transform
    }

    pub fn position(&self) -> Vector3<f64> {
        self.transform.read().position
    }

    pub fn set_position(&self, position: Vector3<f64>) {
        self.transform.write().position = position;
    }
}
