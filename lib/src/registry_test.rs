use std::sync::Arc;

use nalgebra::Vector3;

use crate::registry::ObjectRegistry;
use crate::scene::SceneNode;

#[test]
fn resolve_reads_live_transform() {
    let mut registry = ObjectRegistry::new();
    registry.bind_system(&Arc::from("stanton"));

    let node = SceneNode::mount(Arc::from("crusader"), &mut registry);
    node.set_position(Vector3::new(1.0, 2.0, 3.0));

    let handle = registry.resolve("crusader").expect("mounted object must resolve");
    assert_eq!(handle.read().position, Vector3::new(1.0, 2.0, 3.0));
}

#[test]
fn unregister_deletes_the_entry() {
    let mut registry = ObjectRegistry::new();
    registry.bind_system(&Arc::from("stanton"));

    let node = SceneNode::mount(Arc::from("crusader"), &mut registry);
    assert!(registry.contains("crusader"));

    node.unmount(&mut registry);
    // Deleted outright, not tombstoned: the id is simply gone.
    assert!(!registry.contains("crusader"));
    assert!(registry.resolve("crusader").is_none());
    assert!(registry.is_empty());
}

#[test]
fn dropping_the_scene_node_invalidates_the_handle() {
    let mut registry = ObjectRegistry::new();
    registry.bind_system(&Arc::from("stanton"));

    let node = SceneNode::mount(Arc::from("crusader"), &mut registry);
    drop(node);

    // The registry never owned the transform; resolution misses and the
    // caller skips this frame's update.
    assert!(registry.resolve("crusader").is_none());
}

#[test]
fn rebinding_the_same_system_id_keeps_entries() {
    let mut registry = ObjectRegistry::new();
    let first: Arc<str> = Arc::from("stanton");
    registry.bind_system(&first);
    let _node = SceneNode::mount(Arc::from("crusader"), &mut registry);

    // A reloaded copy of the same system arrives as a fresh allocation
    // with an equal id; live handles must survive.
    let second: Arc<str> = Arc::from("stanton");
    assert!(!Arc::ptr_eq(&first, &second));
    registry.bind_system(&second);

    assert_eq!(registry.len(), 1);
    assert!(registry.resolve("crusader").is_some());
}

#[test]
fn binding_a_different_system_clears_entries() {
    let mut registry = ObjectRegistry::new();
    registry.bind_system(&Arc::from("stanton"));
    let _a = SceneNode::mount(Arc::from("crusader"), &mut registry);
    let _b = SceneNode::mount(Arc::from("hurston"), &mut registry);
    assert_eq!(registry.len(), 2);

    registry.bind_system(&Arc::from("pyro"));
    assert!(registry.is_empty());
    assert_eq!(registry.system_id().map(|s| &**s), Some("pyro"));
}
