use std::sync::Arc;

use nalgebra::Vector3;
use time::Duration;

use crate::animator::OrbitalAnimator;
use crate::bodies::{
    CelestialObject, Classification, GeometryType, OrbitData, PhysicalProperties, SystemData,
    SystemTree,
};
use crate::layout::{LayoutMap, LayoutResult};
use crate::registry::ObjectRegistry;
use crate::scene::SceneNode;
use crate::time::SimClock;

fn props(radius: f64) -> PhysicalProperties {
    PhysicalProperties {
        mass: 1.0e24,
        radius,
        temperature: 300.0,
        luminosity: None,
        atmosphere: None,
        rings: false,
    }
}

fn test_system() -> SystemData {
    SystemData {
        id: Arc::from("sol-system"),
        name: Arc::from("Sol"),
        objects: vec![
            CelestialObject {
                id: Arc::from("sol"),
                name: Arc::from("Sol"),
                classification: Classification::Star,
                geometry_type: GeometryType::Star,
                properties: props(695_700.0),
                orbit: None,
                position: Some([5.0, 0.0, 0.0]),
            },
            CelestialObject {
                id: Arc::from("earth"),
                name: Arc::from("Earth"),
                classification: Classification::Planet,
                geometry_type: GeometryType::Terrestrial,
                properties: props(6_371.0),
                orbit: Some(OrbitData::Keplerian {
                    parent: Arc::from("sol"),
                    semi_major_axis: 1.0,
                    eccentricity: 0.0,
                    inclination: 0.0,
                    orbital_period: 365.0,
                }),
                position: None,
            },
            CelestialObject {
                id: Arc::from("luna"),
                name: Arc::from("Luna"),
                classification: Classification::Moon,
                geometry_type: GeometryType::Terrestrial,
                properties: props(1_737.0),
                orbit: Some(OrbitData::Keplerian {
                    parent: Arc::from("earth"),
                    semi_major_axis: 0.00257,
                    eccentricity: 0.0,
                    inclination: 0.0,
                    orbital_period: 27.3,
                }),
                position: None,
            },
        ],
        lighting: crate::bodies::Lighting::default(),
    }
}

fn test_layouts() -> LayoutMap {
    let mut map = LayoutMap::new();
    for (id, orbit_distance) in [("sol", 0.0), ("earth", 100.0), ("luna", 10.0)] {
        map.insert(
            Arc::from(id),
            LayoutResult {
                visual_radius: 1.0,
                orbit_distance,
                belt: None,
            },
        );
    }
    map
}

struct Fixture {
    system: SystemData,
    tree: SystemTree,
    layouts: LayoutMap,
    registry: ObjectRegistry,
    nodes: Vec<SceneNode>,
}

impl Fixture {
    fn new() -> Self {
        let system = test_system();
        let tree = SystemTree::build(&system.objects);
        let mut registry = ObjectRegistry::new();
        registry.bind_system(&system.id);
        let nodes = system
            .objects
            .iter()
            .map(|o| SceneNode::mount(o.id.clone(), &mut registry))
            .collect();
        Self {
            system,
            tree,
            layouts: test_layouts(),
            registry,
            nodes,
        }
    }

    fn position(&self, id: &str) -> Vector3<f64> {
        self.registry.resolve(id).unwrap().read().position
    }
}

#[test]
fn nested_hierarchy_composes_parent_before_child() {
    let fixture = Fixture::new();
    let mut animator = OrbitalAnimator::new(42);
    let clock = SimClock::new();

    animator.tick(
        &clock,
        &fixture.system,
        &fixture.tree,
        &fixture.layouts,
        false,
        &fixture.registry,
    );

    let sol = fixture.position("sol");
    let earth = fixture.position("earth");
    let luna = fixture.position("luna");

    assert_eq!(sol, Vector3::new(5.0, 0.0, 0.0));
    // Circular orbits: offsets are exactly the layout distances, taken
    // from the parent position written earlier in the same tick.
    assert!(((earth - sol).norm() - 100.0).abs() < 1e-9);
    assert!(((luna - earth).norm() - 10.0).abs() < 1e-9);
}

#[test]
fn sub_epsilon_movement_is_suppressed() {
    let fixture = Fixture::new();
    let mut animator = OrbitalAnimator::new(42);
    let mut clock = SimClock::new();

    let written = animator.tick(
        &clock,
        &fixture.system,
        &fixture.tree,
        &fixture.layouts,
        false,
        &fixture.registry,
    );
    assert!(written > 0, "initial placement must write transforms");

    // One simulated second moves Earth ~2e-5 scene units, well below
    // the epsilon; nothing should be written.
    clock.advance(Duration::seconds(1));
    let written = animator.tick(
        &clock,
        &fixture.system,
        &fixture.tree,
        &fixture.layouts,
        false,
        &fixture.registry,
    );
    assert_eq!(written, 0, "sub-epsilon deltas must not touch transforms");

    clock.advance(Duration::days(10));
    let written = animator.tick(
        &clock,
        &fixture.system,
        &fixture.tree,
        &fixture.layouts,
        false,
        &fixture.registry,
    );
    assert!(written > 0, "a real movement must land");
}

#[test]
fn paused_clock_reprojects_once_after_refresh() {
    let fixture = Fixture::new();
    let mut animator = OrbitalAnimator::new(42);
    let mut clock = SimClock::new();

    animator.tick(
        &clock,
        &fixture.system,
        &fixture.tree,
        &fixture.layouts,
        false,
        &fixture.registry,
    );
    clock.set_paused(true);

    // A mode switch while paused: distances change, one reprojection
    // must land even though time is frozen.
    let mut far_layouts = fixture.layouts.clone();
    far_layouts.get_mut("earth").unwrap().orbit_distance = 200.0;
    animator.force_refresh();
    let written = animator.tick(
        &clock,
        &fixture.system,
        &fixture.tree,
        &far_layouts,
        false,
        &fixture.registry,
    );
    assert!(written > 0);
    let sol = fixture.position("sol");
    assert!(((fixture.position("earth") - sol).norm() - 200.0).abs() < 1e-9);

    // But only once: with no new refresh the paused scene stays put.
    let written = animator.tick(
        &clock,
        &fixture.system,
        &fixture.tree,
        &far_layouts,
        false,
        &fixture.registry,
    );
    assert_eq!(written, 0);
}

#[test]
fn linear_layouts_sit_on_one_axis() {
    let fixture = Fixture::new();
    let mut animator = OrbitalAnimator::new(42);
    let clock = SimClock::new();

    animator.tick(
        &clock,
        &fixture.system,
        &fixture.tree,
        &fixture.layouts,
        true,
        &fixture.registry,
    );

    let sol = fixture.position("sol");
    assert_eq!(fixture.position("earth"), sol + Vector3::new(100.0, 0.0, 0.0));
    assert_eq!(
        fixture.position("luna"),
        sol + Vector3::new(110.0, 0.0, 0.0)
    );
}

#[test]
fn phases_are_deterministic_per_seed() {
    let fixture_a = Fixture::new();
    let fixture_b = Fixture::new();
    let clock = SimClock::new();

    let mut animator_a = OrbitalAnimator::new(7);
    let mut animator_b = OrbitalAnimator::new(7);
    animator_a.tick(
        &clock,
        &fixture_a.system,
        &fixture_a.tree,
        &fixture_a.layouts,
        false,
        &fixture_a.registry,
    );
    animator_b.tick(
        &clock,
        &fixture_b.system,
        &fixture_b.tree,
        &fixture_b.layouts,
        false,
        &fixture_b.registry,
    );
    assert_eq!(
        fixture_a.position("earth"),
        fixture_b.position("earth"),
        "same seed must reproduce the same phases"
    );

    let fixture_c = Fixture::new();
    let mut animator_c = OrbitalAnimator::new(8);
    animator_c.tick(
        &clock,
        &fixture_c.system,
        &fixture_c.tree,
        &fixture_c.layouts,
        false,
        &fixture_c.registry,
    );
    assert!(
        (fixture_a.position("earth") - fixture_c.position("earth")).norm() > 1e-12,
        "different seeds should scatter initial phases"
    );
}

#[test]
fn unmounted_objects_are_skipped() {
    let mut fixture = Fixture::new();
    let mut animator = OrbitalAnimator::new(42);
    let clock = SimClock::new();

    animator.tick(
        &clock,
        &fixture.system,
        &fixture.tree,
        &fixture.layouts,
        false,
        &fixture.registry,
    );
    let luna_before = fixture.position("luna");

    // Unmount Earth: Luna's parent no longer resolves, so Luna simply
    // holds position instead of erroring.
    let earth_index = fixture
        .nodes
        .iter()
        .position(|n| &**n.id() == "earth")
        .unwrap();
    let earth_node = fixture.nodes.remove(earth_index);
    earth_node.unmount(&mut fixture.registry);
    drop(earth_node);

    animator.force_refresh();
    animator.tick(
        &clock,
        &fixture.system,
        &fixture.tree,
        &fixture.layouts,
        false,
        &fixture.registry,
    );
    assert_eq!(fixture.position("luna"), luna_before);
}
