use std::sync::Arc;

use crate::bodies::{
    CelestialObject, Classification, GeometryType, Lighting, OrbitData, PhysicalProperties,
    SystemData, SystemTree,
};

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

fn star(id: &str) -> CelestialObject {
    CelestialObject {
        id: Arc::from(id),
        name: Arc::from(id),
        classification: Classification::Star,
        geometry_type: GeometryType::Star,
        properties: props(695_700.0),
        orbit: None,
        position: None,
    }
}

fn planet(id: &str, parent: &str, semi_major_axis: f64) -> CelestialObject {
    CelestialObject {
        id: Arc::from(id),
        name: Arc::from(id),
        classification: Classification::Planet,
        geometry_type: GeometryType::Terrestrial,
        properties: props(6_371.0),
        orbit: Some(OrbitData::Keplerian {
            parent: Arc::from(parent),
            semi_major_axis,
            eccentricity: 0.0,
            inclination: 0.0,
            orbital_period: 365.0,
        }),
        position: None,
    }
}

#[test]
fn tree_orders_parents_before_children() {
    let objects = vec![
        planet("luna", "earth", 0.00257),
        star("sol"),
        planet("earth", "sol", 1.0),
    ];
    let tree = SystemTree::build(&objects);

    assert_eq!(tree.depth_of("sol"), Some(0));
    assert_eq!(tree.depth_of("earth"), Some(1));
    assert_eq!(tree.depth_of("luna"), Some(2));

    let order = tree.update_order();
    let pos = |id: &str| order.iter().position(|o| &**o == id).unwrap();
    assert!(pos("sol") < pos("earth"));
    assert!(pos("earth") < pos("luna"));
}

#[test]
fn siblings_sorted_by_distance() {
    let objects = vec![
        star("sol"),
        planet("c", "sol", 3.0),
        planet("a", "sol", 1.0),
        planet("b", "sol", 2.0),
    ];
    let tree = SystemTree::build(&objects);
    let kids: Vec<&str> = tree.children_of("sol").iter().map(|k| &**k).collect();
    assert_eq!(kids, vec!["a", "b", "c"]);
}

#[test]
fn dangling_parent_is_dropped() {
    let objects = vec![star("sol"), planet("orphan", "ghost", 1.0)];
    let tree = SystemTree::build(&objects);

    assert!(tree.contains("sol"));
    assert!(!tree.contains("orphan"));
    assert_eq!(tree.update_order().len(), 1);
}

#[test]
fn orbit_cycle_does_not_loop() {
    let objects = vec![star("sol"), planet("a", "b", 1.0), planet("b", "a", 2.0)];
    let tree = SystemTree::build(&objects);

    // The cycle is unreachable from any root; both members are dropped
    // rather than traversed forever.
    assert!(tree.contains("sol"));
    assert!(!tree.contains("a"));
    assert!(!tree.contains("b"));
}

fn system_of(objects: Vec<CelestialObject>) -> SystemData {
    SystemData {
        id: Arc::from("test"),
        name: Arc::from("Test"),
        objects,
        lighting: Lighting::default(),
    }
}

#[test]
fn validation_rejects_duplicate_ids() {
    let system = system_of(vec![star("sol"), star("sol")]);
    assert!(system.validate().is_err());
}

#[test]
fn validation_rejects_inverted_belts() {
    let system = system_of(vec![
        star("sol"),
        CelestialObject {
            id: Arc::from("belt"),
            name: Arc::from("belt"),
            classification: Classification::Belt,
            geometry_type: GeometryType::Belt,
            properties: props(500.0),
            orbit: Some(OrbitData::Belt {
                parent: Arc::from("sol"),
                inner_radius: 5.0,
                outer_radius: 3.0,
                inclination: 0.0,
                eccentricity: 0.0,
            }),
            position: None,
        },
    ]);
    assert!(system.validate().is_err());
}

#[test]
fn validation_tolerates_graph_faults() {
    // Dangling parents degrade at traversal time; they are not load
    // errors.
    let system = system_of(vec![star("sol"), planet("orphan", "ghost", 1.0)]);
    assert!(system.validate().is_ok());
}

#[test]
fn outer_extent_accounts_for_eccentricity() {
    let orbit = OrbitData::Keplerian {
        parent: Arc::from("sol"),
        semi_major_axis: 10.0,
        eccentricity: 0.5,
        inclination: 0.0,
        orbital_period: 100.0,
    };
    assert!((orbit.outer_extent() - 15.0).abs() < 1e-12);

    let belt = OrbitData::Belt {
        parent: Arc::from("sol"),
        inner_radius: 2.0,
        outer_radius: 3.5,
        inclination: 0.0,
        eccentricity: 0.0,
    };
    assert!((belt.outer_extent() - 3.5).abs() < 1e-12);
}
