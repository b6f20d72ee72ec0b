//! Definitions of celestial objects and star systems.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use color_eyre::eyre::{bail, ensure};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Broad category of a celestial object, used for scaling and camera
/// distance selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Star,
    Planet,
    DwarfPlanet,
    Moon,
    Belt,
    JumpPoint,
    Station,
    BlackHole,
}

/// Rendering-shape hint, independent of [`Classification`] (a dwarf
/// planet may still render as terrestrial).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryType {
    Terrestrial,
    GasGiant,
    Star,
    Belt,
    Ring,
    Exotic,
}

/// Real physical attributes. Always in astronomical units of measure;
/// never touched by view-mode scaling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProperties {
    /// Mass (`kg`)
    pub mass: f64,
    /// Mean radius (`km`)
    pub radius: f64,
    /// Effective temperature (`K`)
    pub temperature: f64,
    /// Luminosity (solar luminosities), usually only present for stars
    #[serde(default)]
    pub luminosity: Option<f64>,
    /// Atmospheric density as a fraction of Earth's, if any
    #[serde(default)]
    pub atmosphere: Option<f64>,
    /// Whether the object carries a ring system
    #[serde(default)]
    pub rings: bool,
}

/// Orbital elements of an object, relative to its parent.
///
/// The two variants carry disjoint field names, so the untagged
/// representation is unambiguous in system JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrbitData {
    Keplerian {
        parent: Arc<str>,
        /// Semi-major axis (`AU`)
        semi_major_axis: f64,
        /// Eccentricity (dimensionless)
        eccentricity: f64,
        /// Inclination to the system plane (`deg`)
        inclination: f64,
        /// Sidereal period (`days`)
        orbital_period: f64,
    },
    Belt {
        parent: Arc<str>,
        /// Inner edge (`AU`)
        inner_radius: f64,
        /// Outer edge (`AU`)
        outer_radius: f64,
        /// Inclination to the system plane (`deg`)
        inclination: f64,
        /// Mean eccentricity of belt members (dimensionless)
        eccentricity: f64,
    },
}

impl OrbitData {
    pub fn parent(&self) -> &Arc<str> {
        match self {
            OrbitData::Keplerian { parent, .. } | OrbitData::Belt { parent, .. } => parent,
        }
    }

    /// Distance used to order siblings around a shared parent: the
    /// semi-major axis, or a belt's inner edge (`AU`).
    pub fn characteristic_distance(&self) -> f64 {
        match self {
            OrbitData::Keplerian {
                semi_major_axis, ..
            } => *semi_major_axis,
            OrbitData::Belt { inner_radius, .. } => *inner_radius,
        }
    }

    /// Outer extent of the orbit: apoapsis for point objects, the
    /// outer edge for belts (`AU`).
    pub fn outer_extent(&self) -> f64 {
        match self {
            OrbitData::Keplerian {
                semi_major_axis,
                eccentricity,
                ..
            } => semi_major_axis * (1.0 + eccentricity),
            OrbitData::Belt { outer_radius, .. } => *outer_radius,
        }
    }
}

/// A node in a system's object tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CelestialObject {
    /// Unique within a system; the identity key used everywhere.
    pub id: Arc<str>,
    /// Display name; never used for lookups.
    pub name: Arc<str>,
    pub classification: Classification,
    pub geometry_type: GeometryType,
    pub properties: PhysicalProperties,
    #[serde(default)]
    pub orbit: Option<OrbitData>,
    /// Absolute placement for objects without an orbit (typically the
    /// root star).
    #[serde(default)]
    pub position: Option<[f64; 3]>,
}

impl CelestialObject {
    pub fn is_belt(&self) -> bool {
        matches!(self.orbit, Some(OrbitData::Belt { .. }))
            || self.classification == Classification::Belt
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    #[serde(default)]
    pub primary_star: Option<Arc<str>>,
    #[serde(default)]
    pub ambient: f64,
}

/// A complete star system as loaded from a system file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemData {
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub objects: Vec<CelestialObject>,
    #[serde(default)]
    pub lighting: Lighting,
}

impl SystemData {
    pub fn find(&self, id: &str) -> Option<&CelestialObject> {
        self.objects.iter().find(|o| &*o.id == id)
    }

    /// Structural checks beyond what deserialization enforces. Dangling
    /// parents and cycles are *not* errors here (traversal degrades
    /// gracefully); duplicate ids and nonsense physical values are.
    pub fn validate(&self) -> color_eyre::eyre::Result<()> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.objects.len());
        for object in &self.objects {
            if !seen.insert(&object.id) {
                bail!("duplicate object id {:?} in system {:?}", object.id, self.id);
            }
            ensure!(
                object.properties.radius > 0.0,
                "object {:?} has non-positive radius",
                object.id
            );
            if let Some(orbit) = &object.orbit {
                ensure!(
                    orbit.characteristic_distance() >= 0.0,
                    "object {:?} has a negative orbit distance",
                    object.id
                );
                if let OrbitData::Belt {
                    inner_radius,
                    outer_radius,
                    ..
                } = orbit
                {
                    ensure!(
                        outer_radius > inner_radius,
                        "belt {:?} has outer edge inside its inner edge",
                        object.id
                    );
                }
            }
        }
        Ok(())
    }
}

/// Strict id-keyed adjacency over a system's objects.
///
/// Built once per layout pass; parent links resolve by `id` only, never
/// by display name. Dangling parents and orbit cycles are dropped with
/// a warning rather than looping or panicking.
#[derive(Clone, Debug, Default)]
pub struct SystemTree {
    children: HashMap<Arc<str>, Vec<Arc<str>>>,
    depth: HashMap<Arc<str>, u32>,
    roots: Vec<Arc<str>>,
    update_order: Vec<Arc<str>>,
}

impl SystemTree {
    pub fn build(objects: &[CelestialObject]) -> Self {
        let ids: HashSet<&str> = objects.iter().map(|o| &*o.id).collect();

        let mut children: HashMap<Arc<str>, Vec<Arc<str>>> = HashMap::new();
        let mut roots = Vec::new();
        for obj in objects {
            match &obj.orbit {
                None => roots.push(obj.id.clone()),
                Some(orbit) => {
                    let parent = orbit.parent();
                    if ids.contains(&**parent) {
                        children.entry(parent.clone()).or_default().push(obj.id.clone());
                    } else {
                        warn!(
                            id = %obj.id,
                            parent = %parent,
                            "dropping object with dangling parent reference"
                        );
                    }
                }
            }
        }

        // Keep sibling order deterministic: sort by characteristic distance,
        // ties broken by id.
        let by_id: HashMap<&str, &CelestialObject> =
            objects.iter().map(|o| (&*o.id, o)).collect();
        for list in children.values_mut() {
            list.sort_by(|a, b| {
                let da = by_id[&**a].orbit.as_ref().map_or(0.0, OrbitData::characteristic_distance);
                let db = by_id[&**b].orbit.as_ref().map_or(0.0, OrbitData::characteristic_distance);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.cmp(b))
            });
        }

        // Breadth-first from the roots. The visited set guards against
        // cycles in malformed data; anything unreachable is dropped.
        let mut depth = HashMap::new();
        let mut update_order = Vec::with_capacity(objects.len());
        let mut visited: HashSet<Arc<str>> = HashSet::new();
        let mut queue: VecDeque<(Arc<str>, u32)> =
            roots.iter().map(|r| (r.clone(), 0)).collect();
        while let Some((id, d)) = queue.pop_front() {
            if !visited.insert(id.clone()) {
                warn!(id = %id, "orbit cycle detected; skipping revisited subtree");
                continue;
            }
            depth.insert(id.clone(), d);
            update_order.push(id.clone());
            if let Some(kids) = children.get(&id) {
                for kid in kids {
                    queue.push_back((kid.clone(), d + 1));
                }
            }
        }

        if update_order.len() < objects.len() {
            warn!(
                reachable = update_order.len(),
                total = objects.len(),
                "some objects are unreachable from any root and were dropped"
            );
        }

        Self {
            children,
            depth,
            roots,
            update_order,
        }
    }

    pub fn children_of(&self, id: &str) -> &[Arc<str>] {
        self.children.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn depth_of(&self, id: &str) -> Option<u32> {
        self.depth.get(id).copied()
    }

    pub fn roots(&self) -> &[Arc<str>] {
        &self.roots
    }

    /// All reachable ids, parents strictly before children.
    pub fn update_order(&self) -> &[Arc<str>] {
        &self.update_order
    }

    pub fn contains(&self, id: &str) -> bool {
        self.depth.contains_key(id)
    }
}
