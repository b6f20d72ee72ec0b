//! The orbital mechanics layout calculator.
//!
//! Maps real astronomical parameters to view-mode-specific visual sizes
//! and distances. Real properties are never mutated here; everything
//! this module produces is derived and recomputed when the object list
//! or the view mode changes.

use std::collections::HashMap;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bodies::{CelestialObject, OrbitData, SystemTree};
use crate::viewmode::{OrbitScalingRule, ViewModeConfig, ViewModeId, REALISTIC_SYSTEM_SCALE};

/// Visual inner/outer edges of a belt, in scene units from its parent.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeltLayout {
    pub inner: f64,
    pub outer: f64,
}

/// The derived visual mapping for one object under one view mode.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    /// On-screen radius (scene units).
    pub visual_radius: f64,
    /// Distance from the parent (scene units); the belt midpoint for
    /// belts, zero for roots.
    pub orbit_distance: f64,
    pub belt: Option<BeltLayout>,
}

pub type LayoutMap = HashMap<Arc<str>, LayoutResult>;

/// In rank-spaced modes a belt occupies half a spacing step, so objects
/// beyond it advance from its outer edge by at most one full step and a
/// wide belt can never push them arbitrarily far out.
const RANK_BELT_WIDTH_FRACTION: f64 = 0.5;

/// Compute the layout of every reachable object under the given mode.
pub fn compute_layout(objects: &[CelestialObject], config: &ViewModeConfig) -> LayoutMap {
    let tree = SystemTree::build(objects);
    let by_id: HashMap<&str, &CelestialObject> = objects.iter().map(|o| (&*o.id, o)).collect();

    let mut map = LayoutMap::with_capacity(tree.update_order().len());
    for id in tree.update_order() {
        let object = by_id[&**id];
        let scaling = &config.object_scaling;
        let visual_radius =
            libm::pow(object.properties.radius.max(0.0), scaling.radius_exponent)
                * scaling.factor_for(object);
        map.insert(
            id.clone(),
            LayoutResult {
                visual_radius,
                orbit_distance: 0.0,
                belt: None,
            },
        );
    }

    match config.orbit_scaling {
        OrbitScalingRule::Proportional { system_scale } => {
            for id in tree.update_order() {
                let object = by_id[&**id];
                let Some(orbit) = &object.orbit else { continue };
                let Some(result) = map.get_mut(id) else { continue };
                match orbit {
                    OrbitData::Keplerian {
                        semi_major_axis, ..
                    } => {
                        result.orbit_distance = semi_major_axis * system_scale;
                    }
                    OrbitData::Belt {
                        inner_radius,
                        outer_radius,
                        ..
                    } => {
                        let inner = inner_radius * system_scale;
                        let outer = outer_radius * system_scale;
                        result.orbit_distance = (inner + outer) / 2.0;
                        result.belt = Some(BeltLayout { inner, outer });
                    }
                }
            }
        }
        OrbitScalingRule::RankSpaced { spacing } | OrbitScalingRule::LinearRank { spacing } => {
            rank_spaced_distances(&tree, &by_id, spacing, &mut map);
            rescale_to_realistic_extent(objects, &mut map);
        }
    }

    map
}

/// Equidistant rank placement: siblings advance one spacing step past
/// the previous sibling's outer edge, independent of real distances.
fn rank_spaced_distances(
    tree: &SystemTree,
    by_id: &HashMap<&str, &CelestialObject>,
    spacing: f64,
    map: &mut LayoutMap,
) {
    for parent in tree.update_order() {
        let mut cursor = 0.0_f64;
        for child in tree.children_of(parent) {
            let object = by_id[&**child];
            let Some(result) = map.get_mut(child) else { continue };
            match &object.orbit {
                Some(OrbitData::Belt { .. }) => {
                    let inner = cursor + spacing;
                    let outer = inner + spacing * RANK_BELT_WIDTH_FRACTION;
                    result.orbit_distance = (inner + outer) / 2.0;
                    result.belt = Some(BeltLayout { inner, outer });
                    cursor = outer;
                }
                Some(OrbitData::Keplerian { .. }) => {
                    cursor += spacing;
                    result.orbit_distance = cursor;
                }
                None => {}
            }
        }
    }
}

/// Rescale rank-spaced distances so the outermost object lands where
/// realistic mode would put it. Switching modes must not make the
/// system feel like it changed size.
fn rescale_to_realistic_extent(objects: &[CelestialObject], map: &mut LayoutMap) {
    let real_extent = objects
        .iter()
        .filter_map(|o| o.orbit.as_ref())
        .map(|orbit| OrderedFloat(orbit.outer_extent()))
        .max()
        .map_or(0.0, |m| m.0 * REALISTIC_SYSTEM_SCALE);
    let rank_extent = map
        .values()
        .map(|r| OrderedFloat(r.belt.map_or(r.orbit_distance, |b| b.outer)))
        .max()
        .map_or(0.0, |m| m.0);
    if real_extent <= 0.0 || rank_extent <= 0.0 {
        return;
    }

    let factor = real_extent / rank_extent;
    for result in map.values_mut() {
        result.orbit_distance *= factor;
        if let Some(belt) = &mut result.belt {
            belt.inner *= factor;
            belt.outer *= factor;
        }
    }
}

/// The outermost known orbit extent in a layout (belt outer edges
/// included), if any.
pub fn max_orbit_extent(map: &LayoutMap) -> Option<f64> {
    map.values()
        .map(|r| OrderedFloat(r.belt.map_or(r.orbit_distance, |b| b.outer)))
        .max()
        .map(|m| m.0)
        .filter(|m| *m > 0.0)
}

/// Cache key: the object identity list in order, plus the mode id.
/// Identity-based on purpose; a deep-equal but re-identified list is a
/// different calculation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LayoutKey {
    mode: ViewModeId,
    ids: Vec<Arc<str>>,
}

impl LayoutKey {
    fn new(objects: &[CelestialObject], mode: &ViewModeId) -> Self {
        Self {
            mode: mode.clone(),
            ids: objects.iter().map(|o| o.id.clone()).collect(),
        }
    }
}

/// Memoizing wrapper around [`compute_layout`], owned by the active
/// system session. `clear` is the explicit invalidation point for mode
/// switches and system changes.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    cache: HashMap<LayoutKey, Arc<LayoutMap>>,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&mut self, objects: &[CelestialObject], config: &ViewModeConfig) -> Arc<LayoutMap> {
        let key = LayoutKey::new(objects, &config.id);
        if let Some(hit) = self.cache.get(&key) {
            debug!(mode = %config.id, objects = objects.len(), "layout cache hit");
            return hit.clone();
        }
        let map = Arc::new(compute_layout(objects, config));
        self.cache.insert(key, map.clone());
        map
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cached_layouts(&self) -> usize {
        self.cache.len()
    }
}

/// Latest-only delivery slot for asynchronously computed layouts.
///
/// Callers can always read *some* valid map synchronously (empty while
/// the first calculation is pending). Superseded deliveries are
/// rejected; a failed calculation records an error while keeping the
/// previous result as a stale-but-valid fallback.
#[derive(Clone, Debug)]
pub struct LayoutSlot {
    current: Arc<LayoutMap>,
    generation: u64,
    pending: bool,
    error: Option<String>,
}

impl Default for LayoutSlot {
    fn default() -> Self {
        Self {
            current: Arc::new(LayoutMap::new()),
            generation: 0,
            pending: false,
            error: None,
        }
    }
}

impl LayoutSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new calculation; any in-flight one is superseded from
    /// this point on.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.pending = true;
        self.generation
    }

    /// Deliver a finished calculation. Returns `false` (and changes
    /// nothing) when a newer request has superseded this generation.
    pub fn deliver(&mut self, generation: u64, map: Arc<LayoutMap>) -> bool {
        if generation != self.generation {
            debug!(generation, latest = self.generation, "discarding superseded layout");
            return false;
        }
        self.current = map;
        self.pending = false;
        self.error = None;
        true
    }

    /// Record a failure (e.g. a calculation timeout) for the given
    /// generation. The previous layout stays available as a fallback.
    pub fn fail(&mut self, generation: u64, message: impl Into<String>) -> bool {
        if generation != self.generation {
            return false;
        }
        let message = message.into();
        warn!(generation, %message, "layout calculation failed; retaining last good layout");
        self.pending = false;
        self.error = Some(message);
        true
    }

    /// The latest delivered layout; empty until the first delivery.
    pub fn current(&self) -> Arc<LayoutMap> {
        self.current.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// The latest issued generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
