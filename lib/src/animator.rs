//! Per-frame kinematic orbital animation.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::f64::consts;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bodies::{OrbitData, SystemData, SystemTree};
use crate::layout::LayoutMap;
use crate::registry::ObjectRegistry;
use crate::time::SimClock;

const TAU: f64 = 2.0 * consts::PI;

/// Default jitter epsilon: container writes below this delta are
/// dropped to avoid sub-pixel transform churn presenting as vibration.
pub const DEFAULT_POSITION_EPSILON: f64 = 0.005;

/// Advances every mounted object along its parametric ellipse each
/// frame, composing child offsets onto the parent's *live* world
/// position in hierarchy-depth order.
#[derive(Debug)]
pub struct OrbitalAnimator {
    seed: u64,
    phases: HashMap<Arc<str>, f64>,
    epsilon: f64,
    needs_refresh: bool,
}

impl OrbitalAnimator {
    /// Seeded construction: initial phases are deterministic for this
    /// session but differ between sessions.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            phases: HashMap::new(),
            epsilon: DEFAULT_POSITION_EPSILON,
            needs_refresh: true,
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Request one full reprojection on the next tick even if the clock
    /// is paused. Called on view-mode or layout changes so a paused
    /// scene never keeps positions from a previous mode.
    pub fn force_refresh(&mut self) {
        self.needs_refresh = true;
    }

    /// Randomized-but-stable initial phase for an object, so bodies do
    /// not all start visually aligned.
    fn phase_for(&mut self, id: &Arc<str>) -> f64 {
        if let Some(phase) = self.phases.get(id) {
            return *phase;
        }
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(self.seed ^ hasher.finish());
        let phase = rng.gen_range(0.0..TAU);
        self.phases.insert(id.clone(), phase);
        phase
    }

    /// Update every mounted object's world position for the current
    /// simulated time. Parents are resolved strictly before children
    /// (`tree.update_order`), so nested hierarchies compose against
    /// this frame's parent positions, not last frame's.
    ///
    /// Returns the number of transforms actually written.
    pub fn tick(
        &mut self,
        clock: &SimClock,
        system: &SystemData,
        tree: &SystemTree,
        layouts: &LayoutMap,
        linear: bool,
        registry: &ObjectRegistry,
    ) -> usize {
        let refresh = std::mem::take(&mut self.needs_refresh);
        if clock.is_paused() && !refresh {
            return 0;
        }

        let elapsed_days = clock.elapsed_days();
        let mut written = 0;
        for id in tree.update_order() {
            let Some(object) = system.find(id) else { continue };
            // Not mounted yet (or mid system-switch): skip this frame's
            // update for this object.
            let Some(handle) = registry.resolve(id) else { continue };

            let target = match &object.orbit {
                None => object
                    .position
                    .map_or_else(Vector3::zeros, Vector3::from),
                Some(orbit) => {
                    let Some(parent_handle) = registry.resolve(orbit.parent()) else {
                        continue;
                    };
                    let parent_pos = parent_handle.read().position;
                    let Some(layout) = layouts.get(id) else { continue };
                    parent_pos + self.orbital_offset(id, orbit, layout.orbit_distance, elapsed_days, linear)
                }
            };

            let mut transform = handle.write();
            let delta = (target - transform.position).norm();
            if refresh || delta > self.epsilon {
                transform.position = target;
                written += 1;
            }
        }
        written
    }

    fn orbital_offset(
        &mut self,
        id: &Arc<str>,
        orbit: &OrbitData,
        orbit_distance: f64,
        elapsed_days: f64,
        linear: bool,
    ) -> Vector3<f64> {
        match orbit {
            OrbitData::Keplerian {
                eccentricity,
                inclination,
                orbital_period,
                ..
            } => {
                if linear {
                    // Profile layouts are diagrams: objects sit on the
                    // +X axis at their scaled distance.
                    return Vector3::new(orbit_distance, 0.0, 0.0);
                }
                let phase = self.phase_for(id);
                let theta = if *orbital_period > 0.0 {
                    phase + TAU * elapsed_days / orbital_period
                } else {
                    phase
                };
                let e = eccentricity.clamp(0.0, 0.99);
                let a = orbit_distance;
                let r = a * (1.0 - e * e) / (1.0 + e * libm::cos(theta));
                let x = r * libm::cos(theta);
                let y_flat = r * libm::sin(theta);
                let incl = inclination.to_radians();
                Vector3::new(x, y_flat * libm::sin(incl), y_flat * libm::cos(incl))
            }
            // Belt rings are centered on the parent.
            OrbitData::Belt { .. } => Vector3::zeros(),
        }
    }
}
