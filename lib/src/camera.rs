//! Camera framing and animation.
//!
//! A state machine advanced by an injected per-frame clock. Framing
//! requests are not acted on at request time: they are parked and
//! consumed by `update`, which the orchestrator runs *after* the
//! orbital animator each frame, so framing always samples positions
//! that belong to the current mode and frame.

use std::sync::Arc;

use nalgebra::Vector3;
use ordered_float::OrderedFloat;
use tracing::{debug, warn};

use crate::bodies::{CelestialObject, Classification, GeometryType, SystemData, SystemTree};
use crate::layout::{max_orbit_extent, LayoutMap};
use crate::math::{lerp_vec, Easing};
use crate::registry::ObjectRegistry;
use crate::viewmode::CameraModeConfig;

/// Fallback framing distance when a layout has no orbits to measure.
const DEFAULT_FRAMING_DISTANCE: f64 = 50.0;

/// Profile framing never comes closer than this, so an isolated object
/// still gets a sane orbit distance instead of a degenerate close-up.
const MIN_PROFILE_DISTANCE: f64 = 20.0;

/// Default jitter epsilon for follow translations.
pub const DEFAULT_FOLLOW_EPSILON: f64 = 0.005;

/// Camera placement: eye position plus look-at target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vector3<f64>,
    pub target: Vector3<f64>,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 30.0, 80.0),
            target: Vector3::zeros(),
        }
    }
}

/// The orbit-control surface the user drags against. Disabled while an
/// animation owns the camera; its "home" state must track the settled
/// pose so subsequent drags are relative to where the camera actually
/// is.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub enabled: bool,
    pub home: CameraPose,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enabled: true,
            home: CameraPose::default(),
        }
    }
}

impl OrbitControls {
    fn sync_home(&mut self, pose: CameraPose) {
        self.home = pose;
    }
}

/// Ephemeral state of one in-flight camera animation. At most one
/// exists at a time; a superseding request tears it down first.
#[derive(Clone, Debug)]
struct CameraAnimation {
    start_time: f64,
    duration: f64,
    start: CameraPose,
    end: CameraPose,
    easing: Easing,
    then: AfterAnimation,
}

#[derive(Clone, Debug)]
enum AfterAnimation {
    Idle,
    Follow(Arc<str>),
}

#[derive(Clone, Debug)]
enum CameraState {
    Idle,
    Animating(CameraAnimation),
    Following {
        target: Arc<str>,
        last_seen: Vector3<f64>,
    },
}

/// A parked framing request, consumed on the next `update` once the
/// frame's position propagation has completed. Latest request wins.
#[derive(Clone, Debug, PartialEq, Eq)]
enum FramingRequest {
    Focus(Arc<str>),
    BirdsEye,
    Profile(Arc<str>),
}

pub struct CameraController {
    state: CameraState,
    pose: CameraPose,
    controls: OrbitControls,
    epsilon: f64,
    pending: Option<FramingRequest>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            state: CameraState::Idle,
            pose: CameraPose::default(),
            controls: OrbitControls::default(),
            epsilon: DEFAULT_FOLLOW_EPSILON,
            pending: None,
        }
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn set_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
        self.controls.sync_home(pose);
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, CameraState::Animating(_))
    }

    pub fn following(&self) -> Option<&Arc<str>> {
        match &self.state {
            CameraState::Following { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Animate to the object and follow it once settled.
    pub fn request_focus(&mut self, id: Arc<str>) {
        self.pending = Some(FramingRequest::Focus(id));
    }

    /// Frame the whole system from above.
    pub fn request_birds_eye(&mut self) {
        self.pending = Some(FramingRequest::BirdsEye);
    }

    /// Frame the focal object against its outermost partner for the
    /// linear profile view.
    pub fn request_profile(&mut self, id: Arc<str>) {
        self.pending = Some(FramingRequest::Profile(id));
    }

    /// Apply a user drag to the camera. Ignored while an animation owns
    /// the camera.
    pub fn apply_user_orbit(&mut self, yaw: f64, pitch: f64) {
        if !self.controls.enabled {
            return;
        }
        let offset = self.pose.position - self.pose.target;
        let radius = offset.norm();
        if radius <= f64::EPSILON {
            return;
        }
        let cur_yaw = libm::atan2(offset.x, offset.z);
        let cur_pitch = libm::asin((offset.y / radius).clamp(-1.0, 1.0));
        let new_yaw = cur_yaw + yaw;
        let new_pitch = (cur_pitch + pitch).clamp(-1.5, 1.5);
        self.pose.position = self.pose.target
            + radius
                * Vector3::new(
                    libm::cos(new_pitch) * libm::sin(new_yaw),
                    libm::sin(new_pitch),
                    libm::cos(new_pitch) * libm::cos(new_yaw),
                );
        self.controls.sync_home(self.pose);
    }

    /// Scale the camera's distance to its target. Ignored while an
    /// animation owns the camera.
    pub fn apply_user_zoom(&mut self, factor: f64) {
        if !self.controls.enabled || factor <= 0.0 {
            return;
        }
        let offset = self.pose.position - self.pose.target;
        let radius = (offset.norm() * factor).clamp(1.0, 1.0e6);
        if offset.norm() <= f64::EPSILON {
            return;
        }
        self.pose.position = self.pose.target + offset.normalize() * radius;
        self.controls.sync_home(self.pose);
    }

    /// Tear down any in-flight animation: controls come back, its state
    /// is discarded, nothing of its end pose is applied.
    pub fn cancel_animation(&mut self) {
        if matches!(self.state, CameraState::Animating(_)) {
            self.controls.enabled = true;
            self.controls.sync_home(self.pose);
            self.state = CameraState::Idle;
        }
    }

    /// Advance the controller one frame. Must run after the orbital
    /// animator has written this frame's positions; parked framing
    /// requests are consumed here for exactly that reason.
    pub fn update(
        &mut self,
        now: f64,
        system: &SystemData,
        tree: &SystemTree,
        layouts: &LayoutMap,
        registry: &ObjectRegistry,
        config: &CameraModeConfig,
    ) {
        if let Some(request) = self.pending.take() {
            self.begin_request(request, now, system, tree, layouts, registry, config);
        }

        match &mut self.state {
            CameraState::Idle => {}
            CameraState::Animating(anim) => {
                let progress = ((now - anim.start_time) / anim.duration).clamp(0.0, 1.0);
                let ease = anim.easing.apply(progress);
                self.pose = CameraPose {
                    position: lerp_vec(anim.start.position, anim.end.position, ease),
                    target: lerp_vec(anim.start.target, anim.end.target, ease),
                };
                if progress >= 1.0 {
                    let then = anim.then.clone();
                    self.pose = anim.end;
                    self.controls.enabled = true;
                    self.controls.sync_home(self.pose);
                    self.state = match then {
                        AfterAnimation::Idle => CameraState::Idle,
                        AfterAnimation::Follow(id) => match resolve_position(registry, &id) {
                            Some(pos) => CameraState::Following {
                                target: id,
                                last_seen: pos,
                            },
                            None => CameraState::Idle,
                        },
                    };
                }
            }
            CameraState::Following { target, last_seen } => {
                let Some(live) = resolve_position(registry, target) else {
                    // Object unmounted mid-follow; hold the pose.
                    return;
                };
                let delta = live - *last_seen;
                *last_seen = live;
                if delta.norm() > self.epsilon {
                    // Rigid follow: translate eye and target together so
                    // the relative viewing angle is preserved, and resync
                    // the control home state every frame movement lands.
                    // Throttling this resync breaks drag input during
                    // tracking.
                    self.pose.position += delta;
                    self.pose.target += delta;
                    self.controls.sync_home(self.pose);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn begin_request(
        &mut self,
        request: FramingRequest,
        now: f64,
        system: &SystemData,
        tree: &SystemTree,
        layouts: &LayoutMap,
        registry: &ObjectRegistry,
        config: &CameraModeConfig,
    ) {
        let end = match &request {
            FramingRequest::Focus(id) => self.focus_pose(id, system, layouts, registry, config),
            FramingRequest::BirdsEye => Some(birds_eye_pose(layouts, config)),
            FramingRequest::Profile(id) => {
                profile_pose(id, system, tree, registry, config)
            }
        };
        let Some(end) = end else {
            debug!(?request, "framing request dropped; target not resolvable this frame");
            return;
        };

        // Cancel-and-replace: two animations must never fight over the
        // camera transform.
        self.cancel_animation();

        let (duration, then) = match request {
            FramingRequest::Focus(id) => (config.animation.focus_duration, AfterAnimation::Follow(id)),
            FramingRequest::BirdsEye | FramingRequest::Profile(_) => {
                (config.animation.birdseye_duration, AfterAnimation::Idle)
            }
        };

        self.controls.enabled = false;
        self.state = CameraState::Animating(CameraAnimation {
            start_time: now,
            duration: duration.max(f64::EPSILON),
            start: self.pose,
            end,
            easing: config.animation.easing,
            then,
        });
    }

    fn focus_pose(
        &self,
        id: &Arc<str>,
        system: &SystemData,
        layouts: &LayoutMap,
        registry: &ObjectRegistry,
        config: &CameraModeConfig,
    ) -> Option<CameraPose> {
        let object = system.find(id)?;
        let live = resolve_position(registry, id)?;
        let visual_radius = layouts.get(id).map_or(1.0, |l| l.visual_radius.max(0.01));

        let distance = (visual_radius * config.radius_multiplier * type_multiplier(object))
            .clamp(
                visual_radius * config.min_distance_multiplier,
                visual_radius * config.max_distance_multiplier,
            )
            .clamp(config.absolute_min_distance, config.absolute_max_distance);

        Some(CameraPose {
            position: live + elevation_offset(distance, config.angles.default_elevation),
            target: live,
        })
    }

}

/// Coarse type-dependent focus distance multiplier, keyed off the
/// object's classification rather than its display name.
fn type_multiplier(object: &CelestialObject) -> f64 {
    match object.classification {
        Classification::Star | Classification::BlackHole => 3.0,
        _ if object.geometry_type == GeometryType::GasGiant => 2.2,
        _ => 1.5,
    }
}

fn elevation_offset(distance: f64, elevation: f64) -> Vector3<f64> {
    distance * Vector3::new(0.0, libm::sin(elevation), libm::cos(elevation))
}

fn resolve_position(registry: &ObjectRegistry, id: &str) -> Option<Vector3<f64>> {
    registry.resolve(id).map(|h| h.read().position)
}

/// Overview pose: the whole system from the configured elevation at the
/// outermost known orbit radius.
fn birds_eye_pose(layouts: &LayoutMap, config: &CameraModeConfig) -> CameraPose {
    let distance = max_orbit_extent(layouts).unwrap_or(DEFAULT_FRAMING_DISTANCE);
    CameraPose {
        position: elevation_offset(distance, config.angles.birdseye_elevation),
        target: Vector3::zeros(),
    }
}

/// Profile framing: midpoint between the focal object and its
/// outermost partner, camera backed off along the profile elevation.
///
/// Partner search is hierarchical, never a raw scene scan: the
/// outermost *child* when the focal object has any, otherwise the
/// farthest *sibling* measured from the focal object itself (measuring
/// from the parent instead yields a lopsided midpoint). Candidates come
/// from the system's object list, so cameras and lights can never be
/// picked as framing targets.
fn profile_pose(
    focal: &Arc<str>,
    system: &SystemData,
    tree: &SystemTree,
    registry: &ObjectRegistry,
    config: &CameraModeConfig,
) -> Option<CameraPose> {
    let focal_pos = resolve_position(registry, focal)?;

    let children = tree.children_of(focal);
    let candidates: Vec<&Arc<str>> = if children.is_empty() {
        match system.find(focal).and_then(|o| o.orbit.as_ref()) {
            Some(orbit) => tree
                .children_of(orbit.parent())
                .iter()
                .filter(|s| ***s != **focal)
                .collect(),
            None => Vec::new(),
        }
    } else {
        children.iter().collect()
    };

    let partner_pos = candidates
        .iter()
        .filter_map(|id| resolve_position(registry, id))
        .max_by_key(|pos| OrderedFloat((pos - focal_pos).norm()))
        // A truly isolated object frames against itself: zero span,
        // minimum distance.
        .unwrap_or(focal_pos);

    let midpoint = (focal_pos + partner_pos) / 2.0;
    let span = (partner_pos - focal_pos).norm();
    let distance = (span * 1.2).max(MIN_PROFILE_DISTANCE);
    if span == 0.0 {
        warn!(focal = %focal, "profile framing found no partner; orbiting the focal object alone");
    }

    Some(CameraPose {
        position: midpoint + elevation_offset(distance, config.angles.profile_elevation),
        target: midpoint,
    })
}
