//! View-mode configuration registry.
//!
//! A view mode is pure data: how real astronomical parameters map to
//! visual sizes and distances, plus the camera defaults for the mode.
//! Consumers branch on [`OrbitScalingRule`], never on mode ids, so
//! registering a new mode touches no consumer code.

use std::collections::HashMap;
use std::f64::consts;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bodies::{CelestialObject, Classification, GeometryType};
use crate::math::Easing;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ViewModeId(Arc<str>);

impl ViewModeId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn realistic() -> Self {
        Self::new("realistic")
    }

    pub fn navigational() -> Self {
        Self::new("navigational")
    }

    pub fn profile() -> Self {
        Self::new("profile")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-type visual size multipliers plus the sub-linear compression
/// exponent applied to real radii (km) before the multiplier. The
/// exponent keeps a star, a gas giant and a moon individually legible
/// despite orders-of-magnitude real-size differences.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectScaling {
    pub star: f64,
    pub planet: f64,
    pub moon: f64,
    pub gas_giant: f64,
    pub asteroid: f64,
    pub default: f64,
    pub radius_exponent: f64,
}

impl ObjectScaling {
    /// The multiplier for an object, derived from classification with
    /// the geometry type refining gas giants.
    pub fn factor_for(&self, object: &CelestialObject) -> f64 {
        if object.geometry_type == GeometryType::GasGiant {
            return self.gas_giant;
        }
        match object.classification {
            Classification::Star | Classification::BlackHole => self.star,
            Classification::Planet => self.planet,
            Classification::Moon | Classification::DwarfPlanet => self.moon,
            Classification::Belt => self.asteroid,
            Classification::JumpPoint | Classification::Station => self.default,
        }
    }
}

/// How real orbital distances map to scene distances.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitScalingRule {
    /// Distances proportional to the real semi-major axis.
    Proportional { system_scale: f64 },
    /// The Nth child of a parent sits at `N * spacing`, then the whole
    /// system is rescaled to match the realistic outermost extent.
    RankSpaced { spacing: f64 },
    /// Rank spacing laid out along a single axis for diagrammatic
    /// viewing.
    LinearRank { spacing: f64 },
}

impl OrbitScalingRule {
    /// Linear rules place objects on a line instead of animating them
    /// around an ellipse.
    pub fn is_linear(&self) -> bool {
        matches!(self, OrbitScalingRule::LinearRank { .. })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewingAngles {
    /// Elevation of the focus camera above the orbital plane (`rad`).
    pub default_elevation: f64,
    /// Elevation for the bird's-eye overview (`rad`).
    pub birdseye_elevation: f64,
    /// Elevation for profile framing (`rad`).
    pub profile_elevation: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraAnimationConfig {
    /// Seconds for a focus transition.
    pub focus_duration: f64,
    /// Seconds for bird's-eye and profile transitions.
    pub birdseye_duration: f64,
    pub easing: Easing,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraModeConfig {
    pub radius_multiplier: f64,
    pub min_distance_multiplier: f64,
    pub max_distance_multiplier: f64,
    pub absolute_min_distance: f64,
    pub absolute_max_distance: f64,
    pub angles: ViewingAngles,
    pub animation: CameraAnimationConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewModeConfig {
    pub id: ViewModeId,
    pub object_scaling: ObjectScaling,
    pub orbit_scaling: OrbitScalingRule,
    pub camera: CameraModeConfig,
}

/// All registered view modes. Created once at startup; read-only
/// afterwards.
#[derive(Clone, Debug, Default)]
pub struct ViewModeRegistry {
    modes: HashMap<ViewModeId, Arc<ViewModeConfig>>,
    order: Vec<ViewModeId>,
}

impl ViewModeRegistry {
    /// A registry holding the three built-in modes.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register(realistic_config());
        registry.register(navigational_config());
        registry.register(profile_config());
        registry
    }

    pub fn register(&mut self, config: ViewModeConfig) {
        let id = config.id.clone();
        if self.modes.insert(id.clone(), Arc::new(config)).is_none() {
            self.order.push(id);
        }
    }

    pub fn config(&self, id: &ViewModeId) -> Option<Arc<ViewModeConfig>> {
        self.modes.get(id).cloned()
    }

    /// Mode ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &ViewModeId> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

/// Scene units per `AU` in realistic mode. Rank-spaced modes rescale
/// their outermost object to match the extent this yields, so switching
/// modes never changes the system's apparent size.
pub const REALISTIC_SYSTEM_SCALE: f64 = 50.0;

fn default_angles() -> ViewingAngles {
    ViewingAngles {
        default_elevation: 30.0_f64.to_radians(),
        birdseye_elevation: 75.0_f64.to_radians(),
        profile_elevation: consts::FRAC_PI_8, // 22.5 degrees
    }
}

fn realistic_config() -> ViewModeConfig {
    ViewModeConfig {
        id: ViewModeId::realistic(),
        object_scaling: ObjectScaling {
            star: 1.0,
            planet: 0.6,
            moon: 0.4,
            gas_giant: 0.8,
            asteroid: 0.3,
            default: 0.5,
            // Realistic mode compresses size hardest and lets distance
            // carry the sense of scale.
            radius_exponent: 0.22,
        },
        orbit_scaling: OrbitScalingRule::Proportional {
            system_scale: REALISTIC_SYSTEM_SCALE,
        },
        camera: CameraModeConfig {
            radius_multiplier: 4.0,
            min_distance_multiplier: 2.0,
            max_distance_multiplier: 12.0,
            absolute_min_distance: 5.0,
            absolute_max_distance: 4000.0,
            angles: default_angles(),
            animation: CameraAnimationConfig {
                focus_duration: 1.2,
                birdseye_duration: 1.8,
                easing: Easing::EaseInOut,
            },
        },
    }
}

fn navigational_config() -> ViewModeConfig {
    ViewModeConfig {
        id: ViewModeId::navigational(),
        object_scaling: ObjectScaling {
            star: 1.2,
            planet: 0.9,
            moon: 0.6,
            gas_giant: 1.0,
            asteroid: 0.4,
            default: 0.7,
            radius_exponent: 0.3,
        },
        orbit_scaling: OrbitScalingRule::RankSpaced { spacing: 20.0 },
        camera: CameraModeConfig {
            radius_multiplier: 5.0,
            min_distance_multiplier: 2.5,
            max_distance_multiplier: 15.0,
            absolute_min_distance: 8.0,
            absolute_max_distance: 4000.0,
            angles: default_angles(),
            animation: CameraAnimationConfig {
                focus_duration: 0.9,
                birdseye_duration: 1.5,
                easing: Easing::Leap,
            },
        },
    }
}

fn profile_config() -> ViewModeConfig {
    ViewModeConfig {
        id: ViewModeId::profile(),
        object_scaling: ObjectScaling {
            star: 1.2,
            planet: 0.9,
            moon: 0.6,
            gas_giant: 1.0,
            asteroid: 0.4,
            default: 0.7,
            radius_exponent: 0.3,
        },
        orbit_scaling: OrbitScalingRule::LinearRank { spacing: 20.0 },
        camera: CameraModeConfig {
            radius_multiplier: 5.0,
            min_distance_multiplier: 2.5,
            max_distance_multiplier: 15.0,
            absolute_min_distance: 8.0,
            absolute_max_distance: 4000.0,
            angles: default_angles(),
            animation: CameraAnimationConfig {
                focus_duration: 0.9,
                birdseye_duration: 1.5,
                easing: Easing::Leap,
            },
        },
    }
}
