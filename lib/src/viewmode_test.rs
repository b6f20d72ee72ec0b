use std::f64::consts;

use crate::math::Easing;
use crate::viewmode::{
    CameraAnimationConfig, CameraModeConfig, ObjectScaling, OrbitScalingRule, ViewModeConfig,
    ViewModeId, ViewModeRegistry, ViewingAngles,
};

#[test]
fn builtin_registry_has_three_modes() {
    let registry = ViewModeRegistry::builtin();
    assert_eq!(registry.len(), 3);

    let ids: Vec<&ViewModeId> = registry.ids().collect();
    assert_eq!(ids[0], &ViewModeId::realistic());
    assert_eq!(ids[1], &ViewModeId::navigational());
    assert_eq!(ids[2], &ViewModeId::profile());

    for id in [
        ViewModeId::realistic(),
        ViewModeId::navigational(),
        ViewModeId::profile(),
    ] {
        assert!(registry.config(&id).is_some(), "missing builtin mode {id}");
    }
}

#[test]
fn builtin_scaling_rules() {
    let registry = ViewModeRegistry::builtin();
    let realistic = registry.config(&ViewModeId::realistic()).unwrap();
    let navigational = registry.config(&ViewModeId::navigational()).unwrap();
    let profile = registry.config(&ViewModeId::profile()).unwrap();

    assert!(matches!(
        realistic.orbit_scaling,
        OrbitScalingRule::Proportional { .. }
    ));
    assert!(matches!(
        navigational.orbit_scaling,
        OrbitScalingRule::RankSpaced { .. }
    ));
    assert!(profile.orbit_scaling.is_linear());
    assert!(!navigational.orbit_scaling.is_linear());

    // Profile framing sights down a 22.5 degree elevation by default.
    assert!((profile.camera.angles.profile_elevation - consts::FRAC_PI_8).abs() < 1e-12);
}

#[test]
fn registering_a_mode_is_data_only() {
    let mut registry = ViewModeRegistry::builtin();
    let id = ViewModeId::new("cinematic");
    registry.register(ViewModeConfig {
        id: id.clone(),
        object_scaling: ObjectScaling {
            star: 1.0,
            planet: 1.0,
            moon: 1.0,
            gas_giant: 1.0,
            asteroid: 1.0,
            default: 1.0,
            radius_exponent: 0.25,
        },
        orbit_scaling: OrbitScalingRule::Proportional { system_scale: 10.0 },
        camera: CameraModeConfig {
            radius_multiplier: 3.0,
            min_distance_multiplier: 1.5,
            max_distance_multiplier: 10.0,
            absolute_min_distance: 5.0,
            absolute_max_distance: 1000.0,
            angles: ViewingAngles {
                default_elevation: 0.5,
                birdseye_elevation: 1.2,
                profile_elevation: consts::FRAC_PI_8,
            },
            animation: CameraAnimationConfig {
                focus_duration: 1.0,
                birdseye_duration: 1.0,
                easing: Easing::Linear,
            },
        },
    });

    assert_eq!(registry.len(), 4);
    assert!(registry.config(&id).is_some());
    // Built-ins are untouched by the registration.
    assert!(registry.config(&ViewModeId::realistic()).is_some());
}
