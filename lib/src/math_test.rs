use std::f64::consts;

use nalgebra::Vector3;

use crate::math::{lerp_vec, wrap_angle, Easing};

#[test]
fn easing_endpoints() {
    for easing in [Easing::Linear, Easing::EaseOut, Easing::EaseInOut, Easing::Leap] {
        assert!(easing.apply(0.0).abs() < 1e-9, "{easing:?} should start at 0");
        assert!(
            (easing.apply(1.0) - 1.0).abs() < 1e-9,
            "{easing:?} should end at 1"
        );
    }
}

#[test]
fn easing_is_monotonic() {
    for easing in [Easing::Linear, Easing::EaseOut, Easing::EaseInOut, Easing::Leap] {
        let mut prev = easing.apply(0.0);
        for i in 1..=100 {
            let next = easing.apply(i as f64 / 100.0);
            assert!(
                next >= prev - 1e-12,
                "{easing:?} decreased between steps {} and {}",
                i - 1,
                i
            );
            prev = next;
        }
    }
}

#[test]
fn easing_clamps_out_of_range_progress() {
    assert!(Easing::Leap.apply(-0.5).abs() < 1e-12);
    assert!((Easing::Leap.apply(1.5) - 1.0).abs() < 1e-9);
}

#[test]
fn leap_accelerates_early() {
    // The leap curve front-loads acceleration before settling.
    assert!((Easing::Leap.apply(0.299) - 0.299 * 0.299 * 3.33).abs() < 1e-9);
    assert!((Easing::Leap.apply(0.3) - 0.33).abs() < 1e-9);
    assert!(Easing::Leap.apply(0.15) < Easing::Linear.apply(0.15));
    assert!(Easing::Leap.apply(0.6) > Easing::Linear.apply(0.6));
}

#[test]
fn vector_lerp() {
    let a = Vector3::new(0.0, 0.0, 0.0);
    let b = Vector3::new(10.0, -4.0, 2.0);
    assert_eq!(lerp_vec(a, b, 0.5), Vector3::new(5.0, -2.0, 1.0));
    assert_eq!(lerp_vec(a, b, 0.0), a);
    assert_eq!(lerp_vec(a, b, 1.0), b);
}

#[test]
fn angle_wrapping() {
    assert!((wrap_angle(-consts::FRAC_PI_2) - 1.5 * consts::PI).abs() < 1e-12);
    assert!((wrap_angle(2.5 * consts::PI) - consts::FRAC_PI_2).abs() < 1e-12);
    assert!(wrap_angle(0.0).abs() < 1e-12);
}
