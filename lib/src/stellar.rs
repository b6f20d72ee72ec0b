//! Stellar zone calculations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bodies::PhysicalProperties;

pub const SOLAR_TEMPERATURE: f64 = 5772.0;
pub const SOLAR_RADIUS_KM: f64 = 695_700.0;

/// Habitable-zone edges and snow line, in `AU` from the star.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StellarZones {
    pub habitable_inner: f64,
    pub habitable_outer: f64,
    pub snow_line: f64,
}

/// Luminosity in solar luminosities: the explicit value when present,
/// otherwise Stefan-Boltzmann from radius and effective temperature.
pub fn luminosity(props: &PhysicalProperties) -> f64 {
    props.luminosity.unwrap_or_else(|| {
        let r = props.radius / SOLAR_RADIUS_KM;
        let t = props.temperature / SOLAR_TEMPERATURE;
        r * r * libm::pow(t, 4.0)
    })
}

pub fn zones(luminosity: f64) -> StellarZones {
    StellarZones {
        habitable_inner: libm::sqrt(luminosity / 1.1),
        habitable_outer: libm::sqrt(luminosity / 0.36),
        snow_line: snow_line(luminosity),
    }
}

/// Snow line location in `AU`.
pub fn snow_line(luminosity: f64) -> f64 {
    2.7 * libm::sqrt(luminosity)
}

/// Main-sequence spectral class by effective temperature.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpectralClass {
    O,
    B,
    A,
    F,
    G,
    K,
    M,
}

pub fn spectral_class(temperature: f64) -> SpectralClass {
    match temperature {
        t if t >= 30_000.0 => SpectralClass::O,
        t if t >= 10_000.0 => SpectralClass::B,
        t if t >= 7_500.0 => SpectralClass::A,
        t if t >= 6_000.0 => SpectralClass::F,
        t if t >= 5_200.0 => SpectralClass::G,
        t if t >= 3_700.0 => SpectralClass::K,
        _ => SpectralClass::M,
    }
}

impl fmt::Display for SpectralClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpectralClass::O => "O",
            SpectralClass::B => "B",
            SpectralClass::A => "A",
            SpectralClass::F => "F",
            SpectralClass::G => "G",
            SpectralClass::K => "K",
            SpectralClass::M => "M",
        };
        write!(f, "{s}")
    }
}
