//! Solar geometry and extraterrestrial radiation on inclined surfaces.
//!
//! Angles are radians internally; the day-of-year formulas follow FAO-56
//! and the incidence angle on a tilted plane follows Duffie & Beckman, with
//! the surface azimuth measured from south, east negative.

use std::f64::consts::PI;

use hydromet_calendar::Doy;
use hydromet_zones::Zone;

use crate::error::RadiationError;

/// Solar constant (MJ m⁻² min⁻¹).
pub const SOLAR_CONSTANT: f64 = 0.0820;

/// Hour angle swept in five minutes.
const SWEEP_STEP: f64 = 5.0 / 60.0 * PI / 12.0;

/// Compass azimuth (degrees, north = 0, clockwise) of an aspect octant
/// code: 1 = E, 2 = NE, 3 = N, 4 = NW, 5 = W, 6 = SW, 7 = S, 8 = SE.
///
/// # Errors
///
/// Returns [`RadiationError::Configuration`] for any other code.
pub fn aspect_azimuth(code: u8) -> Result<f64, RadiationError> {
    match code {
        1 => Ok(90.0),
        2 => Ok(45.0),
        3 => Ok(0.0),
        4 => Ok(315.0),
        5 => Ok(270.0),
        6 => Ok(225.0),
        7 => Ok(180.0),
        8 => Ok(135.0),
        other => Err(RadiationError::Configuration {
            reason: format!("aspect code {other} is not an octant (1-8)"),
        }),
    }
}

/// Orientation and location of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    latitude: f64,
    longitude: f64,
    slope: f64,
    azimuth: f64,
}

impl SurfaceGeometry {
    /// Creates a surface from degrees; `aspect_deg` is a compass azimuth.
    pub fn new(latitude_deg: f64, longitude_deg: f64, slope_deg: f64, aspect_deg: f64) -> Self {
        Self {
            latitude: latitude_deg.to_radians(),
            longitude: longitude_deg,
            slope: slope_deg.to_radians(),
            azimuth: (aspect_deg - 180.0).to_radians(),
        }
    }

    /// A horizontal surface.
    pub fn flat(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self::new(latitude_deg, longitude_deg, 0.0, 180.0)
    }

    /// Geometry of `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`RadiationError::Configuration`] naming the zone if its
    /// aspect code is invalid.
    pub fn from_zone(zone: &Zone) -> Result<Self, RadiationError> {
        let aspect = aspect_azimuth(zone.aspect()).map_err(|e| RadiationError::Configuration {
            reason: format!("zone {}: {e}", zone.id()),
        })?;
        Ok(Self::new(zone.latitude(), zone.longitude(), zone.slope(), aspect))
    }

    /// Latitude in radians.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Cosine of the sun's incidence angle on the surface, negative when
    /// the sun is behind it.
    pub fn incidence_cosine(&self, declination: f64, hour_angle: f64) -> f64 {
        let (sin_d, cos_d) = declination.sin_cos();
        let (sin_p, cos_p) = self.latitude.sin_cos();
        let (sin_b, cos_b) = self.slope.sin_cos();
        let (sin_g, cos_g) = self.azimuth.sin_cos();
        let (sin_w, cos_w) = hour_angle.sin_cos();
        sin_d * sin_p * cos_b - sin_d * cos_p * sin_b * cos_g
            + cos_d * cos_p * cos_b * cos_w
            + cos_d * sin_p * sin_b * cos_g * cos_w
            + cos_d * sin_b * sin_g * sin_w
    }
}

fn year_angle(doy: Doy) -> f64 {
    2.0 * PI * f64::from(doy.get()) / 365.0
}

/// Solar declination (rad).
pub fn declination(doy: Doy) -> f64 {
    0.409 * (year_angle(doy) - 1.39).sin()
}

/// Inverse relative Earth-Sun distance.
pub fn inverse_relative_distance(doy: Doy) -> f64 {
    1.0 + 0.033 * year_angle(doy).cos()
}

/// Sunset hour angle (rad) of a horizontal surface, 0 in polar night and
/// π in polar day.
pub fn sunset_hour_angle(latitude: f64, declination: f64) -> f64 {
    (-latitude.tan() * declination.tan()).clamp(-1.0, 1.0).acos()
}

/// Equation of time (hours), Spencer (1971).
pub fn equation_of_time(doy: Doy) -> f64 {
    let b = 2.0 * PI * f64::from(doy.get() - 1) / 365.0;
    let minutes = 229.18
        * (0.000075 + 0.001868 * b.cos() - 0.032077 * b.sin() - 0.014615 * (2.0 * b).cos()
            - 0.040849 * (2.0 * b).sin());
    minutes / 60.0
}

/// Daily extraterrestrial radiation on a horizontal surface (MJ m⁻² d⁻¹),
/// FAO-56 equation 21.
pub fn flat_daily_extraterrestrial(doy: Doy, latitude_deg: f64) -> f64 {
    let latitude = latitude_deg.to_radians();
    let decl = declination(doy);
    let ws = sunset_hour_angle(latitude, decl);
    24.0 * 60.0 / PI
        * SOLAR_CONSTANT
        * inverse_relative_distance(doy)
        * (ws * latitude.sin() * decl.sin() + latitude.cos() * decl.cos() * ws.sin())
}

/// Daily extraterrestrial radiation on `geometry` (MJ m⁻² d⁻¹).
///
/// Integrates the positive incidence cosine from sunrise to sunset of the
/// horizontal surface with the midpoint rule on sub-intervals of at most
/// five minutes.
pub fn daily_extraterrestrial(doy: Doy, geometry: &SurfaceGeometry) -> f64 {
    let decl = declination(doy);
    let ws = sunset_hour_angle(geometry.latitude, decl);
    if ws <= 0.0 {
        return 0.0;
    }
    let n = (2.0 * ws / SWEEP_STEP).ceil().max(1.0) as usize;
    let h = 2.0 * ws / n as f64;
    let integral: f64 = (0..n)
        .map(|i| {
            let hour_angle = -ws + (i as f64 + 0.5) * h;
            geometry.incidence_cosine(decl, hour_angle).max(0.0)
        })
        .sum::<f64>()
        * h;
    12.0 * 60.0 / PI * SOLAR_CONSTANT * inverse_relative_distance(doy) * integral
}

/// Extraterrestrial irradiance on `geometry` at `hour_utc` (MJ m⁻² h⁻¹).
///
/// Clock time is converted to solar time with the surface longitude and
/// the equation of time. Zero while the sun is below the horizon or behind
/// the surface.
pub fn instant_extraterrestrial(doy: Doy, hour_utc: f64, geometry: &SurfaceGeometry) -> f64 {
    let decl = declination(doy);
    let solar_time = hour_utc + geometry.longitude / 15.0 + equation_of_time(doy);
    let hour_angle = (solar_time - 12.0) * PI / 12.0;
    let horizon = SurfaceGeometry::flat(geometry.latitude.to_degrees(), geometry.longitude);
    if horizon.incidence_cosine(decl, hour_angle) <= 0.0 {
        return 0.0;
    }
    60.0 * SOLAR_CONSTANT * inverse_relative_distance(doy) * geometry.incidence_cosine(decl, hour_angle).max(0.0)
}
