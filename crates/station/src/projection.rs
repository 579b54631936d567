//! Station coordinate reprojection.

use crate::error::StationError;
use crate::station::{CoordinateKind, StationInfo};

/// Converts geographic coordinates (longitude, latitude in degrees) into
/// the project CRS.
pub trait CoordinateTransform {
    /// Projects one point.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::Configuration`] for points the transform
    /// cannot represent.
    fn to_project(&self, lon: f64, lat: f64) -> Result<(f64, f64), StationError>;
}

/// Leaves coordinates untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl CoordinateTransform for IdentityTransform {
    fn to_project(&self, lon: f64, lat: f64) -> Result<(f64, f64), StationError> {
        Ok((lon, lat))
    }
}

/// Local equirectangular projection in metres around an origin.
///
/// Accurate enough for nearest-station ranking over a single watershed.
#[derive(Debug, Clone, Copy)]
pub struct Equirectangular {
    lon0: f64,
    lat0: f64,
}

impl Equirectangular {
    /// Mean Earth radius in metres.
    pub const EARTH_RADIUS: f64 = 6_371_000.0;

    /// Creates a projection centred on (`lon0`, `lat0`) degrees.
    pub fn new(lon0: f64, lat0: f64) -> Self {
        Self { lon0, lat0 }
    }
}

impl CoordinateTransform for Equirectangular {
    fn to_project(&self, lon: f64, lat: f64) -> Result<(f64, f64), StationError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=360.0).contains(&lon) {
            return Err(StationError::Configuration {
                reason: format!("coordinate ({lon}, {lat}) is not a longitude/latitude pair"),
            });
        }
        let x = (lon - self.lon0).to_radians() * self.lat0.to_radians().cos() * Self::EARTH_RADIUS;
        let y = (lat - self.lat0).to_radians() * Self::EARTH_RADIUS;
        Ok((x, y))
    }
}

/// Sets `info.projected`: geographic stations go through `transform`,
/// projected ones keep their native coordinates.
///
/// # Errors
///
/// Propagates the transform's error, naming the station.
pub fn project(info: &mut StationInfo, transform: &dyn CoordinateTransform) -> Result<(), StationError> {
    let position = match info.kind {
        CoordinateKind::Projected => (info.x, info.y),
        CoordinateKind::Geographic => transform.to_project(info.x, info.y).map_err(|e| {
            StationError::Configuration {
                reason: format!("station '{}': {e}", info.name),
            }
        })?,
    };
    info.projected = Some(position);
    Ok(())
}
