//! Zone geometry and the zone collection.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::error::ZoneError;
use crate::table::read_table;

/// One simulated sub-watershed (UHRH).
///
/// Carries the geometry the forcing engines need: altitude for gradient
/// corrections, slope/aspect/location for radiation, and the parameter
/// group used by global parameter files.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    id: i32,
    altitude: f64,
    slope: f64,
    aspect: u8,
    latitude: f64,
    longitude: f64,
    group: u32,
}

impl Zone {
    /// Creates a flat, south-facing zone at (0, 0) in group 1.
    pub fn new(id: i32, altitude: f64) -> Self {
        Self {
            id,
            altitude,
            slope: 0.0,
            aspect: 7,
            latitude: 0.0,
            longitude: 0.0,
            group: 1,
        }
    }

    /// Sets the slope in degrees and the aspect octant code (1 = E, 2 = NE,
    /// 3 = N, 4 = NW, 5 = W, 6 = SW, 7 = S, 8 = SE).
    pub fn with_slope_aspect(mut self, slope_deg: f64, aspect: u8) -> Self {
        self.slope = slope_deg;
        self.aspect = aspect;
        self
    }

    /// Sets the zone centroid in decimal degrees.
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Sets the parameter group identifier.
    pub fn with_group(mut self, group: u32) -> Self {
        self.group = group;
        self
    }

    /// Zone identifier, as found in the zone raster.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Mean altitude in metres.
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Mean slope in degrees.
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Aspect octant code.
    pub fn aspect(&self) -> u8 {
        self.aspect
    }

    /// Centroid latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Centroid longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Parameter group identifier.
    pub fn group(&self) -> u32 {
        self.group
    }
}

/// Ordered collection of zones with an id→index lookup.
///
/// Zone indices (positions in the collection) are what every per-zone
/// vector in the workspace is indexed by.
#[derive(Debug, Clone, Default)]
pub struct ZoneSet {
    zones: Vec<Zone>,
    by_id: HashMap<i32, usize>,
}

impl ZoneSet {
    /// Builds a zone set.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Configuration`] if two zones share an id.
    pub fn new(zones: Vec<Zone>) -> Result<Self, ZoneError> {
        let mut by_id = HashMap::with_capacity(zones.len());
        for (index, zone) in zones.iter().enumerate() {
            if by_id.insert(zone.id, index).is_some() {
                return Err(ZoneError::Configuration {
                    reason: format!("duplicate zone id {}", zone.id),
                });
            }
        }
        Ok(Self { zones, by_id })
    }

    /// Reads zones from a semicolon table:
    /// `id;altitude;slope_deg;aspect_code;latitude;longitude;group_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::FileRead`] on malformed rows, or
    /// [`ZoneError::Configuration`] on duplicate ids.
    pub fn load_csv(path: &Path) -> Result<Self, ZoneError> {
        let rows = read_table(path)?;
        let mut zones = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = row.id(0, path)?;
            let id = i32::try_from(id)
                .map_err(|_| ZoneError::at_line(path, row.line, format!("zone id {id} out of range")))?;
            let aspect = row.id(3, path)?;
            let aspect = u8::try_from(aspect)
                .map_err(|_| ZoneError::at_line(path, row.line, format!("aspect code {aspect} out of range")))?;
            let group = row.id(6, path)?;
            let group = u32::try_from(group)
                .map_err(|_| ZoneError::at_line(path, row.line, format!("group id {group} out of range")))?;
            zones.push(
                Zone::new(id, row.float(1, path)?)
                    .with_slope_aspect(row.float(2, path)?, aspect)
                    .with_location(row.float(4, path)?, row.float(5, path)?)
                    .with_group(group),
            );
        }
        info!(path = %path.display(), n_zones = zones.len(), "zones loaded");
        Self::new(zones)
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns `true` if there are no zones.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zone at `index`.
    pub fn get(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    /// Index of the zone with identifier `id`.
    pub fn index_of(&self, id: i32) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Iterates zones in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Zone> {
        self.zones.iter()
    }

    /// All zones as a slice.
    pub fn as_slice(&self) -> &[Zone] {
        &self.zones
    }
}

impl<'a> IntoIterator for &'a ZoneSet {
    type Item = &'a Zone;
    type IntoIter = std::slice::Iter<'a, Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.zones.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_lookup() {
        let set = ZoneSet::new(vec![Zone::new(10, 200.0), Zone::new(3, 450.0)]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.index_of(3), Some(1));
        assert_eq!(set.index_of(99), None);
        assert_eq!(set.get(0).map(Zone::id), Some(10));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = ZoneSet::new(vec![Zone::new(1, 0.0), Zone::new(1, 5.0)]).unwrap_err();
        assert!(matches!(err, ZoneError::Configuration { .. }));
    }

    #[test]
    fn builder_sets_geometry() {
        let zone = Zone::new(4, 812.5)
            .with_slope_aspect(12.0, 2)
            .with_location(46.8, -71.2)
            .with_group(3);
        assert_eq!(zone.slope(), 12.0);
        assert_eq!(zone.aspect(), 2);
        assert_eq!(zone.latitude(), 46.8);
        assert_eq!(zone.longitude(), -71.2);
        assert_eq!(zone.group(), 3);
    }
}
