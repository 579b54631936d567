//! The net radiation engine and its day-of-year cache.

use hydromet_calendar::{DateHour, Doy, MAX_DOY};
use hydromet_zones::ZoneSet;
use tracing::{info, trace};

use crate::astro::{SurfaceGeometry, daily_extraterrestrial};
use crate::budget::{RadiationBudget, compute_budget};
use crate::error::RadiationError;
use crate::params::NetRadiationParams;

/// Albedo of snow-covered zones unless configured otherwise.
pub const DEFAULT_SNOW_ALBEDO: f64 = 0.8;

/// Daily net radiation of every zone.
///
/// Extraterrestrial radiation depends only on the day of year and the zone
/// geometry, so it is computed once per `(doy, zone)` and reused across
/// years.
#[derive(Debug, Clone)]
pub struct NetRadiation {
    zone_ids: Vec<i32>,
    geometry: Vec<SurfaceGeometry>,
    params: Vec<NetRadiationParams>,
    snow_albedo: f64,
    cache: Vec<Option<f64>>,
}

impl NetRadiation {
    /// Creates the engine for `zones`.
    ///
    /// # Errors
    ///
    /// Returns [`RadiationError::Configuration`] unless `timestep` is 24,
    /// when `params` does not hold one entry per zone, or for a zone with an
    /// invalid aspect code.
    pub fn new(zones: &ZoneSet, params: Vec<NetRadiationParams>, timestep: u16) -> Result<Self, RadiationError> {
        if timestep != 24 {
            return Err(RadiationError::Configuration {
                reason: format!("net radiation needs a daily timestep, got {timestep}h"),
            });
        }
        if params.len() != zones.len() {
            return Err(RadiationError::Configuration {
                reason: format!("{} net radiation parameter sets for {} zones", params.len(), zones.len()),
            });
        }
        let geometry = zones
            .iter()
            .map(SurfaceGeometry::from_zone)
            .collect::<Result<Vec<_>, _>>()?;
        info!(n_zones = zones.len(), "net radiation engine ready");
        Ok(Self {
            zone_ids: zones.iter().map(|z| z.id()).collect(),
            geometry,
            params,
            snow_albedo: DEFAULT_SNOW_ALBEDO,
            cache: vec![None; MAX_DOY as usize * zones.len()],
        })
    }

    /// Sets the albedo used for snow-covered zones.
    pub fn with_snow_albedo(mut self, albedo: f64) -> Self {
        self.snow_albedo = albedo;
        self
    }

    /// Number of zones.
    pub fn n_zones(&self) -> usize {
        self.geometry.len()
    }

    /// Snow albedo in use.
    pub fn snow_albedo(&self) -> f64 {
        self.snow_albedo
    }

    /// Cached extraterrestrial radiation, if already computed.
    pub fn cached(&self, doy: Doy, zone: usize) -> Option<f64> {
        self.cache.get(self.slot(doy, zone)?).copied().flatten()
    }

    /// Daily extraterrestrial radiation (MJ m⁻² d⁻¹) of the zone at index
    /// `zone`, computed on first use.
    ///
    /// # Errors
    ///
    /// Returns [`RadiationError::Configuration`] for an unknown zone index.
    pub fn extraterrestrial(&mut self, doy: Doy, zone: usize) -> Result<f64, RadiationError> {
        let slot = self.slot(doy, zone).ok_or_else(|| RadiationError::Configuration {
            reason: format!("zone index {zone} out of range ({} zones)", self.n_zones()),
        })?;
        if let Some(ra) = self.cache[slot] {
            return Ok(ra);
        }
        let ra = daily_extraterrestrial(doy, &self.geometry[zone]);
        trace!(zone = self.zone_ids[zone], doy = doy.get(), ra, "extraterrestrial radiation cached");
        self.cache[slot] = Some(ra);
        Ok(ra)
    }

    /// Net radiation budget of the zone at index `zone` on `date`.
    ///
    /// # Errors
    ///
    /// See [`NetRadiation::extraterrestrial`].
    pub fn compute(
        &mut self,
        date: DateHour,
        zone: usize,
        tmin: f64,
        tmax: f64,
        snow_covered: bool,
    ) -> Result<RadiationBudget, RadiationError> {
        let ra = self.extraterrestrial(date.day_of_year(), zone)?;
        let params = &self.params[zone];
        let albedo = if snow_covered { self.snow_albedo } else { params.albedo };
        Ok(compute_budget(ra, albedo, tmin, tmax, &params.coefficients))
    }

    fn slot(&self, doy: Doy, zone: usize) -> Option<usize> {
        (zone < self.n_zones()).then(|| doy.index() * self.n_zones() + zone)
    }
}
