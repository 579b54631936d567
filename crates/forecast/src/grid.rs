//! The forecast grid engine: pixel-to-zone repartition of gridded forecasts.

use std::path::{Path, PathBuf};

use hydromet_calendar::DateHour;
use hydromet_station::WeatherSample;
use hydromet_zones::{Zone, ZoneSet};
use tracing::{debug, info, warn};

use crate::altitude::PixelAltitudes;
use crate::density::{HedstromPomeroy, SnowDensity};
use crate::error::ForecastError;
use crate::grp::{ForecastGridConfig, ForecastVariable};
use crate::params::ZoneForecastParams;
use crate::phase;
use crate::raster::{AsciiGridReader, GridGeometry, Raster, RasterSource};
use crate::weights::PixelWeights;

/// Caches built by [`ForecastGrid::initialise`].
#[derive(Debug)]
struct GridState {
    geometry: GridGeometry,
    weights: PixelWeights,
    altitudes: PixelAltitudes,
}

/// Distributes daily gridded forecasts onto zones.
///
/// Build with [`ForecastGrid::new`] and the `with_*` methods, call
/// [`initialise`](Self::initialise) once, then [`compute`](Self::compute)
/// every timestep.
#[derive(Debug)]
pub struct ForecastGrid {
    config: ForecastGridConfig,
    zone_raster: PathBuf,
    dem: PathBuf,
    timestep: u16,
    params: Vec<ZoneForecastParams>,
    source: Box<dyn RasterSource>,
    density: Box<dyn SnowDensity>,
    state: Option<GridState>,
}

impl ForecastGrid {
    /// Creates an engine for the rasters described by `config`, with the
    /// zone-id raster and DEM used to build the caches.
    ///
    /// Defaults: daily timestep, default parameters for every zone, ESRI
    /// ASCII rasters, Hedstrom-Pomeroy snow density.
    pub fn new(config: ForecastGridConfig, zone_raster: impl Into<PathBuf>, dem: impl Into<PathBuf>) -> Self {
        Self {
            config,
            zone_raster: zone_raster.into(),
            dem: dem.into(),
            timestep: 24,
            params: Vec::new(),
            source: Box::new(AsciiGridReader),
            density: Box::new(HedstromPomeroy),
            state: None,
        }
    }

    /// Sets the simulation timestep in hours.
    pub fn with_timestep(mut self, hours: u16) -> Self {
        self.timestep = hours;
        self
    }

    /// Sets one parameter set per zone index.
    pub fn with_params(mut self, params: Vec<ZoneForecastParams>) -> Self {
        self.params = params;
        self
    }

    /// Replaces the raster reader.
    pub fn with_raster_source(mut self, source: Box<dyn RasterSource>) -> Self {
        self.source = source;
        self
    }

    /// Replaces the snow density model.
    pub fn with_snow_density(mut self, density: Box<dyn SnowDensity>) -> Self {
        self.density = density;
        self
    }

    /// The parsed `.grp` description.
    pub fn config(&self) -> &ForecastGridConfig {
        &self.config
    }

    /// Simulation timestep in hours.
    pub fn timestep(&self) -> u16 {
        self.timestep
    }

    /// Forecast grid geometry, once initialised.
    pub fn geometry(&self) -> Option<&GridGeometry> {
        self.state.as_ref().map(|s| &s.geometry)
    }

    /// Pixel weights, once initialised.
    pub fn weights(&self) -> Option<&PixelWeights> {
        self.state.as_ref().map(|s| &s.weights)
    }

    /// Pixel altitudes, once initialised.
    pub fn altitudes(&self) -> Option<&PixelAltitudes> {
        self.state.as_ref().map(|s| &s.altitudes)
    }

    /// Validates the timestep and the zone parameters.
    ///
    /// Returns an error if the timestep does not divide a day or a
    /// parameter is not finite.
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.timestep == 0 || 24 % self.timestep != 0 {
            return Err(ForecastError::Configuration {
                reason: format!("timestep {}h does not divide a day", self.timestep),
            });
        }
        for (index, p) in self.params.iter().enumerate() {
            if ![p.temperature_gradient, p.precipitation_gradient, p.rain_snow_threshold]
                .iter()
                .all(|v| v.is_finite())
            {
                return Err(ForecastError::Configuration {
                    reason: format!("non-finite forecast parameter for zone index {index}"),
                });
            }
        }
        Ok(())
    }

    /// Loads or builds the weighting and altitude caches.
    ///
    /// The forecast geometry comes from the tmin raster of `start`. A
    /// sidecar that is absent or inconsistent with `zones` is rebuilt and
    /// saved.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Configuration`] for a bad timestep or a
    /// parameter count that does not match `zones`, and any raster or
    /// sidecar I/O error.
    pub fn initialise(&mut self, zones: &ZoneSet, start: DateHour) -> Result<(), ForecastError> {
        self.validate()?;
        if self.params.is_empty() {
            self.params = vec![ZoneForecastParams::default(); zones.len()];
        } else if self.params.len() != zones.len() {
            return Err(ForecastError::Configuration {
                reason: format!("{} forecast parameter sets for {} zones", self.params.len(), zones.len()),
            });
        }

        let reference = self.read_raster(&self.config.raster_path(start, ForecastVariable::Tmin))?;
        let geometry = *reference.geometry();

        let weights_path = self.config.weights_path();
        let weights = match PixelWeights::load(&weights_path, zones.len(), geometry.len()) {
            Ok(weights) => {
                info!(path = %weights_path.display(), "weighting cache loaded");
                weights
            }
            Err(e @ (ForecastError::FileNotFound { .. } | ForecastError::DataIntegrity { .. })) => {
                if let ForecastError::DataIntegrity { reason } = &e {
                    warn!(path = %weights_path.display(), %reason, "discarding weighting cache");
                }
                let zone_raster = self.read_raster(&self.zone_raster)?;
                let weights = PixelWeights::compute(&zone_raster, &geometry, zones);
                weights.save(&weights_path)?;
                info!(path = %weights_path.display(), "weighting cache built");
                weights
            }
            Err(e) => return Err(e),
        };

        let altitudes_path = self.config.altitudes_path();
        let altitudes = match PixelAltitudes::load(&altitudes_path, geometry.len()) {
            Ok(altitudes) => {
                info!(path = %altitudes_path.display(), "altitude cache loaded");
                altitudes
            }
            Err(e @ (ForecastError::FileNotFound { .. } | ForecastError::DataIntegrity { .. })) => {
                if let ForecastError::DataIntegrity { reason } = &e {
                    warn!(path = %altitudes_path.display(), %reason, "discarding altitude cache");
                }
                let dem = self.read_raster(&self.dem)?;
                let altitudes = PixelAltitudes::compute(&dem, &geometry);
                altitudes.save(&altitudes_path)?;
                info!(path = %altitudes_path.display(), "altitude cache built");
                altitudes
            }
            Err(e) => return Err(e),
        };

        self.state = Some(GridState {
            geometry,
            weights,
            altitudes,
        });
        Ok(())
    }

    /// Zone forcing for `date`: [`distribute`](Self::distribute), followed
    /// by [`partition_phase`](Self::partition_phase) when the rasters hold
    /// total precipitation.
    ///
    /// # Errors
    ///
    /// See [`ForecastGrid::distribute`].
    pub fn compute(&self, date: DateHour, zones: &ZoneSet) -> Result<Vec<WeatherSample>, ForecastError> {
        let mut samples = self.distribute(date, zones)?;
        if self.config.total_precipitation() {
            self.partition_phase(&mut samples);
        }
        Ok(samples)
    }

    /// Area-weighted, elevation-corrected zone values for `date`.
    ///
    /// Temperatures are `v + gradient × Δz / 100` and precipitation
    /// `v × (1 + gradient / 100 × Δz)` clamped at zero, with `Δz` the zone
    /// altitude minus the pixel altitude. Missing pixels are skipped and
    /// the sum is divided by the weights actually used. Snow is returned
    /// as a depth.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Configuration`] before initialisation,
    /// [`ForecastError::FileNotFound`] naming the expected raster, and
    /// [`ForecastError::DataIntegrity`] when a raster or `zones` disagree
    /// with the caches.
    pub fn distribute(&self, date: DateHour, zones: &ZoneSet) -> Result<Vec<WeatherSample>, ForecastError> {
        let state = self.state.as_ref().ok_or_else(|| ForecastError::Configuration {
            reason: "forecast grid used before initialise".to_string(),
        })?;
        if zones.len() != state.weights.n_zones() {
            return Err(ForecastError::DataIntegrity {
                reason: format!(
                    "weights cover {} zones, {} simulated",
                    state.weights.n_zones(),
                    zones.len()
                ),
            });
        }

        let read = |variable| self.read_forecast(date, variable, &state.geometry);
        let tmin = read(ForecastVariable::Tmin)?;
        let tmax = read(ForecastVariable::Tmax)?;
        let precipitation = read(ForecastVariable::Precipitation)?;
        let snow = if self.config.total_precipitation() {
            None
        } else {
            Some(read(ForecastVariable::Snow)?)
        };

        let mut samples = Vec::with_capacity(zones.len());
        let mut without_data = 0usize;
        for (index, zone) in zones.iter().enumerate() {
            let params = self.zone_params(index);
            let pixels = state.weights.zone(index);
            let dz = |pixel: usize| zone_offset(zone, state.altitudes.get(pixel));
            let temperature = |v: f64, pixel: usize| v + params.temperature_gradient * dz(pixel) / 100.0;
            let precip = |v: f64, pixel: usize| (v * (1.0 + params.precipitation_gradient / 100.0 * dz(pixel))).max(0.0);

            let zone_tmin = weighted_mean(pixels, &tmin, temperature);
            let zone_tmax = weighted_mean(pixels, &tmax, temperature);
            let rain = weighted_mean(pixels, &precipitation, precip);
            let snow = match &snow {
                Some(raster) => weighted_mean(pixels, raster, precip)
                    .zip(mean_temperature(zone_tmin, zone_tmax))
                    .map(|(we, t)| self.density.depth(we, t)),
                None => rain.map(|_| 0.0),
            };

            let sample = WeatherSample {
                tmin: zone_tmin,
                tmax: zone_tmax,
                rain,
                snow,
            };
            if !sample.is_filled() {
                without_data += 1;
            }
            samples.push(sample);
        }

        if without_data > 0 {
            warn!(%date, n_zones = without_data, "forecast zones left without data");
        }
        debug!(%date, n_zones = samples.len(), "forecast distributed");
        Ok(samples)
    }

    /// Repartitions each zone's precipitation between rain and snow from
    /// its temperatures and threshold. Zones lacking a temperature or
    /// precipitation are left untouched.
    pub fn partition_phase(&self, samples: &mut [WeatherSample]) {
        for (index, sample) in samples.iter_mut().enumerate() {
            let (Some(tmin), Some(tmax), Some(rain)) = (sample.tmin, sample.tmax, sample.rain) else {
                continue;
            };
            let mean = (tmin + tmax) / 2.0;
            let snow_we = sample.snow.map_or(0.0, |depth| self.density.water_equivalent(depth, mean));
            let (rain, snow_we) = phase::partition_phase(
                rain,
                snow_we,
                tmin,
                tmax,
                self.zone_params(index).rain_snow_threshold,
                self.timestep,
            );
            sample.rain = Some(rain);
            sample.snow = Some(self.density.depth(snow_we, mean));
        }
    }

    fn zone_params(&self, index: usize) -> ZoneForecastParams {
        self.params.get(index).copied().unwrap_or_default()
    }

    fn read_raster(&self, path: &Path) -> Result<Raster, ForecastError> {
        debug!(path = %path.display(), "reading raster");
        self.source.read(path)
    }

    fn read_forecast(
        &self,
        date: DateHour,
        variable: ForecastVariable,
        geometry: &GridGeometry,
    ) -> Result<Raster, ForecastError> {
        let path = self.config.raster_path(date, variable);
        let raster = self.read_raster(&path)?;
        if !raster.geometry().matches(geometry) {
            return Err(ForecastError::DataIntegrity {
                reason: format!(
                    "{} is {}x{}, cached grid is {}x{}",
                    path.display(),
                    raster.geometry().nrows,
                    raster.geometry().ncols,
                    geometry.nrows,
                    geometry.ncols
                ),
            });
        }
        Ok(raster)
    }
}

/// Zone altitude minus pixel altitude; 0 where the DEM did not cover the
/// pixel.
fn zone_offset(zone: &Zone, pixel_altitude: Option<f64>) -> f64 {
    pixel_altitude.map_or(0.0, |altitude| zone.altitude() - altitude)
}

fn mean_temperature(tmin: Option<f64>, tmax: Option<f64>) -> Option<f64> {
    Some((tmin? + tmax?) / 2.0)
}

/// Weighted mean of `adjust`ed pixel values over the pixels that hold one.
fn weighted_mean(pixels: &[(usize, f64)], raster: &Raster, adjust: impl Fn(f64, usize) -> f64) -> Option<f64> {
    let (sum, used) = pixels
        .iter()
        .filter_map(|&(pixel, weight)| raster.value(pixel).map(|v| (adjust(v, pixel) * weight, weight)))
        .fold((0.0, 0.0), |(sum, used), (value, weight)| (sum + value, used + weight));
    (used > 0.0).then(|| sum / used)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn weighted_mean_skips_missing_pixels() {
        let raster = Raster::new(GridGeometry::new(3, 1, 0.0, 1.0, 1.0), None, vec![10.0, -999.0, 40.0]).unwrap();
        let pixels = [(0, 0.5), (1, 0.25), (2, 0.25)];
        let mean = weighted_mean(&pixels, &raster, |v, _| v).unwrap();
        assert_abs_diff_eq!(mean, (5.0 + 10.0) / 0.75, epsilon = 1e-12);
        assert_eq!(weighted_mean(&[(1, 1.0)], &raster, |v, _| v), None);
    }

    #[test]
    fn uncovered_pixel_has_no_offset() {
        let zone = Zone::new(1, 800.0);
        assert_eq!(zone_offset(&zone, None), 0.0);
        assert_eq!(zone_offset(&zone, Some(500.0)), 300.0);
    }

    fn grid() -> ForecastGrid {
        let text = "1\nmm\n0\ndaily\n22 24 rasters\nfc_\n4\n.tn\n.tx\n.pr\n.sn\n";
        let config = ForecastGridConfig::parse(Path::new("fc.grp"), text).unwrap();
        ForecastGrid::new(config, "zones.asc", "dem.asc")
    }

    #[test]
    fn validate_rejects_uneven_timestep() {
        assert!(grid().validate().is_ok());
        assert!(grid().with_timestep(6).validate().is_ok());
        let err = grid().with_timestep(5).validate().unwrap_err();
        assert!(matches!(err, ForecastError::Configuration { .. }));
    }

    #[test]
    fn validate_rejects_non_finite_parameters() {
        let params = vec![ZoneForecastParams {
            temperature_gradient: f64::NAN,
            ..ZoneForecastParams::default()
        }];
        let err = grid().with_params(params).validate().unwrap_err();
        assert!(err.to_string().contains("zone index 0"));
    }

    #[test]
    fn partition_keeps_missing_precipitation_missing() {
        let grid = grid();
        let mut samples = [
            WeatherSample {
                tmin: Some(-3.0),
                tmax: Some(4.0),
                rain: None,
                snow: None,
            },
            WeatherSample {
                tmin: None,
                tmax: Some(4.0),
                rain: Some(5.0),
                snow: Some(0.0),
            },
        ];
        let before = samples;
        grid.partition_phase(&mut samples);
        assert_eq!(samples, before);
    }
}
