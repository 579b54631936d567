//! Nearest-station filling of missing samples.

use hydromet_calendar::DateHour;

use crate::sample::{TemperatureMode, WeatherSample};
use crate::series::SampleSeries;
use crate::station::Station;

/// Gradient (per 100 m) used for every variable by [`InterpolationVersion::V1`].
pub const V1_GRADIENT: f64 = -0.5;

/// Missing-data interpolation algorithm, fixed when a station set is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterpolationVersion {
    /// Fixed -0.5/100 m gradient for temperature and precipitation, applied
    /// to dry donors as well. Temperatures are stored as given.
    V1,
    /// Configured gradients; a dry donor stays dry. Temperatures are kept
    /// ordered.
    V2 {
        /// Temperature change per 100 m of altitude (°C).
        temperature_gradient: f64,
        /// Precipitation change per 100 m of altitude (mm).
        precipitation_gradient: f64,
    },
}

impl Default for InterpolationVersion {
    fn default() -> Self {
        InterpolationVersion::V2 {
            temperature_gradient: V1_GRADIENT,
            precipitation_gradient: 0.0,
        }
    }
}

impl InterpolationVersion {
    /// How this version writes temperatures into samples.
    pub fn temperature_mode(self) -> TemperatureMode {
        match self {
            InterpolationVersion::V1 => TemperatureMode::AsGiven,
            InterpolationVersion::V2 { .. } => TemperatureMode::Ordered,
        }
    }

    fn gradients(self) -> (f64, f64) {
        match self {
            InterpolationVersion::V1 => (V1_GRADIENT, V1_GRADIENT),
            InterpolationVersion::V2 {
                temperature_gradient,
                precipitation_gradient,
            } => (temperature_gradient, precipitation_gradient),
        }
    }

    /// Fills the missing fields of `target` from one donor whose altitude
    /// is `dz` metres below the target (`dz = z_target - z_donor`).
    pub fn fill(self, target: &WeatherSample, donor: &WeatherSample, dz: f64) -> WeatherSample {
        let (temperature_gradient, precipitation_gradient) = self.gradients();
        let keep_dry = matches!(self, InterpolationVersion::V2 { .. });
        let temperature = |t: f64| t + temperature_gradient * dz / 100.0;
        let precipitation = |p: f64| {
            if keep_dry && p == 0.0 {
                0.0
            } else {
                (p + precipitation_gradient * dz / 100.0).max(0.0)
            }
        };

        let mut out = *target;
        out.tmin = out.tmin.or_else(|| donor.tmin.map(temperature));
        out.tmax = out.tmax.or_else(|| donor.tmax.map(temperature));
        out.rain = out.rain.or_else(|| donor.rain.map(precipitation));
        out.snow = out.snow.or_else(|| donor.snow.map(precipitation));
        out
    }
}

/// Outcome of one interpolation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterpolationReport {
    /// Samples that received at least one value.
    pub filled: usize,
    /// Samples still holding a missing field afterwards.
    pub still_missing: usize,
}

/// Runs `version` over `[start, end)` for every station, in order.
///
/// Each incomplete sample walks the other stations from nearest to
/// farthest until tmin, tmax and rain are present. Patches are written
/// back immediately, so later stations may draw on values filled earlier
/// in the pass.
pub fn interpolate(
    stations: &mut [Box<dyn Station>],
    version: InterpolationVersion,
    start: DateHour,
    end: DateHour,
    timestep: u16,
) -> InterpolationReport {
    let mode = version.temperature_mode();
    let n = SampleSeries::steps_between(start, end, timestep);
    let mut report = InterpolationReport::default();

    for i in 0..stations.len() {
        if stations[i].series().missing_count(start, end, timestep) == 0 {
            continue;
        }
        let altitude = stations[i].info().altitude;
        let mut donors: Vec<(usize, f64)> = stations
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(j, other)| (j, stations[i].info().distance_to(other.info())))
            .collect();
        // Stable: equidistant donors keep registry order.
        donors.sort_by(|a, b| a.1.total_cmp(&b.1));

        for k in 0..n {
            let at = start.plus_hours(k as i64 * i64::from(timestep));
            let original = stations[i].sample(at, timestep);
            if !original.has_missing() {
                continue;
            }
            let mut sample = original;
            for &(j, _) in &donors {
                if sample.is_filled() {
                    break;
                }
                let donor = stations[j].sample(at, timestep);
                sample = version.fill(&sample, &donor, altitude - stations[j].info().altitude);
            }
            let (tmin, tmax) = (sample.tmin, sample.tmax);
            mode.assign(&mut sample, tmin, tmax);

            if sample != original {
                stations[i].set_sample(sample, at, timestep);
                report.filled += 1;
            }
            if sample.has_missing() {
                report.still_missing += 1;
            }
        }
    }
    report
}
