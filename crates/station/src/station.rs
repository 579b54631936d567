//! The station abstraction.

use std::fmt;

use hydromet_calendar::DateHour;

use crate::error::StationError;
use crate::sample::WeatherSample;
use crate::series::SampleSeries;

/// Coordinate reference system of a station's native coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateKind {
    /// Longitude/latitude in decimal degrees (WGS84).
    Geographic,
    /// Already in the project's projected CRS.
    Projected,
}

impl CoordinateKind {
    /// Maps the numeric code used by station files (1 = geographic,
    /// 2 = projected).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(CoordinateKind::Geographic),
            2 => Some(CoordinateKind::Projected),
            _ => None,
        }
    }
}

/// Identity and location of one station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationInfo {
    /// Display name, the key of the registry's name index.
    pub name: String,
    /// Source identifier.
    pub id: String,
    /// Native x (longitude for geographic sources).
    pub x: f64,
    /// Native y (latitude for geographic sources).
    pub y: f64,
    /// Altitude in metres.
    pub altitude: f64,
    /// CRS of `x`/`y`.
    pub kind: CoordinateKind,
    /// Position in the project CRS, set by the registry.
    pub projected: Option<(f64, f64)>,
}

impl StationInfo {
    /// Creates station metadata; `name` defaults to the id.
    pub fn new(id: impl Into<String>, x: f64, y: f64, altitude: f64, kind: CoordinateKind) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            x,
            y,
            altitude,
            kind,
            projected: None,
        }
    }

    /// Overrides the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Projected position, or the native one when not projected yet.
    pub fn position(&self) -> (f64, f64) {
        self.projected.unwrap_or((self.x, self.y))
    }

    /// Euclidean distance between projected positions.
    pub fn distance_to(&self, other: &StationInfo) -> f64 {
        let (ax, ay) = self.position();
        let (bx, by) = other.position();
        (ax - bx).hypot(ay - by)
    }
}

/// A weather station whose series can be loaded over a window.
///
/// Backends implement [`Station::load_series`] and expose their buffer;
/// sample access goes through the shared [`SampleSeries`].
pub trait Station: fmt::Debug {
    /// Identity and location.
    fn info(&self) -> &StationInfo;

    /// Mutable identity and location.
    fn info_mut(&mut self) -> &mut StationInfo;

    /// Loads `[start, end)` at `timestep` hours into the series buffer,
    /// replacing any previous content. Timesteps without data are missing.
    ///
    /// # Errors
    ///
    /// Returns [`StationError`] if the backing file cannot be read or does
    /// not hold data at the requested timestep.
    fn load_series(&mut self, start: DateHour, end: DateHour, timestep: u16) -> Result<(), StationError>;

    /// The loaded series.
    fn series(&self) -> &SampleSeries;

    /// The loaded series, mutably.
    fn series_mut(&mut self) -> &mut SampleSeries;

    /// Sample at `at`; all-missing outside the loaded window.
    fn sample(&self, at: DateHour, timestep: u16) -> WeatherSample {
        self.series().get(at, timestep)
    }

    /// Overwrites the sample at `at`; ignored outside the loaded window.
    fn set_sample(&mut self, sample: WeatherSample, at: DateHour, timestep: u16) {
        self.series_mut().set(sample, at, timestep);
    }

    /// Daily (min tmin, max tmax) of the day containing `day`.
    fn daily_min_max(&self, day: DateHour) -> (Option<f64>, Option<f64>) {
        self.series().daily_min_max(day)
    }
}

/// A station whose samples are supplied directly rather than read from a
/// file. Loading keeps the samples that fall inside the window.
#[derive(Debug, Clone)]
pub struct MemoryStation {
    info: StationInfo,
    source: SampleSeries,
    series: SampleSeries,
}

impl MemoryStation {
    /// Creates a station over an in-memory series.
    pub fn new(info: StationInfo, source: SampleSeries) -> Self {
        Self {
            info,
            source,
            series: SampleSeries::default(),
        }
    }
}

impl Station for MemoryStation {
    fn info(&self) -> &StationInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StationInfo {
        &mut self.info
    }

    fn load_series(&mut self, start: DateHour, end: DateHour, timestep: u16) -> Result<(), StationError> {
        if timestep != self.source.timestep() {
            return Err(StationError::Configuration {
                reason: format!(
                    "station '{}' holds {}h data, {timestep}h requested",
                    self.info.name,
                    self.source.timestep()
                ),
            });
        }
        let mut series = SampleSeries::missing(start, end, timestep);
        for k in 0..series.len() {
            let at = start.plus_hours(k as i64 * i64::from(timestep));
            series.set(self.source.get(at, timestep), at, timestep);
        }
        self.series = series;
        Ok(())
    }

    fn series(&self) -> &SampleSeries {
        &self.series
    }

    fn series_mut(&mut self) -> &mut SampleSeries {
        &mut self.series
    }
}
