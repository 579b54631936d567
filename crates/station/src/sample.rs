//! The per-timestep weather datum.

/// Sentinel used by station files for a missing value.
///
/// It only exists at file boundaries; in memory a missing field is `None`.
pub const MISSING_VALUE: f64 = -999.0;

/// Decodes a raw file value: NaN and anything at or below
/// [`MISSING_VALUE`] become `None`.
pub fn decode(value: f64) -> Option<f64> {
    if value.is_nan() || value <= MISSING_VALUE {
        None
    } else {
        Some(value)
    }
}

/// Encodes an optional value back to the file sentinel.
pub fn encode(value: Option<f64>) -> f64 {
    value.unwrap_or(MISSING_VALUE)
}

/// Minimum and maximum temperature (°C), rain and snow (mm water
/// equivalent) for one timestep of one station.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeatherSample {
    /// Minimum temperature.
    pub tmin: Option<f64>,
    /// Maximum temperature.
    pub tmax: Option<f64>,
    /// Liquid precipitation.
    pub rain: Option<f64>,
    /// Solid precipitation.
    pub snow: Option<f64>,
}

impl WeatherSample {
    /// The all-missing sample.
    pub const MISSING: Self = Self {
        tmin: None,
        tmax: None,
        rain: None,
        snow: None,
    };

    /// Builds a sample from raw file values, decoding the sentinel.
    pub fn from_raw(tmin: f64, tmax: f64, rain: f64, snow: f64) -> Self {
        Self {
            tmin: decode(tmin),
            tmax: decode(tmax),
            rain: decode(rain),
            snow: decode(snow),
        }
    }

    /// Returns `true` if any of the four fields is missing.
    pub fn has_missing(&self) -> bool {
        self.tmin.is_none() || self.tmax.is_none() || self.rain.is_none() || self.snow.is_none()
    }

    /// Returns `true` once tmin, tmax and rain are all present.
    pub fn is_filled(&self) -> bool {
        self.tmin.is_some() && self.tmax.is_some() && self.rain.is_some()
    }

    /// Total precipitation, missing if rain is missing.
    pub fn precipitation(&self) -> Option<f64> {
        self.rain.map(|rain| rain + self.snow.unwrap_or(0.0))
    }

    /// Stores both temperatures exactly as given.
    pub fn assign_temperatures_v1(&mut self, tmin: Option<f64>, tmax: Option<f64>) {
        self.tmin = tmin;
        self.tmax = tmax;
    }

    /// Stores both temperatures keeping `tmin <= tmax`.
    ///
    /// A reversed pair is swapped. A lone value is stored as given, leaving
    /// its partner missing.
    pub fn assign_temperatures(&mut self, tmin: Option<f64>, tmax: Option<f64>) {
        let (tmin, tmax) = match (tmin, tmax) {
            (Some(lo), Some(hi)) if lo > hi => (Some(hi), Some(lo)),
            pair => pair,
        };
        self.tmin = tmin;
        self.tmax = tmax;
    }
}

/// How temperatures are written into a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureMode {
    /// [`WeatherSample::assign_temperatures_v1`].
    AsGiven,
    /// [`WeatherSample::assign_temperatures`].
    #[default]
    Ordered,
}

impl TemperatureMode {
    /// Writes `tmin`/`tmax` into `sample` following this mode.
    pub fn assign(self, sample: &mut WeatherSample, tmin: Option<f64>, tmax: Option<f64>) {
        match self {
            TemperatureMode::AsGiven => sample.assign_temperatures_v1(tmin, tmax),
            TemperatureMode::Ordered => sample.assign_temperatures(tmin, tmax),
        }
    }
}
