//! Time-indexed sample buffer shared by every station backend.

use hydromet_calendar::DateHour;

use crate::sample::WeatherSample;

/// Samples at a fixed timestep from `start`.
///
/// Sample `i` covers `[start + i*timestep, start + (i+1)*timestep)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    start: DateHour,
    timestep: u16,
    samples: Vec<WeatherSample>,
}

impl Default for SampleSeries {
    fn default() -> Self {
        Self {
            start: DateHour::default(),
            timestep: 24,
            samples: Vec::new(),
        }
    }
}

impl SampleSeries {
    /// Wraps existing samples.
    pub fn new(start: DateHour, timestep: u16, samples: Vec<WeatherSample>) -> Self {
        Self {
            start,
            timestep,
            samples,
        }
    }

    /// An all-missing series covering `[start, end)`.
    pub fn missing(start: DateHour, end: DateHour, timestep: u16) -> Self {
        let n = Self::steps_between(start, end, timestep);
        Self::new(start, timestep, vec![WeatherSample::MISSING; n])
    }

    /// Number of whole `timestep` steps in `[start, end)`.
    pub fn steps_between(start: DateHour, end: DateHour, timestep: u16) -> usize {
        if timestep == 0 {
            return 0;
        }
        let hours = start.hours_between(end).max(0);
        usize::try_from(hours / i64::from(timestep)).unwrap_or(0)
    }

    /// First covered hour.
    pub fn start(&self) -> DateHour {
        self.start
    }

    /// Step length in hours.
    pub fn timestep(&self) -> u16 {
        self.timestep
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if the series holds no sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples in time order.
    pub fn samples(&self) -> &[WeatherSample] {
        &self.samples
    }

    /// Offset of `at`, or `None` when it lies outside the series or off the
    /// step grid.
    pub fn index_of(&self, at: DateHour, timestep: u16) -> Option<usize> {
        if timestep == 0 {
            return None;
        }
        let hours = self.start.hours_between(at);
        let step = i64::from(timestep);
        if hours < 0 || hours % step != 0 {
            return None;
        }
        let index = usize::try_from(hours / step).ok()?;
        (index < self.samples.len()).then_some(index)
    }

    /// Sample at `at`; the all-missing sample when out of range.
    pub fn get(&self, at: DateHour, timestep: u16) -> WeatherSample {
        self.index_of(at, timestep)
            .map_or(WeatherSample::MISSING, |i| self.samples[i])
    }

    /// Overwrites the sample at `at`. Returns `false` (and changes nothing)
    /// when `at` is out of range.
    pub fn set(&mut self, sample: WeatherSample, at: DateHour, timestep: u16) -> bool {
        match self.index_of(at, timestep) {
            Some(i) => {
                self.samples[i] = sample;
                true
            }
            None => false,
        }
    }

    /// Daily extremes of the day containing `day`: min of tmin and max of
    /// tmax over the `24 / timestep` samples of that day, skipping missing
    /// values.
    pub fn daily_min_max(&self, day: DateHour) -> (Option<f64>, Option<f64>) {
        if self.timestep == 0 {
            return (None, None);
        }
        let first = day.start_of_day();
        let per_day = (24 / self.timestep).max(1);
        let mut tmin: Option<f64> = None;
        let mut tmax: Option<f64> = None;
        for k in 0..per_day {
            let at = first.plus_hours(i64::from(k * self.timestep));
            let sample = self.get(at, self.timestep);
            if let Some(t) = sample.tmin {
                tmin = Some(tmin.map_or(t, |m| m.min(t)));
            }
            if let Some(t) = sample.tmax {
                tmax = Some(tmax.map_or(t, |m| m.max(t)));
            }
        }
        (tmin, tmax)
    }

    /// Number of samples in `[start, end)` with at least one missing field.
    /// Timesteps outside the series count as missing.
    pub fn missing_count(&self, start: DateHour, end: DateHour, timestep: u16) -> usize {
        let n = Self::steps_between(start, end, timestep);
        (0..n)
            .map(|k| start.plus_hours(k as i64 * i64::from(timestep)))
            .filter(|&at| self.get(at, timestep).has_missing())
            .count()
    }
}
