//! Pieces shared by the array-backed backends (HDF5 and NetCDF): the file
//! time axis, its overlap with a read window, and sample assembly.

use std::ops::Range;
use std::path::Path;

use hydromet_calendar::DateHour;

use crate::error::StationError;
use crate::sample::{TemperatureMode, WeatherSample, decode};
use crate::series::SampleSeries;

/// Regular time axis of an array file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimeAxis {
    pub start: DateHour,
    pub timestep: u16,
    pub len: usize,
}

/// Part of a read window the file can serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Overlap {
    /// Time indices to read from the file.
    pub file: Range<usize>,
    /// Series index of `file.start`.
    pub first_sample: usize,
}

impl TimeAxis {
    /// Intersects `[start, start + n*timestep)` with the axis.
    ///
    /// Returns `Ok(None)` when the window and the file do not overlap.
    pub fn overlap(&self, path: &Path, start: DateHour, n: usize, timestep: u16) -> Result<Option<Overlap>, StationError> {
        if timestep != self.timestep {
            return Err(StationError::Configuration {
                reason: format!(
                    "{} holds {}h data, {timestep}h requested",
                    path.display(),
                    self.timestep
                ),
            });
        }
        let step = i64::from(timestep);
        let hours = self.start.hours_between(start);
        if hours % step != 0 {
            return Err(StationError::Configuration {
                reason: format!(
                    "window start {start} is not on the {timestep}h grid of {} (starts {})",
                    path.display(),
                    self.start
                ),
            });
        }
        let offset = hours / step;
        let first = offset.max(0);
        let last = (offset + n as i64).min(self.len as i64);
        if first >= last {
            return Ok(None);
        }
        Ok(Some(Overlap {
            file: first as usize..last as usize,
            first_sample: (first - offset) as usize,
        }))
    }
}

/// Raw values of the four variables over one overlap.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawColumns {
    pub tmin: Vec<f64>,
    pub tmax: Vec<f64>,
    pub rain: Vec<f64>,
    /// Absent when the file stores total precipitation as rain.
    pub snow: Option<Vec<f64>>,
}

/// Decodes one raw value against the sentinel and an optional `_FillValue`.
pub(crate) fn decode_fill(value: f64, fill: Option<f64>) -> Option<f64> {
    match fill {
        Some(f) if value == f => None,
        _ => decode(value),
    }
}

/// Builds the series for `[start, end)` from the columns read over
/// `overlap`; every other timestep stays missing.
pub(crate) fn assemble(
    start: DateHour,
    end: DateHour,
    timestep: u16,
    overlap: Option<&Overlap>,
    columns: &RawColumns,
    fill: Option<f64>,
    mode: TemperatureMode,
) -> SampleSeries {
    let series = SampleSeries::missing(start, end, timestep);
    let Some(overlap) = overlap else {
        return series;
    };
    let mut samples = series.samples().to_vec();
    for k in 0..overlap.file.len() {
        let mut sample = WeatherSample::MISSING;
        mode.assign(
            &mut sample,
            columns.tmin.get(k).and_then(|&v| decode_fill(v, fill)),
            columns.tmax.get(k).and_then(|&v| decode_fill(v, fill)),
        );
        sample.rain = columns.rain.get(k).and_then(|&v| decode_fill(v, fill));
        sample.snow = match &columns.snow {
            Some(snow) => snow.get(k).and_then(|&v| decode_fill(v, fill)),
            None => sample.rain.map(|_| 0.0),
        };
        if let Some(slot) = samples.get_mut(overlap.first_sample + k) {
            *slot = sample;
        }
    }
    SampleSeries::new(start, timestep, samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> TimeAxis {
        TimeAxis {
            start: DateHour::new(2020, 1, 1, 0).unwrap(),
            timestep: 24,
            len: 10,
        }
    }

    #[test]
    fn window_before_file_start() {
        let start = DateHour::new(2019, 12, 30, 0).unwrap();
        let overlap = axis().overlap(Path::new("f"), start, 5, 24).unwrap().unwrap();
        assert_eq!(overlap.file, 0..3);
        assert_eq!(overlap.first_sample, 2);
    }

    #[test]
    fn window_past_file_end() {
        let start = DateHour::new(2020, 1, 8, 0).unwrap();
        let overlap = axis().overlap(Path::new("f"), start, 5, 24).unwrap().unwrap();
        assert_eq!(overlap.file, 7..10);
        assert_eq!(overlap.first_sample, 0);
    }

    #[test]
    fn disjoint_window() {
        let start = DateHour::new(2021, 1, 1, 0).unwrap();
        assert_eq!(axis().overlap(Path::new("f"), start, 5, 24).unwrap(), None);
    }

    #[test]
    fn timestep_mismatch_is_configuration_error() {
        let start = DateHour::new(2020, 1, 1, 0).unwrap();
        let err = axis().overlap(Path::new("f"), start, 5, 6).unwrap_err();
        assert!(matches!(err, StationError::Configuration { .. }));
    }

    #[test]
    fn assemble_without_snow_column() {
        let start = DateHour::new(2020, 1, 1, 0).unwrap();
        let end = start.plus_hours(72);
        let overlap = Overlap {
            file: 0..2,
            first_sample: 1,
        };
        let columns = RawColumns {
            tmin: vec![-1.0, 1e20],
            tmax: vec![4.0, 5.0],
            rain: vec![2.0, -999.0],
            snow: None,
        };
        let series = assemble(start, end, 24, Some(&overlap), &columns, Some(1e20), TemperatureMode::AsGiven);
        assert_eq!(series.samples()[0], WeatherSample::MISSING);
        assert_eq!(series.samples()[1].rain, Some(2.0));
        assert_eq!(series.samples()[1].snow, Some(0.0));
        assert_eq!(series.samples()[2].tmin, None);
        assert_eq!(series.samples()[2].snow, None);
    }
}
