//! Legacy tabular stations: a `.stm` station list plus one whitespace
//! `.met` data file per station.
//!
//! `.stm` layout:
//!
//! ```text
//! 1                      coordinate type (1 = lon/lat, 2 = project CRS)
//! 2                      number of stations
//! id x y z format        comment line
//! A001 -71.2 46.8 120 3  one row per station
//! ```
//!
//! `.met` layout: first line `type timestep_hours`, then rows
//! `dd/mm/yyyy [hh] <temperatures> precipitation`. Type 1 files carry
//! `tmax tmin`, type 2 a single temperature used for both. The hour column
//! is present only for sub-daily files and marks the end of the interval.

use std::fs;
use std::path::{Path, PathBuf};

use hydromet_calendar::DateHour;
use tracing::debug;

use crate::error::StationError;
use crate::sample::{TemperatureMode, WeatherSample, decode};
use crate::series::SampleSeries;
use crate::station::{CoordinateKind, Station, StationInfo};

/// Format code of a legacy tabular data file.
pub const FORMAT_TABULAR: i64 = 3;

/// A station backed by a `.met` file.
#[derive(Debug, Clone)]
pub struct LegacyStation {
    info: StationInfo,
    data_path: PathBuf,
    mode: TemperatureMode,
    series: SampleSeries,
}

impl LegacyStation {
    /// Creates a station reading `data_path`.
    pub fn new(info: StationInfo, data_path: PathBuf, mode: TemperatureMode) -> Self {
        Self {
            info,
            data_path,
            mode,
            series: SampleSeries::default(),
        }
    }

    /// Path of the `.met` data file.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }
}

/// Reads the station list of a `.stm` file.
///
/// # Errors
///
/// Returns [`StationError::FileRead`] (with the line number) on malformed
/// headers or rows, a short station list, or an unknown coordinate type;
/// [`StationError::InvalidType`] for a format code other than
/// [`FORMAT_TABULAR`].
pub fn read_station_list(path: &Path, mode: TemperatureMode) -> Result<Vec<LegacyStation>, StationError> {
    let text = fs::read_to_string(path).map_err(|e| StationError::io(path, e))?;
    let lines: Vec<&str> = text.lines().collect();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let kind_code: i64 = header_value(path, &lines, 0)?;
    let kind = CoordinateKind::from_code(kind_code)
        .ok_or_else(|| StationError::at_line(path, 1, format!("unknown coordinate type {kind_code}")))?;
    let count: usize = header_value(path, &lines, 1)?;

    let mut stations = Vec::with_capacity(count);
    for k in 0..count {
        let index = 3 + k;
        let line_no = index + 1;
        let Some(line) = lines.get(index).filter(|l| !l.trim().is_empty()) else {
            return Err(StationError::at_line(
                path,
                line_no,
                format!("expected {count} stations, found {k}"),
            ));
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 5 {
            return Err(StationError::at_line(
                path,
                line_no,
                format!("expected 'id x y z format', got {} fields", tokens.len()),
            ));
        }
        let x: f64 = parse_token(path, line_no, tokens[1], "x")?;
        let y: f64 = parse_token(path, line_no, tokens[2], "y")?;
        let z: f64 = parse_token(path, line_no, tokens[3], "z")?;
        let format: i64 = parse_token(path, line_no, tokens[4], "format code")?;
        if format != FORMAT_TABULAR {
            return Err(StationError::InvalidType {
                identifier: format!("format code {format} ({}, line {line_no})", path.display()),
            });
        }
        let id = tokens[0];
        let info = StationInfo::new(id, x, y, z, kind);
        stations.push(LegacyStation::new(info, dir.join(format!("{id}.met")), mode));
    }

    debug!(path = %path.display(), n = stations.len(), "legacy station list read");
    Ok(stations)
}

fn header_value<T: std::str::FromStr>(path: &Path, lines: &[&str], index: usize) -> Result<T, StationError>
where
    T::Err: std::fmt::Display,
{
    let token = lines
        .get(index)
        .and_then(|l| l.split_whitespace().next())
        .ok_or_else(|| StationError::at_line(path, index + 1, "unexpected end of file"))?;
    parse_token(path, index + 1, token, "header value")
}

fn parse_token<T: std::str::FromStr>(path: &Path, line: usize, token: &str, what: &str) -> Result<T, StationError>
where
    T::Err: std::fmt::Display,
{
    token
        .parse::<T>()
        .map_err(|e| StationError::at_line(path, line, format!("{what} '{token}': {e}")))
}

fn parse_date(path: &Path, line: usize, token: &str, hour: u16) -> Result<DateHour, StationError> {
    let parts: Vec<&str> = token.split('/').collect();
    if parts.len() != 3 {
        return Err(StationError::at_line(path, line, format!("date '{token}' is not dd/mm/yyyy")));
    }
    let day: u16 = parse_token(path, line, parts[0], "day")?;
    let month: u16 = parse_token(path, line, parts[1], "month")?;
    let year: u16 = parse_token(path, line, parts[2], "year")?;
    DateHour::new(year, month, day, hour).map_err(|e| StationError::at_line(path, line, e.to_string()))
}

impl Station for LegacyStation {
    fn info(&self) -> &StationInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StationInfo {
        &mut self.info
    }

    fn load_series(&mut self, start: DateHour, end: DateHour, timestep: u16) -> Result<(), StationError> {
        let path = self.data_path.as_path();
        let text = fs::read_to_string(path).map_err(|e| StationError::io(path, e))?;
        let mut lines = text.lines().enumerate();

        let (_, header) = lines
            .next()
            .ok_or_else(|| StationError::at_line(path, 1, "empty data file"))?;
        let mut header = header.split_whitespace();
        let file_type: u8 = parse_token(path, 1, header.next().unwrap_or(""), "file type")?;
        let file_step: u16 = parse_token(path, 1, header.next().unwrap_or(""), "timestep")?;
        if !matches!(file_type, 1 | 2) {
            return Err(StationError::at_line(path, 1, format!("unknown file type {file_type}")));
        }
        if file_step != timestep {
            return Err(StationError::Configuration {
                reason: format!(
                    "{} holds {file_step}h data, {timestep}h requested",
                    path.display()
                ),
            });
        }
        let has_hour = file_step < 24;
        let n_temps = if file_type == 1 { 2 } else { 1 };
        let expected = 1 + usize::from(has_hour) + n_temps + 1;

        let mut series = SampleSeries::missing(start, end, timestep);
        for (i, line) in lines {
            let line_no = i + 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            if tokens.len() < expected {
                return Err(StationError::at_line(
                    path,
                    line_no,
                    format!("expected {expected} fields, got {}", tokens.len()),
                ));
            }

            let mut at = if has_hour {
                let hour: u16 = parse_token(path, line_no, tokens[1], "hour")?;
                parse_date(path, line_no, tokens[0], hour)?
            } else {
                parse_date(path, line_no, tokens[0], 0)?
            };
            if has_hour {
                at.subtract_hours(i64::from(file_step));
            }

            let first = 1 + usize::from(has_hour);
            let (tmin, tmax) = if file_type == 1 {
                let tmax: f64 = parse_token(path, line_no, tokens[first], "tmax")?;
                let tmin: f64 = parse_token(path, line_no, tokens[first + 1], "tmin")?;
                (decode(tmin), decode(tmax))
            } else {
                let t: f64 = parse_token(path, line_no, tokens[first], "temperature")?;
                (decode(t), decode(t))
            };
            let precip: f64 = parse_token(path, line_no, tokens[first + n_temps], "precipitation")?;

            let mut sample = WeatherSample::MISSING;
            self.mode.assign(&mut sample, tmin, tmax);
            sample.rain = decode(precip);
            sample.snow = sample.rain.map(|_| 0.0);
            series.set(sample, at, timestep);
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
