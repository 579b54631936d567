//! NetCDF helpers shared by the gridded and per-station backends.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use hydromet_calendar::DateHour;
use netcdf::AttributeValue;

use crate::archive::{RawColumns, TimeAxis};
use crate::error::StationError;

/// Variable aliases, first match wins.
pub(crate) const TMIN: &[&str] = &["tasmin", "tmin"];
pub(crate) const TMAX: &[&str] = &["tasmax", "tmax"];
pub(crate) const RAIN: &[&str] = &["pr", "rain"];
pub(crate) const SNOW: &[&str] = &["snow"];
pub(crate) const ALTITUDE: &[&str] = &["alt", "elevation", "z"];

/// An open station NetCDF file with its resolved data variables.
pub(crate) struct NetcdfArchive {
    pub path: PathBuf,
    pub file: netcdf::File,
    pub axis: TimeAxis,
    pub fill: Option<f64>,
    tmin: String,
    tmax: String,
    rain: String,
    snow: Option<String>,
}

impl fmt::Debug for NetcdfArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetcdfArchive")
            .field("path", &self.path)
            .field("axis", &self.axis)
            .field("snow", &self.snow)
            .finish()
    }
}

impl NetcdfArchive {
    /// Opens `path` and resolves the time axis and the data variables.
    pub fn open(path: &Path) -> Result<Self, StationError> {
        let file = open_file(path)?;
        let axis = read_time_axis(&file, path)?;
        let tmin = require(&file, TMIN, path)?;
        let tmax = require(&file, TMAX, path)?;
        let rain = require(&file, RAIN, path)?;
        let snow = resolve(&file, SNOW);
        let fill = fill_value(&file, &tmin);
        Ok(Self {
            path: path.to_path_buf(),
            file,
            axis,
            fill,
            tmin,
            tmax,
            rain,
            snow,
        })
    }

    /// Reads the four data variables through `read`, which selects the
    /// hyperslab of one station.
    pub fn read_columns<F>(&self, read: F) -> Result<RawColumns, StationError>
    where
        F: Fn(&netcdf::Variable<'_>) -> Result<Vec<f64>, netcdf::Error>,
    {
        let column = |name: &str| -> Result<Vec<f64>, StationError> {
            let var = self
                .file
                .variable(name)
                .ok_or_else(|| StationError::MissingVariable {
                    name: name.to_string(),
                    path: self.path.clone(),
                })?;
            Ok(read(&var)?)
        };
        Ok(RawColumns {
            tmin: column(&self.tmin)?,
            tmax: column(&self.tmax)?,
            rain: column(&self.rain)?,
            snow: self.snow.as_deref().map(column).transpose()?,
        })
    }
}

/// Open a NetCDF file at `path`, returning [`StationError::FileNotFound`]
/// if the path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, StationError> {
    if !path.exists() {
        return Err(StationError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// Name of the first alias present in `file`.
pub(crate) fn resolve(file: &netcdf::File, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find(|&&alias| file.variable(alias).is_some())
        .map(|alias| (*alias).to_string())
}

/// Like [`resolve`], failing with [`StationError::MissingVariable`].
pub(crate) fn require(file: &netcdf::File, aliases: &[&str], path: &Path) -> Result<String, StationError> {
    resolve(file, aliases).ok_or_else(|| StationError::MissingVariable {
        name: aliases.first().copied().unwrap_or("unknown").to_string(),
        path: path.to_path_buf(),
    })
}

/// Read a whole variable as `f64`, trying each alias in order.
pub(crate) fn read_all_f64(file: &netcdf::File, aliases: &[&str], path: &Path) -> Result<Vec<f64>, StationError> {
    let name = require(file, aliases, path)?;
    let var = file
        .variable(&name)
        .ok_or_else(|| StationError::MissingVariable {
            name: name.clone(),
            path: path.to_path_buf(),
        })?;
    Ok(var.get_values::<f64, _>(..)?)
}

/// Numeric `_FillValue` of variable `name`, if any.
pub(crate) fn fill_value(file: &netcdf::File, name: &str) -> Option<f64> {
    let var = file.variable(name)?;
    match var.attribute_value("_FillValue")?.ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        _ => None,
    }
}

/// Length of dimension `name`.
pub(crate) fn dimension_len(file: &netcdf::File, name: &str, path: &Path) -> Result<usize, StationError> {
    file.dimension(name)
        .map(|d| d.len())
        .ok_or_else(|| StationError::read(path, format!("no '{name}' dimension")))
}

/// Reads the `time` variable into a regular [`TimeAxis`].
///
/// Parses CF-convention units like `"hours since YYYY-MM-DD HH:MM:SS"` or
/// `"days since YYYY-MM-DD"`. The step is the difference of the first two
/// values; a single-step axis is taken as daily.
pub(crate) fn read_time_axis(file: &netcdf::File, path: &Path) -> Result<TimeAxis, StationError> {
    let var = file
        .variable("time")
        .ok_or_else(|| StationError::MissingVariable {
            name: "time".to_string(),
            path: path.to_path_buf(),
        })?;

    let units: String = var
        .attribute_value("units")
        .ok_or_else(|| StationError::read(path, "time variable has no 'units' attribute"))?
        .map_err(|e| StationError::read(path, format!("failed to read 'units' attribute: {e}")))?
        .try_into()
        .map_err(|e: netcdf::Error| StationError::read(path, format!("'units' attribute is not a string: {e}")))?;
    let (unit_hours, base) = parse_time_units(&units).map_err(|reason| StationError::read(path, reason))?;

    let offsets = var.get_values::<f64, _>(..)?;
    let Some(&first) = offsets.first() else {
        return Err(StationError::read(path, "time axis is empty"));
    };
    let to_hours = |v: f64| (v * f64::from(unit_hours)).round() as i64;
    let timestep = match offsets.get(1) {
        Some(&second) => to_hours(second) - to_hours(first),
        None => 24,
    };
    let timestep = u16::try_from(timestep)
        .ok()
        .filter(|&t| t > 0)
        .ok_or_else(|| StationError::read(path, format!("irregular or decreasing time step ({timestep}h)")))?;

    Ok(TimeAxis {
        start: base.checked_plus_hours(to_hours(first))?,
        timestep,
        len: offsets.len(),
    })
}

/// Splits `"<unit> since <date>[ <time>]"` into hours per unit and the
/// base date-hour.
pub(crate) fn parse_time_units(units: &str) -> Result<(u16, DateHour), String> {
    let parts: Vec<&str> = units.split_whitespace().collect();
    if parts.len() < 3 || parts[1] != "since" {
        return Err(format!("unexpected time units format: '{units}'"));
    }
    let unit_hours = match parts[0] {
        "hours" | "hour" | "h" => 1,
        "days" | "day" | "d" => 24,
        other => return Err(format!("unsupported time unit '{other}'")),
    };

    // The date may carry a `T` separator instead of a space.
    let mut date_part = parts[2];
    let mut time_part = parts.get(3).copied();
    if let Some((d, t)) = parts[2].split_once('T') {
        date_part = d;
        time_part = Some(t);
    }
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| format!("failed to parse base date '{date_part}': {e}"))?;
    let hour = match time_part {
        Some(t) => t
            .split(':')
            .next()
            .unwrap_or("0")
            .parse::<u16>()
            .map_err(|e| format!("failed to parse base hour '{t}': {e}"))?,
        None => 0,
    };
    let year = u16::try_from(date.year()).map_err(|_| format!("base year {} out of range", date.year()))?;
    let base = DateHour::new(year, date.month() as u16, date.day() as u16, hour).map_err(|e| e.to_string())?;
    Ok((unit_hours, base))
}
