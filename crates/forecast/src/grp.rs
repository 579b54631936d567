//! The `.grp` forecast grid description file.

use std::fs;
use std::path::{Path, PathBuf};

use hydromet_calendar::DateHour;
use tracing::debug;

use crate::error::ForecastError;

/// Tag opening the frequency/path line.
const PATH_LINE_TAG: &str = "22";
/// Number of per-variable raster extensions.
const DATA_TYPE_COUNT: usize = 4;

/// The four rasters published per forecast date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastVariable {
    /// Minimum temperature (°C).
    Tmin,
    /// Maximum temperature (°C).
    Tmax,
    /// Rain, or total precipitation in total-precipitation mode (mm).
    Precipitation,
    /// Snow water equivalent (mm).
    Snow,
}

impl ForecastVariable {
    fn index(self) -> usize {
        match self {
            ForecastVariable::Tmin => 0,
            ForecastVariable::Tmax => 1,
            ForecastVariable::Precipitation => 2,
            ForecastVariable::Snow => 3,
        }
    }
}

/// Parsed `.grp` file.
///
/// Line layout: coordinate type, units, data-timing convention, comment,
/// `22 <frequency_hours> <directory>`, file prefix (`@` for none), data
/// type count (`4`), the tmin/tmax/precipitation/snow extensions, then an
/// optional total-precipitation flag.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastGridConfig {
    path: PathBuf,
    coordinate_type: String,
    units: String,
    timing: String,
    comment: String,
    frequency_hours: u32,
    directory: PathBuf,
    prefix: String,
    extensions: [String; DATA_TYPE_COUNT],
    total_precipitation: bool,
}

impl ForecastGridConfig {
    /// Reads a `.grp` file.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FileNotFound`] if absent and
    /// [`ForecastError::FileRead`] with the offending line otherwise.
    pub fn load(path: &Path) -> Result<Self, ForecastError> {
        let text = fs::read_to_string(path).map_err(|e| ForecastError::io(path, e))?;
        Self::parse(path, &text)
    }

    /// Parses `.grp` text. Relative raster directories are resolved against
    /// the parent directory of `path`.
    ///
    /// # Errors
    ///
    /// See [`ForecastGridConfig::load`].
    pub fn parse(path: &Path, text: &str) -> Result<Self, ForecastError> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let line = |n: usize| {
            lines
                .get(n - 1)
                .copied()
                .ok_or_else(|| ForecastError::at_line(path, n, "unexpected end of file"))
        };

        let coordinate_type = line(1)?.to_string();
        let units = line(2)?.to_string();
        let timing = line(3)?.to_string();
        let comment = line(4)?.to_string();

        let mut tokens = line(5)?.split_whitespace();
        if tokens.next() != Some(PATH_LINE_TAG) {
            return Err(ForecastError::at_line(
                path,
                5,
                format!("expected the '{PATH_LINE_TAG}' path tag"),
            ));
        }
        let frequency = tokens
            .next()
            .ok_or_else(|| ForecastError::at_line(path, 5, "missing frequency"))?;
        let frequency_hours = frequency
            .parse::<u32>()
            .ok()
            .filter(|&f| f > 0)
            .ok_or_else(|| ForecastError::at_line(path, 5, format!("invalid frequency '{frequency}'")))?;
        let joined = tokens.collect::<Vec<_>>().join(" ");
        if joined.is_empty() {
            return Err(ForecastError::at_line(path, 5, "missing raster directory"));
        }
        let mut directory = PathBuf::from(joined);
        if directory.is_relative()
            && let Some(parent) = path.parent()
        {
            directory = parent.join(directory);
        }

        let prefix = match line(6)? {
            "@" => String::new(),
            other => other.to_string(),
        };

        let count = line(7)?;
        if count.parse::<usize>().ok() != Some(DATA_TYPE_COUNT) {
            return Err(ForecastError::at_line(
                path,
                7,
                format!("data type count must be {DATA_TYPE_COUNT}, found '{count}'"),
            ));
        }
        let extensions = [
            line(8)?.to_string(),
            line(9)?.to_string(),
            line(10)?.to_string(),
            line(11)?.to_string(),
        ];

        let total_precipitation = match lines.get(11).copied().unwrap_or("") {
            "" | "0" => false,
            "1" => true,
            other => {
                return Err(ForecastError::at_line(
                    path,
                    12,
                    format!("total precipitation flag must be 0 or 1, found '{other}'"),
                ));
            }
        };

        debug!(
            path = %path.display(),
            directory = %directory.display(),
            frequency_hours,
            total_precipitation,
            "forecast grid description parsed"
        );
        Ok(Self {
            path: path.to_path_buf(),
            coordinate_type,
            units,
            timing,
            comment,
            frequency_hours,
            directory,
            prefix,
            extensions,
            total_precipitation,
        })
    }

    /// Path of the `.grp` file itself.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Coordinate type line.
    pub fn coordinate_type(&self) -> &str {
        &self.coordinate_type
    }

    /// Units line.
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Data-timing convention line.
    pub fn timing(&self) -> &str {
        &self.timing
    }

    /// Free comment line.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Hours between two published forecasts.
    pub fn frequency_hours(&self) -> u32 {
        self.frequency_hours
    }

    /// Directory holding the rasters.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Raster file name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// File extension of `variable`'s rasters.
    pub fn extension(&self, variable: ForecastVariable) -> &str {
        &self.extensions[variable.index()]
    }

    /// Whether the precipitation raster holds total precipitation.
    pub fn total_precipitation(&self) -> bool {
        self.total_precipitation
    }

    /// Latest publication covering `date`: its hour rounded down to a
    /// multiple of the frequency, hour 0 for daily or longer frequencies.
    pub fn publication(&self, date: DateHour) -> DateHour {
        let lag = u32::from(date.hour()) % self.frequency_hours;
        date.plus_hours(-i64::from(lag))
    }

    /// Raster of `variable` for `date`: `<dir>/<prefix><YYYYMMDDHH><ext>`,
    /// dated by the [`publication`](Self::publication) covering `date`.
    pub fn raster_path(&self, date: DateHour, variable: ForecastVariable) -> PathBuf {
        let date = self.publication(date);
        self.directory.join(format!(
            "{}{:04}{:02}{:02}{:02}{}",
            self.prefix,
            date.year(),
            date.month(),
            date.day(),
            date.hour(),
            self.extension(variable)
        ))
    }

    /// Sidecar holding the pixel weighting cache.
    pub fn weights_path(&self) -> PathBuf {
        self.path.with_extension("pgp")
    }

    /// Sidecar holding the pixel altitude cache.
    pub fn altitudes_path(&self) -> PathBuf {
        self.path.with_extension("agp")
    }
}
