//! The station registry.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hydromet_calendar::{DateHour, DayWindow};
use tracing::{info, warn};

use crate::error::StationError;
use crate::interpolate::{InterpolationReport, InterpolationVersion, interpolate};
use crate::projection::{CoordinateTransform, project};
use crate::station::Station;
use crate::{hdf5_store, legacy, netcdf_grid, netcdf_station};

/// Station file formats the registry can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationFormat {
    /// `.stm` list with `.met` data files.
    Legacy,
    /// HDF5 array store.
    Hdf5,
    /// Gridded NetCDF, one station per cell.
    GridNetcdf,
    /// NetCDF with a `station` dimension.
    StationNetcdf,
}

impl StationFormat {
    /// Picks the format from the file name: `.stm`, `.h5`/`.hdf5`,
    /// `*.grid.nc`, then any other `.nc`.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidType`] for any other name.
    pub fn from_path(path: &Path) -> Result<Self, StationError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "stm" => Ok(StationFormat::Legacy),
            "h5" | "hdf5" => Ok(StationFormat::Hdf5),
            "nc" if name.ends_with(".grid.nc") => Ok(StationFormat::GridNetcdf),
            "nc" => Ok(StationFormat::StationNetcdf),
            _ => Err(StationError::InvalidType {
                identifier: path.display().to_string(),
            }),
        }
    }

    /// Short name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            StationFormat::Legacy => "legacy",
            StationFormat::Hdf5 => "hdf5",
            StationFormat::GridNetcdf => "grid-netcdf",
            StationFormat::StationNetcdf => "station-netcdf",
        }
    }
}

impl fmt::Display for StationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StationFormat {
    type Err = StationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "stm" => Ok(StationFormat::Legacy),
            "hdf5" | "h5" => Ok(StationFormat::Hdf5),
            "grid-netcdf" => Ok(StationFormat::GridNetcdf),
            "station-netcdf" | "netcdf" => Ok(StationFormat::StationNetcdf),
            _ => Err(StationError::InvalidType {
                identifier: s.to_string(),
            }),
        }
    }
}

/// Owns the stations of one source, their name index and the
/// interpolation algorithm.
#[derive(Debug, Default)]
pub struct StationSet {
    stations: Vec<Box<dyn Station>>,
    index: HashMap<String, usize>,
    version: InterpolationVersion,
    source: Option<PathBuf>,
}

impl StationSet {
    /// Creates an empty set using `version` for interpolation and for
    /// temperature assignment.
    pub fn new(version: InterpolationVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Interpolation algorithm of this set.
    pub fn version(&self) -> InterpolationVersion {
        self.version
    }

    /// Path of the last source read.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Replaces the stations with those of `source`, picking the backend
    /// from the file name.
    ///
    /// # Errors
    ///
    /// See [`StationFormat::from_path`] and [`StationSet::read_as`].
    pub fn read(&mut self, source: &Path, transform: &dyn CoordinateTransform) -> Result<(), StationError> {
        let format = StationFormat::from_path(source)?;
        self.read_as(source, format, transform)
    }

    /// Replaces the stations with those of `source` read as `format`, and
    /// projects their coordinates with `transform`.
    ///
    /// # Errors
    ///
    /// Returns the backend's [`StationError`] for unreadable or malformed
    /// files, or the transform's error. The set is left empty on failure.
    pub fn read_as(
        &mut self,
        source: &Path,
        format: StationFormat,
        transform: &dyn CoordinateTransform,
    ) -> Result<(), StationError> {
        self.stations.clear();
        self.index.clear();
        self.source = None;

        let mode = self.version.temperature_mode();
        let mut stations: Vec<Box<dyn Station>> = match format {
            StationFormat::Legacy => boxed(legacy::read_station_list(source, mode)?),
            StationFormat::Hdf5 => boxed(hdf5_store::read_archive(source, mode)?),
            StationFormat::GridNetcdf => boxed(netcdf_grid::read_grid(source, mode)?),
            StationFormat::StationNetcdf => boxed(netcdf_station::read_stations(source, mode)?),
        };
        for station in &mut stations {
            project(station.info_mut(), transform)?;
        }

        info!(path = %source.display(), format = %format, n_stations = stations.len(), "stations read");
        self.stations = stations;
        self.source = Some(source.to_path_buf());
        self.rebuild_index();
        Ok(())
    }

    /// Adds a station and refreshes the name index.
    pub fn push(&mut self, station: Box<dyn Station>) {
        self.stations.push(station);
        self.rebuild_index();
    }

    /// Loads every station over `[start, end)` snapped outward to whole
    /// days, then fills missing samples with this set's interpolation.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::Configuration`] for a timestep that does not
    /// divide a day, or the first station's load failure.
    pub fn load_series(
        &mut self,
        start: DateHour,
        end: DateHour,
        timestep: u16,
    ) -> Result<InterpolationReport, StationError> {
        if timestep == 0 || 24 % timestep != 0 {
            return Err(StationError::Configuration {
                reason: format!("timestep {timestep}h does not divide a day"),
            });
        }
        let window = DayWindow::snap(start, end);
        for station in &mut self.stations {
            station.load_series(window.start(), window.end(), timestep)?;
        }
        let missing_before = self.missing_count(window.start(), window.end(), timestep);
        let report = interpolate(&mut self.stations, self.version, window.start(), window.end(), timestep);

        info!(
            start = %window.start(),
            end = %window.end(),
            timestep,
            missing_before,
            filled = report.filled,
            still_missing = report.still_missing,
            "station series loaded"
        );
        if report.still_missing > 0 {
            warn!(still_missing = report.still_missing, "samples left missing after interpolation");
        }
        Ok(report)
    }

    /// Number of incomplete samples over `[start, end)` summed across
    /// stations.
    pub fn missing_count(&self, start: DateHour, end: DateHour, timestep: u16) -> usize {
        self.stations
            .iter()
            .map(|s| s.series().missing_count(start, end, timestep))
            .sum()
    }

    /// Looks a station up by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&dyn Station> {
        self.index
            .get(&name.to_lowercase())
            .map(|&i| self.stations[i].as_ref())
    }

    /// Mutable lookup by name, ignoring case.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut (dyn Station + 'static)> {
        let i = *self.index.get(&name.to_lowercase())?;
        Some(self.stations[i].as_mut())
    }

    /// All stations in source order.
    pub fn stations(&self) -> &[Box<dyn Station>] {
        &self.stations
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Returns `true` if the set holds no station.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, station) in self.stations.iter().enumerate() {
            let key = station.info().name.to_lowercase();
            if self.index.contains_key(&key) {
                warn!(station = %station.info().name, "duplicate station name, first one kept in index");
                continue;
            }
            self.index.insert(key, i);
        }
    }
}

fn boxed<S: Station + 'static>(stations: Vec<S>) -> Vec<Box<dyn Station>> {
    stations
        .into_iter()
        .map(|s| Box::new(s) as Box<dyn Station>)
        .collect()
}
