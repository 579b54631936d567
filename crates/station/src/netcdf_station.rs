//! Stations stored along a `station` dimension of a NetCDF file.
//!
//! Dimensions `station` and `time`; coordinates `lon`/`lat` (geographic) or
//! `x`/`y` (project CRS), altitude `alt` (`elevation`, `z`), an optional
//! `station_name` string variable, and the data variables `tasmin|tmin`,
//! `tasmax|tmax`, `pr|rain` and optional `snow` over `[station, time]`.

use std::path::Path;
use std::rc::Rc;

use hydromet_calendar::DateHour;
use tracing::debug;

use crate::archive::{RawColumns, assemble};
use crate::error::StationError;
use crate::netcdf_common::{ALTITUDE, NetcdfArchive, dimension_len, read_all_f64, resolve};
use crate::sample::TemperatureMode;
use crate::series::SampleSeries;
use crate::station::{CoordinateKind, Station, StationInfo};

/// One row of a per-station NetCDF file.
#[derive(Debug)]
pub struct NetcdfStation {
    info: StationInfo,
    archive: Rc<NetcdfArchive>,
    row: usize,
    mode: TemperatureMode,
    series: SampleSeries,
}

/// Opens a per-station NetCDF file and lists its stations.
///
/// # Errors
///
/// Returns [`StationError::FileNotFound`], [`StationError::MissingVariable`]
/// for absent coordinates or data, and [`StationError::FileRead`] naming
/// `path` for an unreadable file or inconsistent dimensions.
pub fn read_stations(path: &Path, mode: TemperatureMode) -> Result<Vec<NetcdfStation>, StationError> {
    open_stations(path, mode).map_err(|e| e.within(path))
}

fn open_stations(path: &Path, mode: TemperatureMode) -> Result<Vec<NetcdfStation>, StationError> {
    let archive = NetcdfArchive::open(path)?;
    let file = &archive.file;
    let n = dimension_len(file, "station", path)?;

    let (xs, ys, kind) = if resolve(file, &["lon"]).is_some() {
        (
            read_all_f64(file, &["lon"], path)?,
            read_all_f64(file, &["lat"], path)?,
            CoordinateKind::Geographic,
        )
    } else {
        (
            read_all_f64(file, &["x", "lon"], path)?,
            read_all_f64(file, &["y", "lat"], path)?,
            CoordinateKind::Projected,
        )
    };
    let altitudes = read_all_f64(file, ALTITUDE, path)?;
    if xs.len() != n || ys.len() != n || altitudes.len() != n {
        return Err(StationError::read(
            path,
            format!(
                "coordinate arrays disagree with {n} stations ({} x, {} y, {} altitudes)",
                xs.len(),
                ys.len(),
                altitudes.len()
            ),
        ));
    }
    let names: Vec<String> = match file.variable("station_name") {
        Some(var) => (0..n)
            .map(|i| var.get_string([i]))
            .collect::<Result<_, _>>()?,
        None => (0..n).map(|i| format!("station_{i}")).collect(),
    };

    debug!(path = %path.display(), n_stations = n, timestep = archive.axis.timestep, "station netcdf opened");
    let archive = Rc::new(archive);
    Ok(names
        .into_iter()
        .enumerate()
        .map(|(row, name)| NetcdfStation {
            info: StationInfo::new(name.trim(), xs[row], ys[row], altitudes[row], kind),
            archive: Rc::clone(&archive),
            row,
            mode,
            series: SampleSeries::default(),
        })
        .collect())
}

impl Station for NetcdfStation {
    fn info(&self) -> &StationInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StationInfo {
        &mut self.info
    }

    fn load_series(&mut self, start: DateHour, end: DateHour, timestep: u16) -> Result<(), StationError> {
        let archive = &self.archive;
        let n = SampleSeries::steps_between(start, end, timestep);
        let overlap = archive.axis.overlap(&archive.path, start, n, timestep)?;
        let columns = match &overlap {
            Some(overlap) => {
                let row = self.row;
                let range = overlap.file.clone();
                archive
                    .read_columns(|var| var.get_values::<f64, _>((row, range.clone())))
                    .map_err(|e| e.within(&archive.path))?
            }
            None => RawColumns::default(),
        };
        self.series = assemble(start, end, timestep, overlap.as_ref(), &columns, archive.fill, self.mode);
        Ok(())
    }

    fn series(&self) -> &SampleSeries {
        &self.series
    }

    fn series_mut(&mut self) -> &mut SampleSeries {
        &mut self.series
    }
}
