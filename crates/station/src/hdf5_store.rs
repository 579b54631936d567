//! Stations stored as `[station, time]` arrays in one HDF5 file.
//!
//! Layout:
//!
//! | Path | Type | Content |
//! |------|------|---------|
//! | `/stations/id` | var-len string `[n]` | station identifiers |
//! | `/stations/x`, `/stations/y`, `/stations/z` | f64 `[n]` | coordinates, altitude |
//! | `/stations/coordinate_type` | i32 scalar | 1 = lon/lat, 2 = project CRS |
//! | `/series/start` | i32 `[4]` | year, month, day, hour of the first step |
//! | `/series/timestep` | i32 scalar | hours per step |
//! | `/series/tmin`, `tmax`, `rain`, `snow` | f32 `[n, time]` | data, `snow` optional |

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use hdf5::types::VarLenUnicode;
use hydromet_calendar::DateHour;
use ndarray::s;
use tracing::debug;

use crate::archive::{RawColumns, TimeAxis, assemble};
use crate::error::StationError;
use crate::sample::TemperatureMode;
use crate::series::SampleSeries;
use crate::station::{CoordinateKind, Station, StationInfo};

/// An open HDF5 station file shared by all of its stations.
pub struct Hdf5Archive {
    path: PathBuf,
    file: hdf5::File,
    axis: TimeAxis,
    has_snow: bool,
}

impl fmt::Debug for Hdf5Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hdf5Archive")
            .field("path", &self.path)
            .field("axis", &self.axis)
            .field("has_snow", &self.has_snow)
            .finish()
    }
}

impl Hdf5Archive {
    fn read_row(&self, name: &str, row: usize, range: std::ops::Range<usize>) -> Result<Vec<f64>, StationError> {
        let dataset = self.file.dataset(&format!("series/{name}"))?;
        let values = dataset.read_slice_1d::<f32, _>(s![row, range])?;
        Ok(values.iter().map(|&v| f64::from(v)).collect())
    }
}

/// One station row of an [`Hdf5Archive`].
#[derive(Debug)]
pub struct Hdf5Station {
    info: StationInfo,
    archive: Rc<Hdf5Archive>,
    row: usize,
    mode: TemperatureMode,
    series: SampleSeries,
}

/// Opens an HDF5 station file and lists its stations.
///
/// # Errors
///
/// Returns [`StationError::FileNotFound`] for a missing file and
/// [`StationError::FileRead`] naming `path` for an unreadable file, missing
/// datasets, inconsistent array lengths or an unknown coordinate type.
pub fn read_archive(path: &Path, mode: TemperatureMode) -> Result<Vec<Hdf5Station>, StationError> {
    open_archive(path, mode).map_err(|e| e.within(path))
}

fn open_archive(path: &Path, mode: TemperatureMode) -> Result<Vec<Hdf5Station>, StationError> {
    if !path.exists() {
        return Err(StationError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = hdf5::File::open(path)?;

    let ids = file.dataset("stations/id")?.read_raw::<VarLenUnicode>()?;
    let x = file.dataset("stations/x")?.read_raw::<f64>()?;
    let y = file.dataset("stations/y")?.read_raw::<f64>()?;
    let z = file.dataset("stations/z")?.read_raw::<f64>()?;
    let kind_code = file.dataset("stations/coordinate_type")?.read_scalar::<i32>()?;
    let kind = CoordinateKind::from_code(i64::from(kind_code))
        .ok_or_else(|| StationError::read(path, format!("unknown coordinate type {kind_code}")))?;
    let n = ids.len();
    if x.len() != n || y.len() != n || z.len() != n {
        return Err(StationError::read(
            path,
            format!(
                "station arrays disagree: {n} ids, {} x, {} y, {} z",
                x.len(),
                y.len(),
                z.len()
            ),
        ));
    }

    let start = file.dataset("series/start")?.read_raw::<i32>()?;
    let &[year, month, day, hour] = start.as_slice() else {
        return Err(StationError::read(path, format!("series/start has {} values, expected 4", start.len())));
    };
    let to_u16 = |v: i32| u16::try_from(v).map_err(|_| StationError::read(path, format!("series/start value {v} out of range")));
    let start = DateHour::new(to_u16(year)?, to_u16(month)?, to_u16(day)?, to_u16(hour)?)?;
    let timestep = file.dataset("series/timestep")?.read_scalar::<i32>()?;
    let timestep = u16::try_from(timestep)
        .ok()
        .filter(|&t| t > 0)
        .ok_or_else(|| StationError::read(path, format!("invalid timestep {timestep}")))?;

    let shape = file.dataset("series/tmin")?.shape();
    if shape.len() != 2 || shape[0] != n {
        return Err(StationError::read(
            path,
            format!("series/tmin has shape {shape:?}, expected [{n}, time]"),
        ));
    }
    let has_snow = file.link_exists("series/snow");

    let archive = Rc::new(Hdf5Archive {
        path: path.to_path_buf(),
        file,
        axis: TimeAxis {
            start,
            timestep,
            len: shape[1],
        },
        has_snow,
    });
    debug!(path = %path.display(), n_stations = n, timestep, "hdf5 station file opened");

    Ok(ids
        .iter()
        .enumerate()
        .map(|(row, id)| Hdf5Station {
            info: StationInfo::new(id.as_str(), x[row], y[row], z[row], kind),
            archive: Rc::clone(&archive),
            row,
            mode,
            series: SampleSeries::default(),
        })
        .collect())
}

impl Station for Hdf5Station {
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

        let mut columns = RawColumns::default();
        if let Some(overlap) = &overlap {
            let read = |name: &str| {
                archive
                    .read_row(name, self.row, overlap.file.clone())
                    .map_err(|e| e.within(&archive.path))
            };
            columns.tmin = read("tmin")?;
            columns.tmax = read("tmax")?;
            columns.rain = read("rain")?;
            if archive.has_snow {
                columns.snow = Some(read("snow")?);
            }
        }
        self.series = assemble(start, end, timestep, overlap.as_ref(), &columns, None, self.mode);
        Ok(())
    }

    fn series(&self) -> &SampleSeries {
        &self.series
    }

    fn series_mut(&mut self) -> &mut SampleSeries {
        &mut self.series
    }
}
