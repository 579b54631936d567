//! Gridded NetCDF: every cell of a `[time, y, x]` field is a station.
//!
//! Coordinates come from `lat`/`lon` (1-D per axis or 2-D `[y, x]`), or
//! `y`/`x` in the project CRS; altitude from `alt` `[y, x]`. Cells without
//! an altitude are outside the domain and are skipped.

use std::path::Path;
use std::rc::Rc;

use hydromet_calendar::DateHour;
use tracing::debug;

use crate::archive::{RawColumns, assemble, decode_fill};
use crate::error::StationError;
use crate::netcdf_common::{ALTITUDE, NetcdfArchive, dimension_len, fill_value, read_all_f64, require, resolve};
use crate::sample::TemperatureMode;
use crate::series::SampleSeries;
use crate::station::{CoordinateKind, Station, StationInfo};

/// One cell of a gridded NetCDF file.
#[derive(Debug)]
pub struct GridCellStation {
    info: StationInfo,
    archive: Rc<NetcdfArchive>,
    row: usize,
    col: usize,
    mode: TemperatureMode,
    series: SampleSeries,
}

impl GridCellStation {
    /// Grid position as (row, column).
    pub fn cell(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

/// Coordinate of a cell from a 2-D `[y, x]` variable, or from a 1-D one
/// indexed by row (`along_rows`) or column.
fn cell_coordinate(values: &[f64], row: usize, col: usize, ny: usize, nx: usize, along_rows: bool) -> Option<f64> {
    if values.len() == ny * nx {
        values.get(row * nx + col).copied()
    } else if along_rows {
        values.get(row).copied()
    } else {
        values.get(col).copied()
    }
}

/// Opens a gridded NetCDF file and lists one station per valid cell.
///
/// # Errors
///
/// Returns [`StationError::FileNotFound`], [`StationError::MissingVariable`]
/// for absent coordinates, altitude or data, and [`StationError::FileRead`]
/// naming `path` for an unreadable file or an altitude field that does not
/// match the grid.
pub fn read_grid(path: &Path, mode: TemperatureMode) -> Result<Vec<GridCellStation>, StationError> {
    open_grid(path, mode).map_err(|e| e.within(path))
}

fn open_grid(path: &Path, mode: TemperatureMode) -> Result<Vec<GridCellStation>, StationError> {
    let archive = NetcdfArchive::open(path)?;
    let file = &archive.file;
    let ny = dimension_len(file, "y", path)?;
    let nx = dimension_len(file, "x", path)?;

    let (xs, ys, kind) = if resolve(file, &["lon"]).is_some() {
        (
            read_all_f64(file, &["lon"], path)?,
            read_all_f64(file, &["lat"], path)?,
            CoordinateKind::Geographic,
        )
    } else {
        (
            read_all_f64(file, &["x"], path)?,
            read_all_f64(file, &["y"], path)?,
            CoordinateKind::Projected,
        )
    };

    let alt_name = require(file, ALTITUDE, path)?;
    let alt_fill = fill_value(file, &alt_name);
    let altitudes = read_all_f64(file, &[alt_name.as_str()], path)?;
    if altitudes.len() != ny * nx {
        return Err(StationError::read(
            path,
            format!("'{alt_name}' has {} values, grid is {ny}x{nx}", altitudes.len()),
        ));
    }

    let archive = Rc::new(archive);
    let mut stations = Vec::new();
    for row in 0..ny {
        for col in 0..nx {
            let Some(altitude) = decode_fill(altitudes[row * nx + col], alt_fill) else {
                continue;
            };
            let (Some(x), Some(y)) = (
                cell_coordinate(&xs, row, col, ny, nx, false),
                cell_coordinate(&ys, row, col, ny, nx, true),
            ) else {
                return Err(StationError::read(path, format!("no coordinate for cell ({row}, {col})")));
            };
            stations.push(GridCellStation {
                info: StationInfo::new(format!("cell_{row}_{col}"), x, y, altitude, kind),
                archive: Rc::clone(&archive),
                row,
                col,
                mode,
                series: SampleSeries::default(),
            });
        }
    }
    debug!(path = %path.display(), ny, nx, n_cells = stations.len(), "gridded netcdf opened");
    Ok(stations)
}

impl Station for GridCellStation {
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
                let (row, col) = (self.row, self.col);
                let range = overlap.file.clone();
                archive
                    .read_columns(|var| var.get_values::<f64, _>((range.clone(), row, col)))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_dimensional_coordinates() {
        let lon = [10.0, 11.0, 12.0];
        let lat = [45.0, 46.0];
        assert_eq!(cell_coordinate(&lon, 1, 2, 2, 3, false), Some(12.0));
        assert_eq!(cell_coordinate(&lat, 1, 2, 2, 3, true), Some(46.0));
    }

    #[test]
    fn two_dimensional_coordinates() {
        let lat = [45.0, 45.1, 45.2, 46.0, 46.1, 46.2];
        assert_eq!(cell_coordinate(&lat, 1, 1, 2, 3, true), Some(46.1));
    }
}
