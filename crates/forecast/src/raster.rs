//! Two-dimensional float grids and the raster reading service.

use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

use hydromet_station::sample::decode;

use crate::error::ForecastError;

/// Placement of a north-up grid with square cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// Number of columns.
    pub ncols: usize,
    /// Number of rows.
    pub nrows: usize,
    /// X of the upper-left corner.
    pub x_origin: f64,
    /// Y of the upper-left corner.
    pub y_origin: f64,
    /// Cell edge length.
    pub cell_size: f64,
}

impl GridGeometry {
    /// Creates a geometry from its upper-left corner.
    pub fn new(ncols: usize, nrows: usize, x_origin: f64, y_origin: f64, cell_size: f64) -> Self {
        Self {
            ncols,
            nrows,
            x_origin,
            y_origin,
            cell_size,
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.ncols * self.nrows
    }

    /// Returns `true` for a grid without cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major index of the cell containing (`x`, `y`), if inside.
    pub fn locate(&self, x: f64, y: f64) -> Option<usize> {
        let row = ((self.y_origin - y) / self.cell_size).floor();
        let col = ((x - self.x_origin) / self.cell_size).floor();
        if row < 0.0 || col < 0.0 || row >= self.nrows as f64 || col >= self.ncols as f64 {
            return None;
        }
        Some(row as usize * self.ncols + col as usize)
    }

    /// Centre of the cell at row-major `index`.
    pub fn center(&self, index: usize) -> (f64, f64) {
        let row = index / self.ncols.max(1);
        let col = index % self.ncols.max(1);
        (
            self.x_origin + (col as f64 + 0.5) * self.cell_size,
            self.y_origin - (row as f64 + 0.5) * self.cell_size,
        )
    }

    /// Same shape and placement, within a millionth of a cell.
    pub fn matches(&self, other: &GridGeometry) -> bool {
        let tol = self.cell_size.abs() * 1e-6;
        self.ncols == other.ncols
            && self.nrows == other.nrows
            && (self.x_origin - other.x_origin).abs() <= tol
            && (self.y_origin - other.y_origin).abs() <= tol
            && (self.cell_size - other.cell_size).abs() <= tol
    }
}

/// A row-major grid of `f64` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    geometry: GridGeometry,
    nodata: Option<f64>,
    data: Vec<f64>,
}

impl Raster {
    /// Wraps `data`, which must hold `geometry.len()` values.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::DataIntegrity`] on a length mismatch.
    pub fn new(geometry: GridGeometry, nodata: Option<f64>, data: Vec<f64>) -> Result<Self, ForecastError> {
        if data.len() != geometry.len() {
            return Err(ForecastError::DataIntegrity {
                reason: format!(
                    "{} values for a {}x{} grid",
                    data.len(),
                    geometry.nrows,
                    geometry.ncols
                ),
            });
        }
        Ok(Self {
            geometry,
            nodata,
            data,
        })
    }

    /// A raster holding `value` everywhere.
    pub fn filled(geometry: GridGeometry, value: f64) -> Self {
        Self {
            geometry,
            nodata: None,
            data: vec![value; geometry.len()],
        }
    }

    /// Grid placement.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Declared nodata value.
    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// Raw values.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value at `index`; `None` if out of bounds, nodata, NaN or at/below
    /// the -999 sentinel.
    pub fn value(&self, index: usize) -> Option<f64> {
        let v = *self.data.get(index)?;
        if self.nodata == Some(v) {
            None
        } else {
            decode(v)
        }
    }

    /// Overwrites the value at `index`; ignored if out of bounds.
    pub fn set(&mut self, index: usize, value: f64) {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = value;
        }
    }
}

/// Reads a 2-D float grid from a file.
pub trait RasterSource: fmt::Debug {
    /// Reads the raster at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FileNotFound`] for a missing file and
    /// [`ForecastError::FileRead`] for undecodable content.
    fn read(&self, path: &Path) -> Result<Raster, ForecastError>;
}

/// ESRI ASCII grid (`.asc`) codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiGridReader;

impl AsciiGridReader {
    /// Writes `raster` as an ESRI ASCII grid with a lower-left corner
    /// header.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FileWrite`] if the file cannot be written.
    pub fn write(&self, raster: &Raster, path: &Path) -> Result<(), ForecastError> {
        let g = raster.geometry();
        let mut text = String::new();
        // Formatting into a String cannot fail.
        let _ = writeln!(text, "ncols {}", g.ncols);
        let _ = writeln!(text, "nrows {}", g.nrows);
        let _ = writeln!(text, "xllcorner {}", g.x_origin);
        let _ = writeln!(text, "yllcorner {}", g.y_origin - g.nrows as f64 * g.cell_size);
        let _ = writeln!(text, "cellsize {}", g.cell_size);
        if let Some(nodata) = raster.nodata() {
            let _ = writeln!(text, "NODATA_value {nodata}");
        }
        for row in raster.data().chunks(g.ncols.max(1)) {
            let line: Vec<String> = row.iter().map(f64::to_string).collect();
            let _ = writeln!(text, "{}", line.join(" "));
        }
        fs::write(path, text).map_err(|e| ForecastError::write(path, e))
    }

    /// Parses the text of an ESRI ASCII grid; `path` is used for error
    /// reporting only.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FileRead`] on missing header keys, bad
    /// numbers, or a value count that does not match the header.
    pub fn parse(path: &Path, text: &str) -> Result<Raster, ForecastError> {
        let mut ncols = None;
        let mut nrows = None;
        let mut x_ll = None;
        let mut y_ll = None;
        let mut centered = false;
        let mut cell_size = None;
        let mut nodata = None;
        let mut data = Vec::new();

        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let mut tokens = line.split_whitespace().peekable();
            let Some(first) = tokens.peek().copied() else {
                continue;
            };
            if first.starts_with(|c: char| c.is_ascii_alphabetic()) {
                let key = first.to_ascii_lowercase();
                tokens.next();
                let value = tokens
                    .next()
                    .ok_or_else(|| ForecastError::at_line(path, line_no, format!("header '{first}' without value")))?;
                let number = value
                    .parse::<f64>()
                    .map_err(|e| ForecastError::at_line(path, line_no, format!("{first} '{value}': {e}")))?;
                match key.as_str() {
                    "ncols" => ncols = Some(number as usize),
                    "nrows" => nrows = Some(number as usize),
                    "xllcorner" => x_ll = Some(number),
                    "yllcorner" => y_ll = Some(number),
                    "xllcenter" => {
                        x_ll = Some(number);
                        centered = true;
                    }
                    "yllcenter" => {
                        y_ll = Some(number);
                        centered = true;
                    }
                    "cellsize" => cell_size = Some(number),
                    "nodata_value" => nodata = Some(number),
                    _ => return Err(ForecastError::at_line(path, line_no, format!("unknown header '{first}'"))),
                }
                continue;
            }
            for token in tokens {
                let v = token
                    .parse::<f64>()
                    .map_err(|e| ForecastError::at_line(path, line_no, format!("value '{token}': {e}")))?;
                data.push(v);
            }
        }

        let missing = |key: &str| ForecastError::read(path, format!("missing header '{key}'"));
        let ncols = ncols.ok_or_else(|| missing("ncols"))?;
        let nrows = nrows.ok_or_else(|| missing("nrows"))?;
        let cell_size = cell_size.ok_or_else(|| missing("cellsize"))?;
        let mut x_origin = x_ll.ok_or_else(|| missing("xllcorner"))?;
        let mut y_ll = y_ll.ok_or_else(|| missing("yllcorner"))?;
        if centered {
            x_origin -= cell_size / 2.0;
            y_ll -= cell_size / 2.0;
        }
        let geometry = GridGeometry::new(ncols, nrows, x_origin, y_ll + nrows as f64 * cell_size, cell_size);
        Raster::new(geometry, nodata, data).map_err(|e| ForecastError::read(path, e.to_string()))
    }
}

impl RasterSource for AsciiGridReader {
    fn read(&self, path: &Path) -> Result<Raster, ForecastError> {
        let text = fs::read_to_string(path).map_err(|e| ForecastError::io(path, e))?;
        Self::parse(path, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_and_center() {
        let g = GridGeometry::new(3, 2, 100.0, 200.0, 10.0);
        assert_eq!(g.locate(105.0, 195.0), Some(0));
        assert_eq!(g.locate(125.0, 185.0), Some(5));
        assert_eq!(g.locate(130.0, 185.0), None);
        assert_eq!(g.locate(99.9, 195.0), None);
        assert_eq!(g.center(4), (115.0, 185.0));
    }

    #[test]
    fn parse_corner_header() {
        let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 5\nNODATA_value -9999\n1 2\n3 -9999\n";
        let r = AsciiGridReader::parse(Path::new("a.asc"), text).unwrap();
        assert_eq!(r.geometry().y_origin, 10.0);
        assert_eq!(r.value(2), Some(3.0));
        assert_eq!(r.value(3), None);
        assert_eq!(r.value(9), None);
    }

    #[test]
    fn parse_center_header() {
        let text = "ncols 1\nnrows 1\nxllcenter 2.5\nyllcenter 2.5\ncellsize 5\n7\n";
        let r = AsciiGridReader::parse(Path::new("a.asc"), text).unwrap();
        assert_eq!(r.geometry().x_origin, 0.0);
        assert_eq!(r.geometry().y_origin, 5.0);
    }

    #[test]
    fn short_data_is_rejected() {
        let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n";
        assert!(AsciiGridReader::parse(Path::new("a.asc"), text).is_err());
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.asc");
        let g = GridGeometry::new(2, 3, 10.0, 40.0, 10.0);
        let raster = Raster::new(g, Some(-9999.0), vec![1.0, 2.5, -9999.0, 4.0, 5.0, 6.0]).unwrap();
        AsciiGridReader.write(&raster, &path).unwrap();
        let back = AsciiGridReader.read(&path).unwrap();
        assert!(back.geometry().matches(&g));
        assert_eq!(back.value(1), Some(2.5));
        assert_eq!(back.value(2), None);
    }
}
