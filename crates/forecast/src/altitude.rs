//! Mean DEM altitude per forecast pixel, and its `.agp` sidecar.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ForecastError;
use crate::raster::{GridGeometry, Raster};

/// Mean altitude (m) of every forecast pixel covered by the DEM.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelAltitudes {
    values: Vec<Option<f64>>,
}

impl PixelAltitudes {
    /// Averages the DEM cells whose centres fall in each forecast pixel.
    pub fn compute(dem: &Raster, forecast: &GridGeometry) -> Self {
        let mut sums = vec![(0.0, 0u64); forecast.len()];
        let source = dem.geometry();
        for cell in 0..source.len() {
            let Some(altitude) = dem.value(cell) else {
                continue;
            };
            let (x, y) = source.center(cell);
            if let Some(pixel) = forecast.locate(x, y) {
                sums[pixel].0 += altitude;
                sums[pixel].1 += 1;
            }
        }
        let values: Vec<Option<f64>> = sums
            .into_iter()
            .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
            .collect();
        debug!(
            n_pixels = values.len(),
            n_covered = values.iter().flatten().count(),
            "pixel altitudes computed"
        );
        Self { values }
    }

    /// Reads an `.agp` sidecar: a blank line, then `pixel altitude` rows.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FileNotFound`] if absent,
    /// [`ForecastError::FileRead`] on malformed rows and
    /// [`ForecastError::DataIntegrity`] for pixels outside an
    /// `n_pixels`-pixel grid.
    pub fn load(path: &Path, n_pixels: usize) -> Result<Self, ForecastError> {
        let text = fs::read_to_string(path).map_err(|e| ForecastError::io(path, e))?;
        let mut values = vec![None; n_pixels];
        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [] => continue,
                [pixel, altitude] => {
                    let pixel: usize = pixel
                        .parse()
                        .map_err(|e| ForecastError::at_line(path, line_no, format!("pixel '{pixel}': {e}")))?;
                    let altitude: f64 = altitude
                        .parse()
                        .map_err(|e| ForecastError::at_line(path, line_no, format!("altitude '{altitude}': {e}")))?;
                    let slot = values.get_mut(pixel).ok_or_else(|| ForecastError::DataIntegrity {
                        reason: format!(
                            "{}:{line_no} references pixel {pixel} of a {n_pixels}-pixel grid",
                            path.display()
                        ),
                    })?;
                    *slot = Some(altitude);
                }
                _ => {
                    return Err(ForecastError::at_line(
                        path,
                        line_no,
                        format!("expected 'pixel altitude', found {} fields", fields.len()),
                    ));
                }
            }
        }
        Ok(Self { values })
    }

    /// Writes the `.agp` sidecar, skipping pixels without altitude.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FileWrite`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ForecastError> {
        let mut text = String::from("\n");
        for (pixel, altitude) in self.values.iter().enumerate() {
            if let Some(altitude) = altitude {
                let _ = writeln!(text, "{pixel} {altitude}");
            }
        }
        fs::write(path, text).map_err(|e| ForecastError::write(path, e))
    }

    /// Mean altitude of `pixel`, if the DEM covers it.
    pub fn get(&self, pixel: usize) -> Option<f64> {
        self.values.get(pixel).copied().flatten()
    }

    /// Number of pixels of the grid.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for an empty grid.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
