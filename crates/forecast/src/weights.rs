//! Area weights of forecast pixels per zone, and their `.pgp` sidecar.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use hydromet_zones::ZoneSet;
use tracing::{debug, warn};

use crate::error::ForecastError;
use crate::raster::{GridGeometry, Raster};

/// Row terminator of the `.pgp` format.
const END_OF_ROW: &str = "-1";

/// Per zone index, the forecast pixels the zone overlaps and their weights.
///
/// Weights of a zone sum to 1 unless the zone has no pixel at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelWeights {
    zones: Vec<Vec<(usize, f64)>>,
}

impl PixelWeights {
    /// Wraps precomputed `(pixel, weight)` lists, one per zone index.
    pub fn new(zones: Vec<Vec<(usize, f64)>>) -> Self {
        Self { zones }
    }

    /// Overlays the zone-id raster on the forecast grid.
    ///
    /// Each valid zone cell is mapped through its centre into the forecast
    /// grid; cells falling outside it, or carrying an id that is not a
    /// simulated zone, are not counted. Hits are normalised by the zone's
    /// counted cells.
    pub fn compute(zone_raster: &Raster, forecast: &GridGeometry, zones: &ZoneSet) -> Self {
        let mut hits: Vec<BTreeMap<usize, u64>> = vec![BTreeMap::new(); zones.len()];
        let source = zone_raster.geometry();
        for cell in 0..source.len() {
            let Some(value) = zone_raster.value(cell) else {
                continue;
            };
            let Some(zone) = zones.index_of(value.round() as i32) else {
                continue;
            };
            let (x, y) = source.center(cell);
            if let Some(pixel) = forecast.locate(x, y) {
                *hits[zone].entry(pixel).or_default() += 1;
            }
        }

        let weights: Vec<Vec<(usize, f64)>> = hits
            .into_iter()
            .map(|counts| {
                let total: u64 = counts.values().sum();
                counts
                    .into_iter()
                    .map(|(pixel, n)| (pixel, n as f64 / total as f64))
                    .collect()
            })
            .collect();

        for (zone, list) in zones.iter().zip(&weights) {
            if list.is_empty() {
                warn!(zone = zone.id(), "zone does not overlap the forecast grid");
            }
        }
        debug!(n_zones = weights.len(), "pixel weights computed");
        Self { zones: weights }
    }

    /// Reads a `.pgp` sidecar: a blank line, then per zone index
    /// `index pixel weight pixel weight ... -1`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FileNotFound`] if absent,
    /// [`ForecastError::FileRead`] on malformed rows and
    /// [`ForecastError::DataIntegrity`] if the rows do not match `n_zones`
    /// zones on a grid of `n_pixels` pixels.
    pub fn load(path: &Path, n_zones: usize, n_pixels: usize) -> Result<Self, ForecastError> {
        let text = fs::read_to_string(path).map_err(|e| ForecastError::io(path, e))?;
        let mut zones = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let mut tokens = line.split_whitespace();
            let Some(first) = tokens.next() else {
                continue;
            };
            let index: usize = first
                .parse()
                .map_err(|e| ForecastError::at_line(path, line_no, format!("zone index '{first}': {e}")))?;
            if index != zones.len() {
                return Err(ForecastError::DataIntegrity {
                    reason: format!(
                        "{}:{line_no} holds zone {index}, expected {}",
                        path.display(),
                        zones.len()
                    ),
                });
            }

            let mut list = Vec::new();
            let mut terminated = false;
            while let Some(token) = tokens.next() {
                if token == END_OF_ROW {
                    terminated = true;
                    break;
                }
                let pixel: usize = token
                    .parse()
                    .map_err(|e| ForecastError::at_line(path, line_no, format!("pixel '{token}': {e}")))?;
                if pixel >= n_pixels {
                    return Err(ForecastError::DataIntegrity {
                        reason: format!(
                            "{}:{line_no} references pixel {pixel} of a {n_pixels}-pixel grid",
                            path.display()
                        ),
                    });
                }
                let weight = tokens
                    .next()
                    .ok_or_else(|| ForecastError::at_line(path, line_no, format!("pixel {pixel} without weight")))?;
                let weight: f64 = weight
                    .parse()
                    .map_err(|e| ForecastError::at_line(path, line_no, format!("weight '{weight}': {e}")))?;
                list.push((pixel, weight));
            }
            if !terminated {
                return Err(ForecastError::at_line(path, line_no, "row is not terminated by -1"));
            }
            zones.push(list);
        }

        if zones.len() != n_zones {
            return Err(ForecastError::DataIntegrity {
                reason: format!(
                    "{} holds weights for {} zones, {n_zones} simulated",
                    path.display(),
                    zones.len()
                ),
            });
        }
        Ok(Self { zones })
    }

    /// Writes the `.pgp` sidecar.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FileWrite`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ForecastError> {
        let mut text = String::from("\n");
        for (index, list) in self.zones.iter().enumerate() {
            let _ = write!(text, "{index}");
            for (pixel, weight) in list {
                let _ = write!(text, " {pixel} {weight}");
            }
            let _ = writeln!(text, " {END_OF_ROW}");
        }
        fs::write(path, text).map_err(|e| ForecastError::write(path, e))
    }

    /// Number of zones covered.
    pub fn n_zones(&self) -> usize {
        self.zones.len()
    }

    /// `(pixel, weight)` pairs of the zone at `index`, ordered by pixel.
    pub fn zone(&self, index: usize) -> &[(usize, f64)] {
        self.zones.get(index).map_or(&[], Vec::as_slice)
    }
}
