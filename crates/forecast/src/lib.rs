//! # hydromet-forecast
//!
//! Distributes gridded daily forecasts (tmin, tmax, precipitation, snow)
//! onto simulated zones by area-weighted pixel overlay, with elevation
//! gradients and a rain/snow phase partition.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`raster`] | `Raster`, `GridGeometry`, `RasterSource`, ESRI ASCII codec |
//! | [`grp`] | `.grp` forecast grid description |
//! | [`weights`] | `.pgp` pixel weighting cache |
//! | [`altitude`] | `.agp` pixel altitude cache |
//! | [`params`] | per-zone gradients and phase threshold |
//! | [`density`] | fresh snow density |
//! | [`phase`] | rain/snow transformation rate |
//! | [`grid`] | `ForecastGrid` engine |
//!
//! ```no_run
//! use std::path::Path;
//! use hydromet_calendar::DateHour;
//! use hydromet_forecast::{ForecastGrid, ForecastGridConfig};
//! use hydromet_zones::ZoneSet;
//!
//! let zones = ZoneSet::load_csv(Path::new("zones.csv"))?;
//! let config = ForecastGridConfig::load(Path::new("meteo/gem.grp"))?;
//! let mut grid = ForecastGrid::new(config, "zones.asc", "dem.asc");
//! let start: DateHour = "2021-04-01 00".parse()?;
//! grid.initialise(&zones, start)?;
//! let forcing = grid.compute(start, &zones)?;
//! println!("{:?}", forcing[0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod altitude;
pub mod density;
mod error;
pub mod grid;
pub mod grp;
pub mod params;
pub mod phase;
pub mod raster;
pub mod weights;

pub use altitude::PixelAltitudes;
pub use density::{HedstromPomeroy, SnowDensity, WATER_DENSITY};
pub use error::ForecastError;
pub use grid::ForecastGrid;
pub use grp::{ForecastGridConfig, ForecastVariable};
pub use params::{DEFAULT_THRESHOLD, GLOBAL_SECTION, ZoneForecastParams};
pub use phase::{partition_phase, transformation_rate};
pub use raster::{AsciiGridReader, GridGeometry, Raster, RasterSource};
pub use weights::PixelWeights;
