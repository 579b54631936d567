//! # hydromet-station
//!
//! Weather stations read from heterogeneous sources, kept in a registry
//! that fills missing samples from neighbouring stations.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`sample`] | `WeatherSample`, the file sentinel, temperature assignment |
//! | [`series`] | `SampleSeries`, the time-indexed buffer behind every station |
//! | [`station`] | `Station` trait, `StationInfo`, in-memory stations |
//! | [`legacy`] | `.stm` station lists with `.met` data files |
//! | [`hdf5_store`] | HDF5 `[station, time]` array store |
//! | [`netcdf_station`] | NetCDF with a `station` dimension |
//! | [`netcdf_grid`] | gridded NetCDF, one station per cell |
//! | [`projection`] | `CoordinateTransform` and station reprojection |
//! | [`interpolate`] | v1/v2 nearest-station filling |
//! | [`set`] | `StationSet` registry and format dispatch |
//!
//! ```no_run
//! use std::path::Path;
//! use hydromet_calendar::DateHour;
//! use hydromet_station::{IdentityTransform, InterpolationVersion, StationSet};
//!
//! let mut set = StationSet::new(InterpolationVersion::V1);
//! set.read(Path::new("stations.stm"), &IdentityTransform)?;
//! let start: DateHour = "2020-01-01 00".parse()?;
//! let report = set.load_series(start, start.plus_hours(24 * 30), 24)?;
//! println!("{} samples filled", report.filled);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod archive;
mod error;
pub mod hdf5_store;
pub mod interpolate;
pub mod legacy;
mod netcdf_common;
pub mod netcdf_grid;
pub mod netcdf_station;
pub mod projection;
pub mod sample;
pub mod series;
pub mod set;
pub mod station;

pub use error::StationError;
pub use interpolate::{InterpolationReport, InterpolationVersion, V1_GRADIENT};
pub use projection::{CoordinateTransform, Equirectangular, IdentityTransform};
pub use sample::{MISSING_VALUE, TemperatureMode, WeatherSample};
pub use series::SampleSeries;
pub use set::{StationFormat, StationSet};
pub use station::{CoordinateKind, MemoryStation, Station, StationInfo};
