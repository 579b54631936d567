//! # hydromet-radiation
//!
//! Daily net radiation of each zone: extraterrestrial radiation on the
//! zone's inclined surface, cached per day of year, then a temperature
//! driven shortwave/longwave budget.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`astro`] | declination, sunset angle, daily and instantaneous Ra |
//! | [`budget`] | transmissivity, cloud fraction, emissivities |
//! | [`params`] | per-zone albedo and coefficients |
//! | [`engine`] | `NetRadiation` with its day-of-year cache |

pub mod astro;
pub mod budget;
pub mod engine;
mod error;
pub mod params;

pub use astro::{SOLAR_CONSTANT, SurfaceGeometry, daily_extraterrestrial, instant_extraterrestrial};
pub use budget::{RadiationBudget, RadiationCoefficients, STEFAN_BOLTZMANN, compute_budget};
pub use engine::{DEFAULT_SNOW_ALBEDO, NetRadiation};
pub use error::RadiationError;
pub use params::{GLOBAL_SECTION, NetRadiationParams};
