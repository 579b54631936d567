//! # hydromet-correction
//!
//! Time-windowed corrections of zone forcing: additive/multiplicative
//! adjustments of temperature, precipitation and soil state, or per-layer
//! saturation coefficients, each scoped to all zones or to one group.
//!
//! The records are a data model only; applying them to zone state is the
//! consumer's business.

mod correction;
mod error;
mod set;

pub use correction::{Coefficients, Correction, CorrectionVariable, GroupScope};
pub use error::CorrectionError;
pub use set::{CorrectionSet, GroupCatalog, KnownGroups};
