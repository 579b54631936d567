//! # hydromet-zones
//!
//! Zone geometry shared by the forcing engines, plus the readers for
//! per-zone parameter tables and the consolidated global parameter file.

mod error;
mod params;
mod table;
mod zone;

pub use error::{ZoneError, line_suffix};
pub use params::{GlobalParameters, GroupRow, ParameterSource, SECTION_KEYWORD, Section};
pub use table::{TableRow, read_table, rows_from_text, split_fields};
pub use zone::{Zone, ZoneSet};
