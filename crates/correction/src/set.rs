//! Correction files and the correction collection.
//!
//! A correction file opens with a free header block; the first line that
//! starts with `0;` or `1;` is the first data row. Rows run until a blank
//! line or the end of the file:
//!
//! ```text
//! active;start;end;variable;additive;multiplicative;group_code;group_name
//! active;start;end;6;c1;c2;c3;group_code;group_name
//! ```
//!
//! Dates are `YYYY-MM-DD HH`.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use hydromet_calendar::DateHour;
use hydromet_zones::split_fields;
use tracing::debug;

use crate::correction::{Coefficients, Correction, CorrectionVariable, GroupScope};
use crate::error::CorrectionError;

/// Group names a correction may refer to.
pub trait GroupCatalog {
    /// True if `name` is a hydrological zone group.
    fn has_hydro_group(&self, name: &str) -> bool;

    /// True if `name` is a correction group.
    fn has_correction_group(&self, name: &str) -> bool;
}

/// A fixed catalog of group names, compared without regard to case.
#[derive(Debug, Clone, Default)]
pub struct KnownGroups {
    hydro: BTreeSet<String>,
    correction: BTreeSet<String>,
}

impl KnownGroups {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hydrological group.
    pub fn with_hydro_group(mut self, name: &str) -> Self {
        self.hydro.insert(name.to_uppercase());
        self
    }

    /// Adds a correction group.
    pub fn with_correction_group(mut self, name: &str) -> Self {
        self.correction.insert(name.to_uppercase());
        self
    }
}

impl GroupCatalog for KnownGroups {
    fn has_hydro_group(&self, name: &str) -> bool {
        self.hydro.contains(&name.to_uppercase())
    }

    fn has_correction_group(&self, name: &str) -> bool {
        self.correction.contains(&name.to_uppercase())
    }
}

/// All corrections of a simulation, in file order.
#[derive(Debug, Clone, Default)]
pub struct CorrectionSet {
    corrections: Vec<Correction>,
}

impl CorrectionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a correction file, checking group names against `groups`.
    ///
    /// # Errors
    ///
    /// Returns [`CorrectionError::FileNotFound`] for a missing file and
    /// [`CorrectionError::FileRead`] with the line number for the first
    /// malformed or invalid row.
    pub fn load_file(path: &Path, groups: &dyn GroupCatalog) -> Result<Self, CorrectionError> {
        let text = fs::read_to_string(path).map_err(|e| CorrectionError::io(path, e))?;
        let set = Self::parse(path, &text, groups)?;
        debug!(path = %path.display(), n = set.len(), "corrections loaded");
        Ok(set)
    }

    /// Parses the text of a correction file; `path` is used for error
    /// reporting only.
    ///
    /// # Errors
    ///
    /// See [`CorrectionSet::load_file`].
    pub fn parse(path: &Path, text: &str, groups: &dyn GroupCatalog) -> Result<Self, CorrectionError> {
        let mut corrections = Vec::new();
        let rows = text
            .lines()
            .enumerate()
            .skip_while(|(_, line)| !is_data_row(line));

        for (i, line) in rows {
            if line.trim().is_empty() {
                break;
            }
            corrections.push(parse_row(path, i + 1, line, groups)?);
        }
        Ok(Self { corrections })
    }

    /// Appends a correction.
    pub fn push(&mut self, correction: Correction) {
        self.corrections.push(correction);
    }

    /// Corrections of `variable` applicable at `at`.
    pub fn applicable(&self, at: DateHour, variable: CorrectionVariable) -> impl Iterator<Item = &Correction> {
        self.corrections
            .iter()
            .filter(move |c| c.variable == variable && c.applicable(at))
    }

    /// All corrections in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, Correction> {
        self.corrections.iter()
    }

    /// Number of corrections.
    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    /// Returns `true` if there is no correction.
    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }
}

fn is_data_row(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("0;") || line.starts_with("1;")
}

fn parse_row(path: &Path, line_no: usize, line: &str, groups: &dyn GroupCatalog) -> Result<Correction, CorrectionError> {
    let fields = split_fields(line);
    let err = |reason: String| CorrectionError::at_line(path, line_no, reason);
    let field = |index: usize| -> Result<&str, CorrectionError> {
        fields
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| err(format!("expected at least {} fields, got {}", index + 1, fields.len())))
    };
    let float = |index: usize| -> Result<f64, CorrectionError> {
        let text = field(index)?;
        text.parse::<f64>()
            .map_err(|e| err(format!("field {}: '{text}': {e}", index + 1)))
    };
    let integer = |index: usize| -> Result<i64, CorrectionError> {
        let text = field(index)?;
        text.parse::<i64>()
            .map_err(|e| err(format!("field {}: '{text}': {e}", index + 1)))
    };
    let date = |index: usize| -> Result<DateHour, CorrectionError> {
        let text = field(index)?;
        text.parse::<DateHour>()
            .map_err(|e| err(format!("field {}: {e}", index + 1)))
    };

    let active = match integer(0)? {
        0 => false,
        1 => true,
        code => return Err(err(format!("active flag must be 0 or 1, found {code}"))),
    };
    let start = date(1)?;
    let end = date(2)?;
    if start > end {
        return Err(err(format!("start {start} is after end {end}")));
    }
    let code = integer(3)?;
    let variable = CorrectionVariable::from_code(code)
        .ok_or_else(|| err(format!("variable code {code} not in 1..=6")))?;

    let (coefficients, next) = if variable == CorrectionVariable::Saturation {
        (Coefficients::Saturation([float(4)?, float(5)?, float(6)?]), 7)
    } else {
        (
            Coefficients::Linear {
                additive: float(4)?,
                multiplicative: float(5)?,
            },
            6,
        )
    };

    let group_code = integer(next)?;
    let scope = GroupScope::from_code(group_code)
        .ok_or_else(|| err(format!("group code {group_code} not in 0..=2")))?;
    let group = fields
        .get(next + 1)
        .filter(|s| !s.is_empty())
        .cloned();
    let known = match (scope, group.as_deref()) {
        (GroupScope::AllZones, _) => true,
        (GroupScope::HydroGroup, Some(name)) => groups.has_hydro_group(name),
        (GroupScope::CorrectionGroup, Some(name)) => groups.has_correction_group(name),
        (_, None) => false,
    };
    if !known {
        return Err(err(format!(
            "unknown group '{}' for group code {group_code}",
            group.as_deref().unwrap_or("")
        )));
    }

    Ok(Correction {
        variable,
        scope,
        group: if scope == GroupScope::AllZones { None } else { group },
        active,
        start,
        end,
        coefficients,
    })
}
