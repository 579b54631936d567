//! Per-zone parameter sources.
//!
//! Sub-model parameters come either from a dedicated per-zone table
//! (`zone_id;value;value...`) or from one section of the global parameter
//! file, where rows are keyed by parameter group and expanded to every
//! zone of that group.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ZoneError;
use crate::table::{TableRow, read_table, split_fields};
use crate::zone::ZoneSet;

/// Section header keyword of the global parameter file.
pub const SECTION_KEYWORD: &str = "SUBMODEL NAME";

/// One group row of a global parameter section.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    /// 1-based line number in the source file.
    pub line: usize,
    /// Parameter group identifier.
    pub group: u32,
    /// Values following the group id.
    pub values: Vec<f64>,
}

/// One `SUBMODEL NAME` section of the global parameter file.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    name: String,
    rows: Vec<GroupRow>,
}

impl Section {
    /// Section name as written in the file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group rows in ascending group order.
    pub fn rows(&self) -> &[GroupRow] {
        &self.rows
    }

    /// Expands the group rows to one value vector per zone.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Configuration`] if a zone's group has no row.
    pub fn per_zone(&self, zones: &ZoneSet) -> Result<Vec<Vec<f64>>, ZoneError> {
        zones
            .iter()
            .map(|zone| {
                self.rows
                    .binary_search_by_key(&zone.group(), |row| row.group)
                    .map(|i| self.rows[i].values.clone())
                    .map_err(|_| ZoneError::Configuration {
                        reason: format!(
                            "section '{}' has no row for group {} (zone {})",
                            self.name,
                            zone.group(),
                            zone.id()
                        ),
                    })
            })
            .collect()
    }
}

/// The consolidated global parameter file.
#[derive(Debug, Clone)]
pub struct GlobalParameters {
    path: PathBuf,
    sections: BTreeMap<String, Section>,
}

impl GlobalParameters {
    /// Reads and parses the global parameter file.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::FileRead`] on unreadable files, malformed rows,
    /// or group ids that are not strictly ascending within a section.
    pub fn load(path: &Path) -> Result<Self, ZoneError> {
        let text = fs::read_to_string(path).map_err(|e| ZoneError::io(path, e))?;
        Self::parse(path, &text)
    }

    /// Parses the text of a global parameter file; `path` is used for
    /// error reporting only.
    ///
    /// # Errors
    ///
    /// See [`GlobalParameters::load`].
    pub fn parse(path: &Path, text: &str) -> Result<Self, ZoneError> {
        let mut sections = BTreeMap::new();
        let mut current: Option<Section> = None;
        let mut expect_header = false;

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() {
                if let Some(section) = current.take() {
                    sections.insert(section.name.to_uppercase(), section);
                }
                continue;
            }

            let fields = split_fields(line);
            if fields[0].eq_ignore_ascii_case(SECTION_KEYWORD) {
                if let Some(section) = current.take() {
                    sections.insert(section.name.to_uppercase(), section);
                }
                let name = fields.get(1).cloned().unwrap_or_default();
                if name.is_empty() {
                    return Err(ZoneError::at_line(path, line_no, "section without a name"));
                }
                current = Some(Section {
                    name,
                    rows: Vec::new(),
                });
                expect_header = true;
                continue;
            }

            let Some(section) = current.as_mut() else {
                // Free text before the first section.
                continue;
            };
            if expect_header {
                expect_header = false;
                continue;
            }

            let row = TableRow {
                line: line_no,
                fields,
            };
            let group = row.id(0, path)?;
            let group = u32::try_from(group)
                .map_err(|_| ZoneError::at_line(path, line_no, format!("group id {group} out of range")))?;
            if let Some(last) = section.rows.last()
                && group <= last.group
            {
                return Err(ZoneError::at_line(
                    path,
                    line_no,
                    format!(
                        "group ids must be strictly ascending ({group} follows {})",
                        last.group
                    ),
                ));
            }
            section.rows.push(GroupRow {
                line: line_no,
                group,
                values: row.floats_from(1, path)?,
            });
        }
        if let Some(section) = current.take() {
            sections.insert(section.name.to_uppercase(), section);
        }

        debug!(path = %path.display(), n_sections = sections.len(), "global parameters parsed");
        Ok(Self {
            path: path.to_path_buf(),
            sections,
        })
    }

    /// Looks a section up by name, ignoring ASCII case.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(&name.to_uppercase())
    }

    /// Looks a section up, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Configuration`] naming the file.
    pub fn require_section(&self, name: &str) -> Result<&Section, ZoneError> {
        self.section(name).ok_or_else(|| ZoneError::Configuration {
            reason: format!("no '{name}' section in {}", self.path.display()),
        })
    }
}

/// Where a sub-model reads its per-zone parameters from.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSource {
    /// A dedicated `zone_id;values...` table.
    ZoneTable(PathBuf),
    /// A section of the global parameter file.
    Global {
        /// Path of the global parameter file.
        path: PathBuf,
        /// Section name.
        section: String,
    },
}

impl ParameterSource {
    /// Loads one value vector per zone, `None` for zones a zone table does
    /// not mention. Global sections cover every zone or fail.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError`] on unreadable files, malformed rows, unknown or
    /// duplicated zone ids, and groups without a row.
    pub fn load(&self, zones: &ZoneSet) -> Result<Vec<Option<Vec<f64>>>, ZoneError> {
        match self {
            ParameterSource::ZoneTable(path) => load_zone_table(path, zones),
            ParameterSource::Global { path, section } => {
                let global = GlobalParameters::load(path)?;
                let values = global.require_section(section)?.per_zone(zones)?;
                Ok(values.into_iter().map(Some).collect())
            }
        }
    }
}

fn load_zone_table(path: &Path, zones: &ZoneSet) -> Result<Vec<Option<Vec<f64>>>, ZoneError> {
    let mut values: Vec<Option<Vec<f64>>> = vec![None; zones.len()];
    for row in read_table(path)? {
        let id = row.id(0, path)?;
        let index = i32::try_from(id)
            .ok()
            .and_then(|id| zones.index_of(id))
            .ok_or_else(|| ZoneError::at_line(path, row.line, format!("unknown zone id {id}")))?;
        if values[index].is_some() {
            return Err(ZoneError::at_line(path, row.line, format!("zone id {id} listed twice")));
        }
        values[index] = Some(row.floats_from(1, path)?);
    }
    Ok(values)
}
