//! Semicolon-separated parameter tables.
//!
//! Parameter files open with a free-form metadata block of any length. The
//! data begins at the first line whose first field parses as an integer
//! identifier; from there on every non-blank line is a data row.

use std::fs;
use std::path::Path;

use crate::error::ZoneError;

/// One data row of a parameter table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// 1-based line number in the source file.
    pub line: usize,
    /// Trimmed fields, split on `;`.
    pub fields: Vec<String>,
}

impl TableRow {
    /// Parses field `index` as an integer identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::FileRead`] naming `path` and the row's line.
    pub fn id(&self, index: usize, path: &Path) -> Result<i64, ZoneError> {
        let text = self.field(index, path)?;
        text.parse::<i64>()
            .map_err(|e| ZoneError::at_line(path, self.line, format!("field {}: '{text}': {e}", index + 1)))
    }

    /// Parses field `index` as a float.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::FileRead`] naming `path` and the row's line.
    pub fn float(&self, index: usize, path: &Path) -> Result<f64, ZoneError> {
        let text = self.field(index, path)?;
        text.parse::<f64>()
            .map_err(|e| ZoneError::at_line(path, self.line, format!("field {}: '{text}': {e}", index + 1)))
    }

    /// Parses fields `from..` as floats.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::FileRead`] on the first unparsable field.
    pub fn floats_from(&self, from: usize, path: &Path) -> Result<Vec<f64>, ZoneError> {
        (from..self.fields.len())
            .map(|i| self.float(i, path))
            .collect()
    }

    fn field(&self, index: usize, path: &Path) -> Result<&str, ZoneError> {
        self.fields.get(index).map(String::as_str).ok_or_else(|| {
            ZoneError::at_line(
                path,
                self.line,
                format!("expected at least {} fields, got {}", index + 1, self.fields.len()),
            )
        })
    }
}

/// Splits a line on `;`, trimming every field and dropping one trailing
/// empty field left by a terminating separator.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields: Vec<String> = line.split(';').map(|f| f.trim().to_string()).collect();
    if fields.len() > 1 && fields.last().is_some_and(String::is_empty) {
        fields.pop();
    }
    fields
}

/// Reads the data rows of a parameter table at `path`.
///
/// # Errors
///
/// Returns [`ZoneError::FileNotFound`] or [`ZoneError::FileRead`] if the
/// file cannot be read.
pub fn read_table(path: &Path) -> Result<Vec<TableRow>, ZoneError> {
    let text = fs::read_to_string(path).map_err(|e| ZoneError::io(path, e))?;
    Ok(rows_from_text(&text))
}

/// Extracts the data rows from the text of a parameter table.
pub fn rows_from_text(text: &str) -> Vec<TableRow> {
    let mut rows = Vec::new();
    let mut in_data = false;
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let fields = split_fields(line);
        if !in_data {
            in_data = fields.first().is_some_and(|f| f.parse::<i64>().is_ok());
            if !in_data {
                continue;
            }
        }
        rows.push(TableRow { line: i + 1, fields });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_block_is_skipped() {
        let text = "GRADIENTS\nversion;2\n\nUHRH ID;TEMP;PRECIP\n1;-0.6;5\n2;-0.5;4\n";
        let rows = rows_from_text(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 5);
        assert_eq!(rows[0].fields, vec!["1", "-0.6", "5"]);
    }

    #[test]
    fn trailing_separator_is_dropped() {
        assert_eq!(split_fields("1; 2.5 ;3;"), vec!["1", "2.5", "3"]);
        assert_eq!(split_fields(";"), vec![""]);
    }

    #[test]
    fn float_error_carries_line() {
        let rows = rows_from_text("id;a\n3;abc\n");
        let err = rows[0].float(1, Path::new("p.csv")).unwrap_err();
        match err {
            ZoneError::FileRead { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_field_is_an_error() {
        let rows = rows_from_text("5;1.0\n");
        assert!(rows[0].float(4, Path::new("p.csv")).is_err());
        assert_eq!(rows[0].floats_from(1, Path::new("p.csv")).unwrap(), vec![1.0]);
    }
}
