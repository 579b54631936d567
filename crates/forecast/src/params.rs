//! Per-zone forecast parameters.

use hydromet_zones::{ParameterSource, ZoneSet};

use crate::error::ForecastError;

/// Section of the global parameter file holding forecast parameters.
pub const GLOBAL_SECTION: &str = "GRILLE PREVISION";

/// Default rain/snow threshold temperature (°C).
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Elevation corrections and phase threshold of one zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneForecastParams {
    /// Temperature gradient (°C per 100 m).
    pub temperature_gradient: f64,
    /// Precipitation gradient (% per 100 m).
    pub precipitation_gradient: f64,
    /// Rain/snow threshold temperature (°C).
    pub rain_snow_threshold: f64,
}

impl Default for ZoneForecastParams {
    fn default() -> Self {
        Self {
            temperature_gradient: 0.0,
            precipitation_gradient: 0.0,
            rain_snow_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ZoneForecastParams {
    /// Loads one parameter set per zone from a zone table
    /// (`id;temp_gradient;precip_gradient[;threshold]`) or the global
    /// section. Zones the table leaves out get the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Configuration`] for rows with fewer than
    /// two values, and any error of the underlying source.
    pub fn load(source: &ParameterSource, zones: &ZoneSet) -> Result<Vec<Self>, ForecastError> {
        let rows = source.load(zones)?;
        zones
            .iter()
            .zip(rows)
            .map(|(zone, row)| match row.as_deref() {
                None => Ok(Self::default()),
                Some([temperature, precipitation]) => Ok(Self {
                    temperature_gradient: *temperature,
                    precipitation_gradient: *precipitation,
                    ..Self::default()
                }),
                Some([temperature, precipitation, threshold, ..]) => Ok(Self {
                    temperature_gradient: *temperature,
                    precipitation_gradient: *precipitation,
                    rain_snow_threshold: *threshold,
                }),
                Some(values) => Err(ForecastError::Configuration {
                    reason: format!(
                        "zone {} has {} forecast parameters, expected at least 2",
                        zone.id(),
                        values.len()
                    ),
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use hydromet_zones::Zone;

    use super::*;

    fn zones() -> ZoneSet {
        ZoneSet::new(vec![Zone::new(1, 0.0), Zone::new(2, 0.0).with_group(2), Zone::new(3, 0.0)]).unwrap()
    }

    #[test]
    fn zone_table_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        fs::write(&path, "UHRH;TG;PG;SEUIL\n1;-0.6;5;0.5\n3;-0.4;2\n").unwrap();
        let params = ZoneForecastParams::load(&ParameterSource::ZoneTable(path), &zones()).unwrap();
        assert_eq!(params[0].rain_snow_threshold, 0.5);
        assert_eq!(params[1], ZoneForecastParams::default());
        assert_eq!(params[2].temperature_gradient, -0.4);
        assert_eq!(params[2].rain_snow_threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn global_section_by_group() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("global.csv");
        fs::write(&path, "SUBMODEL NAME;GRILLE PREVISION\nGROUP;TG;PG;SEUIL\n1;-0.5;1;0\n2;-0.7;3;2\n").unwrap();
        let source = ParameterSource::Global {
            path,
            section: GLOBAL_SECTION.to_string(),
        };
        let params = ZoneForecastParams::load(&source, &zones()).unwrap();
        assert_eq!(params[1].precipitation_gradient, 3.0);
        assert_eq!(params[2].rain_snow_threshold, 0.0);
    }

    #[test]
    fn single_value_row_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        fs::write(&path, "UHRH;TG\n2;-0.6\n").unwrap();
        let err = ZoneForecastParams::load(&ParameterSource::ZoneTable(path), &zones()).unwrap_err();
        assert!(matches!(err, ForecastError::Configuration { .. }));
    }
}
