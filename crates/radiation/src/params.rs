//! Per-zone net radiation parameters.

use hydromet_zones::{ParameterSource, ZoneSet};

use crate::budget::RadiationCoefficients;
use crate::error::RadiationError;

/// Section of the global parameter file holding net radiation parameters.
pub const GLOBAL_SECTION: &str = "RAYONNEMENT NET";

/// Values per row: albedo then the eight coefficients.
const N_VALUES: usize = 9;

/// Snow-free albedo and budget coefficients of one zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetRadiationParams {
    /// Albedo of the snow-free surface.
    pub albedo: f64,
    /// Budget coefficients.
    pub coefficients: RadiationCoefficients,
}

impl NetRadiationParams {
    /// Builds parameters from
    /// `albedo;transA;transB;transC;emisAtmA;emisAtmB;emisAtmC;emisSurfA;emisSurfB`.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let &[albedo, ta, tb, tc, aa, ab, ac, sa, sb, ..] = values else {
            return None;
        };
        Some(Self {
            albedo,
            coefficients: RadiationCoefficients {
                transmissivity: [ta, tb, tc],
                atmospheric_emissivity: [aa, ab, ac],
                surface_emissivity: [sa, sb],
            },
        })
    }

    /// Loads one parameter set per zone from a zone table or the global
    /// section.
    ///
    /// # Errors
    ///
    /// Returns [`RadiationError::Configuration`] for a zone without
    /// parameters or with fewer than nine values, and any error of the
    /// underlying source.
    pub fn load(source: &ParameterSource, zones: &ZoneSet) -> Result<Vec<Self>, RadiationError> {
        let rows = source.load(zones)?;
        zones
            .iter()
            .zip(rows)
            .map(|(zone, row)| {
                let values = row.ok_or_else(|| RadiationError::Configuration {
                    reason: format!("zone {} has no net radiation parameters", zone.id()),
                })?;
                Self::from_values(&values).ok_or_else(|| RadiationError::Configuration {
                    reason: format!(
                        "zone {} has {} net radiation parameters, expected {N_VALUES}",
                        zone.id(),
                        values.len()
                    ),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use hydromet_zones::Zone;

    use super::*;

    const ROW: &str = "0.2;0.75;0.01;2;0.6;0.005;0.2;0.97;0";

    fn zones() -> ZoneSet {
        ZoneSet::new(vec![Zone::new(4, 300.0), Zone::new(9, 500.0)]).unwrap()
    }

    #[test]
    fn zone_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rn.csv");
        fs::write(&path, format!("UHRH;ALBEDO;...\n9;{ROW}\n4;{ROW}\n")).unwrap();
        let params = NetRadiationParams::load(&ParameterSource::ZoneTable(path), &zones()).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[1].albedo, 0.2);
        assert_eq!(params[0].coefficients.surface_emissivity, [0.97, 0.0]);
    }

    #[test]
    fn zone_without_row_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rn.csv");
        fs::write(&path, format!("UHRH;ALBEDO;...\n9;{ROW}\n")).unwrap();
        let err = NetRadiationParams::load(&ParameterSource::ZoneTable(path), &zones()).unwrap_err();
        assert!(err.to_string().contains("zone 4"));
    }

    #[test]
    fn short_global_row_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("global.csv");
        fs::write(&path, "SUBMODEL NAME;RAYONNEMENT NET\nGROUP;ALBEDO\n1;0.2;0.7\n").unwrap();
        let source = ParameterSource::Global {
            path,
            section: GLOBAL_SECTION.to_string(),
        };
        let err = NetRadiationParams::load(&source, &zones()).unwrap_err();
        assert!(matches!(err, RadiationError::Configuration { .. }));
    }
}
