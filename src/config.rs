use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level hydromet configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HydrometConfig {
    /// Simulation period and zones.
    pub simulation: SimulationToml,

    /// Consolidated parameter file, used by sub-models without their own
    /// parameter table.
    #[serde(default)]
    pub global_parameters: Option<PathBuf>,

    /// Station network.
    #[serde(default)]
    pub stations: Option<StationsToml>,

    /// Time-windowed forcing corrections.
    #[serde(default)]
    pub corrections: Option<CorrectionsToml>,

    /// Gridded forecast source.
    #[serde(default)]
    pub forecast: Option<ForecastToml>,

    /// Net radiation settings.
    #[serde(default)]
    pub radiation: RadiationToml,
}

impl HydrometConfig {
    /// Reads and parses a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationToml {
    /// First timestep, `YYYY-MM-DD HH`.
    pub start: String,
    /// Last timestep, `YYYY-MM-DD HH`.
    pub end: String,
    #[serde(default = "default_timestep")]
    pub timestep: u16,
    /// Zone table.
    pub zones: Option<PathBuf>,
}

fn default_timestep() -> u16 {
    24
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StationsToml {
    pub path: PathBuf,
    /// Backend name; inferred from the extension when absent.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default = "default_interpolation")]
    pub interpolation: String,
    #[serde(default = "default_temperature_gradient")]
    pub temperature_gradient: f64,
    #[serde(default)]
    pub precipitation_gradient: f64,
    #[serde(default)]
    pub projection: Option<ProjectionToml>,
}

fn default_interpolation() -> String {
    "v2".to_string()
}
fn default_temperature_gradient() -> f64 {
    -0.5
}

/// Origin of the equirectangular projection of geographic stations.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectionToml {
    pub lon0: f64,
    pub lat0: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorrectionsToml {
    pub path: PathBuf,
    #[serde(default)]
    pub groups: Vec<GroupToml>,
}

/// A named group of zones that corrections may target.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupToml {
    pub name: String,
    /// `hydro` or `correction`.
    #[serde(default = "default_group_kind")]
    pub kind: String,
    pub zones: Vec<i32>,
}

fn default_group_kind() -> String {
    "hydro".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastToml {
    /// `.grp` description of the forecast rasters.
    pub grp: PathBuf,
    /// Zone-id raster.
    pub zone_raster: PathBuf,
    pub dem: PathBuf,
    /// Per-zone table; the global file section is used when absent.
    #[serde(default)]
    pub parameters: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RadiationToml {
    /// Per-zone table; the global file section is used when absent.
    #[serde(default)]
    pub parameters: Option<PathBuf>,
    #[serde(default = "default_snow_albedo")]
    pub snow_albedo: f64,
}

impl Default for RadiationToml {
    fn default() -> Self {
        Self {
            parameters: None,
            snow_albedo: default_snow_albedo(),
        }
    }
}

fn default_snow_albedo() -> f64 {
    hydromet_radiation::DEFAULT_SNOW_ALBEDO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: HydrometConfig = toml::from_str(
            r#"
            [simulation]
            start = "2021-04-01 00"
            end = "2021-04-30 00"

            [stations]
            path = "stations.stm"
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.timestep, 24);
        let stations = config.stations.unwrap();
        assert_eq!(stations.interpolation, "v2");
        assert_eq!(stations.temperature_gradient, -0.5);
        assert_eq!(config.radiation.snow_albedo, 0.8);
        assert!(config.forecast.is_none());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hydromet.toml");
        let err = HydrometConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));

        std::fs::write(&path, "[simulation]\nstart = \"2021-04-01 00\"\nend = \"2021-04-02 00\"\ntimestep = 6\n").unwrap();
        let config = HydrometConfig::load(&path).unwrap();
        assert_eq!(config.simulation.timestep, 6);
        assert!(config.stations.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = toml::from_str::<HydrometConfig>(
            r#"
            [simulation]
            start = "2021-04-01 00"
            end = "2021-04-30 00"
            seed = 3
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn correction_groups() {
        let config: HydrometConfig = toml::from_str(
            r#"
            [simulation]
            start = "2021-04-01 00"
            end = "2021-04-30 00"

            [corrections]
            path = "corrections.csv"
            groups = [
                { name = "NORTH", zones = [1, 2] },
                { name = "snowbelt", kind = "correction", zones = [2] },
            ]
            "#,
        )
        .unwrap();
        let corrections = config.corrections.unwrap();
        assert_eq!(corrections.groups[0].kind, "hydro");
        assert_eq!(corrections.groups[1].zones, vec![2]);
    }
}
