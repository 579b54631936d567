//! Forecast command: distribute gridded forecasts onto zones.

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, info_span};

use hydromet_calendar::{DateHour, timesteps};
use hydromet_correction::CorrectionSet;
use hydromet_forecast::{ForecastGrid, ForecastGridConfig, GLOBAL_SECTION, ZoneForecastParams};
use hydromet_station::WeatherSample;
use hydromet_zones::ZoneSet;

use crate::cli::ForecastArgs;
use crate::config::HydrometConfig;
use crate::convert;
use crate::forcing::ZoneCorrections;

/// An initialised forecast grid with everything needed to step through the
/// simulation period.
pub struct ForecastRun {
    pub zones: ZoneSet,
    pub steps: Vec<DateHour>,
    grid: ForecastGrid,
    corrections: Option<ZoneCorrections>,
}

impl ForecastRun {
    /// Corrected zone forcing at `date`, one sample per zone index.
    pub fn forcing(&self, date: DateHour) -> Result<Vec<WeatherSample>> {
        let mut samples = self
            .grid
            .compute(date, &self.zones)
            .with_context(|| format!("forecast repartition failed at {date}"))?;
        if let Some(corrections) = &self.corrections {
            let n_adjusted = corrections.apply(date, &mut samples);
            debug!(%date, n_adjusted, "corrections applied");
        }
        Ok(samples)
    }
}

/// Loads zones, parameters and corrections, then initialises the grid.
pub fn prepare(config: &HydrometConfig, with_corrections: bool) -> Result<ForecastRun> {
    let forecast = config
        .forecast
        .as_ref()
        .ok_or_else(|| anyhow!("no [forecast] section in config"))?;
    let zones_path = config
        .simulation
        .zones
        .as_ref()
        .ok_or_else(|| anyhow!("no zone table: set [simulation].zones in config"))?;

    let start = convert::parse_date(&config.simulation.start)?;
    let end = convert::parse_date(&config.simulation.end)?;
    let timestep = config.simulation.timestep;
    let steps = timesteps(start, end.plus_hours(i64::from(timestep)), timestep);

    let zones = ZoneSet::load_csv(zones_path)
        .with_context(|| format!("failed to read zones: {}", zones_path.display()))?;
    let source = convert::parameter_source(
        forecast.parameters.as_deref(),
        config.global_parameters.as_deref(),
        GLOBAL_SECTION,
    )?;
    let params = ZoneForecastParams::load(&source, &zones).context("failed to load forecast parameters")?;
    let grid_config = ForecastGridConfig::load(&forecast.grp)
        .with_context(|| format!("failed to read forecast description: {}", forecast.grp.display()))?;

    let mut grid = ForecastGrid::new(grid_config, &forecast.zone_raster, &forecast.dem)
        .with_timestep(timestep)
        .with_params(params);
    grid.initialise(&zones, start)
        .context("failed to initialise the forecast grid")?;

    let corrections = match (&config.corrections, with_corrections) {
        (Some(corrections), true) => {
            let catalog = convert::build_group_catalog(&corrections.groups)?;
            let set = CorrectionSet::load_file(&corrections.path, &catalog)
                .with_context(|| format!("failed to read corrections: {}", corrections.path.display()))?;
            info!(n_corrections = set.len(), "corrections loaded");
            Some(ZoneCorrections::new(set, convert::build_zone_groups(&corrections.groups, &zones)?))
        }
        _ => None,
    };

    Ok(ForecastRun {
        zones,
        steps,
        grid,
        corrections,
    })
}

/// Run the forecast repartition over the simulation period.
pub fn run(args: ForecastArgs) -> Result<()> {
    let _cmd = info_span!("forecast").entered();
    let config = HydrometConfig::load(&args.config.path)?;
    let run = prepare(&config, !args.no_corrections)?;

    for &date in &run.steps {
        let forcing = run.forcing(date)?;
        info!(
            %date,
            tmin = ?zone_mean(forcing.iter().map(|s| s.tmin)),
            tmax = ?zone_mean(forcing.iter().map(|s| s.tmax)),
            rain = ?zone_mean(forcing.iter().map(|s| s.rain)),
            snow = ?zone_mean(forcing.iter().map(|s| s.snow)),
            "zone forcing"
        );
    }
    info!(n_steps = run.steps.len(), n_zones = run.zones.len(), "forecast complete");
    Ok(())
}

/// Mean over the zones holding a value.
fn zone_mean(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values.flatten().fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use approx::assert_abs_diff_eq;
    use hydromet_forecast::{AsciiGridReader, GridGeometry, Raster};

    use super::*;

    fn write_grid(path: &Path, ncols: usize, cell: f64, data: Vec<f64>) {
        let nrows = data.len() / ncols;
        let geometry = GridGeometry::new(ncols, nrows, 0.0, nrows as f64 * cell, cell);
        AsciiGridReader
            .write(&Raster::new(geometry, Some(-9999.0), data).unwrap(), path)
            .unwrap();
    }

    /// Two zones, each under one forecast pixel; zone 1 sits 100 m above
    /// its pixel and belongs to the `upper` group.
    fn config(root: &Path) -> HydrometConfig {
        fs::write(
            root.join("zones.csv"),
            "ID;ALT;SLOPE;ASPECT;LAT;LON;GROUP\n1;600;0;7;46.8;-71.2;1\n2;300;0;7;46.8;-71.2;1\n",
        )
        .unwrap();
        fs::write(root.join("gradients.csv"), "ID;T;P;S\n1;-0.6;0.1;1.0\n").unwrap();
        fs::write(
            root.join("corrections.csv"),
            "rain correction\n1;2021-04-01 00;2021-04-01 23;2;0.0;1.15;1;upper\n",
        )
        .unwrap();
        fs::write(
            root.join("fc.grp"),
            "1\nmm\n0\ntest\n22 24 .\nfc_\n4\n.tn.asc\n.tx.asc\n.pr.asc\n.sn.asc\n",
        )
        .unwrap();
        let zone_ids = vec![1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 2.0, 2.0];
        write_grid(&root.join("zones.asc"), 4, 1.0, zone_ids);
        let dem = vec![450.0, 550.0, 300.0, 300.0, 500.0, 500.0, 300.0, 300.0];
        write_grid(&root.join("dem.asc"), 4, 1.0, dem);
        for (ext, values) in [
            (".tn.asc", [-2.0, 4.0]),
            (".tx.asc", [6.0, 10.0]),
            (".pr.asc", [10.0, 20.0]),
            (".sn.asc", [0.0, 0.0]),
        ] {
            write_grid(&root.join(format!("fc_2021040100{ext}")), 2, 2.0, values.to_vec());
        }

        let text = format!(
            r#"
            [simulation]
            start = "2021-04-01 00"
            end = "2021-04-01 00"
            zones = "{root}/zones.csv"

            [corrections]
            path = "{root}/corrections.csv"
            groups = [{{ name = "upper", zones = [1] }}]

            [forecast]
            grp = "{root}/fc.grp"
            zone_raster = "{root}/zones.asc"
            dem = "{root}/dem.asc"
            parameters = "{root}/gradients.csv"
            "#,
            root = root.display()
        );
        toml::from_str(&text).unwrap()
    }

    #[test]
    fn forcing_is_elevation_corrected_then_adjusted() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        let run = prepare(&config, true).unwrap();
        assert_eq!(run.steps.len(), 1);
        let forcing = run.forcing(run.steps[0]).unwrap();
        assert_abs_diff_eq!(forcing[0].tmin.unwrap(), -2.6, epsilon = 1e-9);
        assert_abs_diff_eq!(forcing[0].rain.unwrap(), 11.0 * 1.15, epsilon = 1e-9);
        assert_abs_diff_eq!(forcing[1].rain.unwrap(), 20.0, epsilon = 1e-9);

        let raw = prepare(&config, false).unwrap();
        let forcing = raw.forcing(raw.steps[0]).unwrap();
        assert_abs_diff_eq!(forcing[0].rain.unwrap(), 11.0, epsilon = 1e-9);
        assert!(dir.path().join("fc.pgp").exists());
    }

    #[test]
    fn missing_zone_table_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.simulation.zones = None;
        let err = prepare(&config, true).err().unwrap();
        assert!(err.to_string().contains("no zone table"));
    }

    #[test]
    fn zone_mean_ignores_missing() {
        assert_eq!(zone_mean([Some(1.0), None, Some(3.0)].into_iter()), Some(2.0));
        assert_eq!(zone_mean([None, None].into_iter()), None);
    }
}
