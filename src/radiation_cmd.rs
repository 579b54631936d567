//! Radiation command: daily net radiation from the forecast forcing.

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use hydromet_radiation::{GLOBAL_SECTION, NetRadiation, NetRadiationParams};

use crate::cli::RadiationArgs;
use crate::config::HydrometConfig;
use crate::{convert, forecast_cmd};

/// Run the net radiation pipeline.
pub fn run(args: RadiationArgs) -> Result<()> {
    let _cmd = info_span!("radiation").entered();
    let config = HydrometConfig::load(&args.config.path)?;
    let forecast = forecast_cmd::prepare(&config, true)?;

    let source = convert::parameter_source(
        config.radiation.parameters.as_deref(),
        config.global_parameters.as_deref(),
        GLOBAL_SECTION,
    )?;
    let params = NetRadiationParams::load(&source, &forecast.zones).context("failed to load net radiation parameters")?;
    let mut engine = NetRadiation::new(&forecast.zones, params, config.simulation.timestep)?
        .with_snow_albedo(config.radiation.snow_albedo);

    for &date in &forecast.steps {
        let forcing = forecast.forcing(date)?;
        let mut total = 0.0;
        let mut n_zones = 0usize;
        for (index, sample) in forcing.iter().enumerate() {
            let (Some(tmin), Some(tmax)) = (sample.tmin, sample.tmax) else {
                continue;
            };
            // Fresh snowfall stands in for snow cover.
            let snow_covered = sample.snow.is_some_and(|s| s > 0.0);
            let budget = engine
                .compute(date, index, tmin, tmax, snow_covered)
                .with_context(|| format!("net radiation failed at {date}"))?;
            total += budget.net();
            n_zones += 1;
        }
        if n_zones < forcing.len() {
            warn!(%date, n_skipped = forcing.len() - n_zones, "zones without temperatures skipped");
        }
        if n_zones > 0 {
            info!(%date, mean_net = total / n_zones as f64, "net radiation");
        }
    }
    Ok(())
}
