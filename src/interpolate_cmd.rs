//! Interpolate command: read the station network and fill missing samples.

use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span, warn};

use hydromet_station::StationSet;

use crate::cli::InterpolateArgs;
use crate::config::HydrometConfig;
use crate::convert;

/// Run the station interpolation pipeline.
pub fn run(args: InterpolateArgs) -> Result<()> {
    let _cmd = info_span!("interpolate").entered();
    let config = HydrometConfig::load(&args.config.path)?;
    let mut stations_cfg = config
        .stations
        .ok_or_else(|| anyhow!("no [stations] section in {}", args.config.path.display()))?;
    if let Some(path) = args.stations {
        stations_cfg.path = path;
    }

    let start = convert::parse_date(&config.simulation.start)?;
    let end = convert::parse_date(&config.simulation.end)?;
    let timestep = config.simulation.timestep;
    let version = convert::parse_interpolation(&stations_cfg)?;
    let format = convert::parse_station_format(&stations_cfg)?;
    let transform = convert::build_transform(stations_cfg.projection.as_ref());

    let mut set = StationSet::new(version);
    set.read_as(&stations_cfg.path, format, transform.as_ref())
        .with_context(|| format!("failed to read stations: {}", stations_cfg.path.display()))?;
    if set.is_empty() {
        warn!(path = %stations_cfg.path.display(), "station source holds no station");
    }

    // The configured end is the last simulated timestep.
    let end = end.plus_hours(i64::from(timestep));
    let report = set
        .load_series(start, end, timestep)
        .context("failed to load station series")?;

    for station in set.stations() {
        let missing = station.series().missing_count(start, end, timestep);
        if missing > 0 {
            warn!(station = %station.info().name, missing, "station keeps missing samples");
        }
    }
    info!(
        n_stations = set.len(),
        filled = report.filled,
        still_missing = report.still_missing,
        "interpolation complete"
    );
    Ok(())
}
