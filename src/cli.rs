use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Weather forcing for distributed hydrological simulation: station
/// interpolation, gridded forecast repartition and net radiation.
#[derive(Parser)]
#[command(name = "hydromet", version)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read the station network and fill missing samples.
    Interpolate(InterpolateArgs),
    /// Distribute gridded forecasts onto zones.
    Forecast(ForecastArgs),
    /// Compute daily net radiation from the forecast forcing.
    Radiation(RadiationArgs),
}

/// Location of the TOML configuration, shared by every subcommand.
#[derive(clap::Args)]
pub struct ConfigArg {
    /// Path to the TOML configuration file.
    #[arg(short = 'c', long = "config", default_value = "hydromet.toml")]
    pub path: PathBuf,
}

#[derive(clap::Args)]
pub struct InterpolateArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Station source replacing `[stations].path`.
    #[arg(short, long)]
    pub stations: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Skip the correction layer even if configured.
    #[arg(long)]
    pub no_corrections: bool,
}

#[derive(clap::Args)]
pub struct RadiationArgs {
    #[command(flatten)]
    pub config: ConfigArg,
}
