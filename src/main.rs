mod cli;
mod config;
mod convert;
mod forcing;
mod forecast_cmd;
mod interpolate_cmd;
mod logging;
mod radiation_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Interpolate(args) => interpolate_cmd::run(args),
        Command::Forecast(args) => forecast_cmd::run(args),
        Command::Radiation(args) => radiation_cmd::run(args),
    }
}
