//! spkstate: print the state vector of a target relative to an observer.
//!
//! Loads the kernels, converts the epoch to ephemeris time, queries the
//! state, prints it and unloads the kernels.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use cli::{write_report, Cli};
use spkstate::{
    kernels::{KernelPool, KernelSet},
    report::{Query, StateReport},
    state::spkezr,
    time::str2et,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries the report only
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let paths = cli.kernel_paths();

    let mut pool = KernelPool::new();
    let kernels = KernelSet::furnish(&mut pool, &paths)
        .with_context(|| format!("failed to load kernels from {}", cli.kernel_dir))?;
    info!(count = kernels.loaded_count(), "kernels loaded");

    let et = str2et(&kernels, &cli.epoch)
        .with_context(|| format!("failed to convert epoch '{}'", cli.epoch))?;
    info!(epoch = %cli.epoch, et = et.seconds(), tdb = %et, "epoch converted");

    let (state, light_time) = spkezr(
        &kernels,
        &cli.target,
        et,
        &cli.frame,
        &cli.abcorr,
        &cli.observer,
    )
    .with_context(|| {
        format!(
            "failed to compute the state of {} relative to {}",
            cli.target, cli.observer
        )
    })?;

    let query = Query {
        target: &cli.target,
        observer: &cli.observer,
        frame: &cli.frame,
        abcorr: &cli.abcorr,
        epoch: &cli.epoch,
    };
    write_report(&StateReport::new(&query, et, &state, light_time), cli.format)?;

    kernels.release().context("failed to unload kernels")?;
    Ok(())
}
