use air_quality_dashboard::cli::{init_logging, run, Cli};
use anyhow::Context;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref()).context("Failed to initialise logging")?;
    run(cli).context("Dashboard command failed")
}
