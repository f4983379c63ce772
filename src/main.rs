use clap::Parser;
use figvault::config::Cli;
use figvault::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    figvault::logging::init_logger(cli.verbose);

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;

    figvault::commands::import::run(config)?;

    Ok(())
}
