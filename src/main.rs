mod cli;

use anyhow::Result;
use clap::Parser;
use moncal::config::Config;
use moncal::logging;
use moncal::store::SqliteStore;

fn main() -> Result<()> {
    let cli_opts = cli::Cli::parse();
    let config = match &cli_opts.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Err(err) = logging::init_logging(config.log_level(), &config.log_dir()) {
        eprintln!("Logging disabled: {err}");
    }

    let store = SqliteStore::open(&config.db_path())?;
    cli::run(cli_opts.command.unwrap_or_default(), &store, &config)
}
