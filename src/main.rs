use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use log::{error, info};
use tokio::sync::Mutex;

use newsarchive::{App, Archive, Cli, Config, Result};

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let archive = Archive::open_or_empty(config.archive_path.clone())?;
    let app = App::new(Arc::new(Mutex::new(archive)), config, cli.verbose);

    app.run(cli.command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");
    match run(cli).await {
        Ok(()) => {
            info!("Application shutting down");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
