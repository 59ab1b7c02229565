use std::path::PathBuf;

use clap::Parser;

use crate::{Commands, Config};

/// Main CLI application arguments and command structure
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Search a news API and keep a local archive of saved articles"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Path to the saved-articles JSON file
    #[clap(short = 'a', long, value_parser)]
    pub archive: Option<PathBuf>,

    /// News API key
    #[clap(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the newsarchive application
    #[clap(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Command-line values take precedence over the config file.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(archive) = &self.archive {
            config.archive_path = archive.clone();
        }
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
    }
}
