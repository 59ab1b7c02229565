//! Shared types for the newsarchive application.
//!
//! This module contains the crate-wide `Result` alias, load outcomes and the
//! subcommands of the command-line front end.
use chrono::NaiveDate;
use clap::Subcommand;

use crate::{Category, NewsError, SortBy};

/// A specialized Result type for newsarchive operations.
pub type Result<T> = std::result::Result<T, NewsError>;

/// What `Archive::load` found on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No backing file yet; the archive starts empty
    Missing,
    /// The file was read and held this many articles
    Loaded(usize),
}

/// Available subcommands for the newsarchive application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show top headlines for a country
    Headlines {
        /// Two-letter country code (defaults to the configured country)
        #[clap(short = 'C', long)]
        country: Option<String>,

        /// Restrict headlines to a category
        #[clap(short = 'k', long, value_enum)]
        category: Option<Category>,

        #[clap(flatten)]
        output: ResultOptions,
    },

    /// Search all articles by keyword
    Search {
        /// Search query text
        query: String,

        /// Oldest publication date (YYYY-MM-DD)
        #[clap(long)]
        from: Option<NaiveDate>,

        /// Newest publication date (YYYY-MM-DD)
        #[clap(long)]
        to: Option<NaiveDate>,

        /// Result ordering
        #[clap(short = 'S', long, value_enum, default_value_t = SortBy::PublishedAt)]
        sort_by: SortBy,

        #[clap(flatten)]
        output: ResultOptions,
    },

    /// News from the last day, or today's headlines without a query
    Daily {
        /// Search query text
        query: Option<String>,

        /// Country used when no query is given
        #[clap(short = 'C', long)]
        country: Option<String>,

        #[clap(flatten)]
        output: ResultOptions,
    },

    /// News from the last seven days
    Weekly {
        /// Search query text
        query: String,

        #[clap(flatten)]
        output: ResultOptions,
    },

    /// News from the last thirty days
    Monthly {
        /// Search query text
        query: String,

        #[clap(flatten)]
        output: ResultOptions,
    },

    /// List saved articles
    List {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// View a saved article by ID
    View {
        /// ID of the saved article
        id: u64,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Update fields of a saved article
    Update {
        /// ID of the saved article
        id: u64,

        /// Free-form notes to attach
        #[clap(short, long)]
        notes: Option<String>,

        /// Arbitrary field assignments (key=value, value may be JSON)
        #[clap(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Delete a saved article by ID
    Delete {
        /// ID of the saved article
        id: u64,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Walk through a sample session: headlines, search and save, list, annotate
    Demo,
}

/// Options shared by every subcommand that prints API results
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct ResultOptions {
    /// Number of articles to print
    #[clap(short = 'n', long, default_value_t = 5)]
    pub limit: usize,

    /// Save the result with this 1-based number to the archive
    #[clap(short, long)]
    pub save: Option<usize>,
}
