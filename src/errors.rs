//! Error types for the newsarchive application.
//!
//! This module defines custom error types that categorize the failures that
//! can occur while talking to the news API or managing the saved-article
//! archive.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the newsarchive application.
#[derive(Error, Debug)]
pub enum NewsError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level failure or an undecodable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The news API answered with something other than 200 OK.
    #[error("News API returned status {status}")]
    RemoteStatus { status: u16 },

    /// The archive file exists but could not be parsed.
    #[error("Archive file {path} is corrupt: {source}")]
    CorruptArchive {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Saved article was not found when performing an operation.
    #[error("Saved article not found: {id}")]
    ArticleNotFound { id: u64 },

    /// Invalid user input (patch syntax, result index, ...).
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}
