//! News search client with a local archive of saved articles
//!
//! This library queries a news API for headlines and keyword searches, and
//! keeps the articles a user chooses to save in a single JSON file with
//! create, read, update and delete operations.

mod archive;
mod article;
mod cli;
mod client;
mod config;
mod errors;
mod helper;
mod types;

// Re-export key components
pub use archive::*;
pub use article::*;
pub use cli::*;
pub use client::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use types::*;
