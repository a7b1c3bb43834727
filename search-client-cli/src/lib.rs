//! # Search Client CLI
//!
//! Command-line front end for the search collection client.
//!
//! This crate wires the client configuration from the environment and runs
//! the import, export, search, delete and upsert commands.

pub mod commands;
pub mod config;

pub use config::Settings;

use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid command input, such as a malformed document.
    #[error("Input error: {0}")]
    InputError(String),

    /// Search client error.
    #[error("Search client error: {0}")]
    ClientError(#[from] search_client::SearchClientError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CliError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create an input error.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::InputError(msg.into())
    }
}
