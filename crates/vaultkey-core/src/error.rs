//! Error types for VaultKey operations.
//!
//! Access-control outcomes (denied logins, unauthorized provisioning, ...)
//! are ordinary return values in `vaultkey-acl`, not errors. This `Error`
//! covers the infrastructure around them: configuration, seed data, script
//! files and terminal I/O.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur in VaultKey operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific file.
    #[error("I/O error at {}: {source}", path.display())]
    IoWithPath {
        /// File that was being read or written.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid data, such as a malformed seed user.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A shell command could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Wrap an I/O error with the path it occurred on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type alias using VaultKey's Error type.
pub type Result<T> = std::result::Result<T, Error>;
