//! Error types for the `config-lineage` binary.
use std::io;

use config_lineage::{KeyPathError, LineageError};
use thiserror::Error;

/// Errors raised while building or printing the report.
#[derive(Debug, Error)]
pub enum DemoError {
    /// A required source failed or the resolver settings were invalid.
    #[error("failed to resolve configuration: {0}")]
    Lineage(#[from] LineageError),
    /// A `--key` argument is not a valid key path.
    #[error("invalid --key argument: {0}")]
    InvalidKey(#[from] KeyPathError),
    /// Writing the report or reading the working directory failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias for the binary.
pub type Result<T> = std::result::Result<T, DemoError>;
