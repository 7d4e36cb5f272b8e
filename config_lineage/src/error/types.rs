//! Primary error enums for chain construction.

use camino::Utf8PathBuf;
use figment::Error as FigmentError;
use thiserror::Error;

use crate::key_path::KeyPathError;
use crate::provider::{FetchError, ProviderKind};

/// Errors that abort resolver construction.
///
/// Optional sources never produce one of these; their failures are recorded
/// on the chain entry instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LineageError {
    /// A required source could not be loaded or fetched.
    #[error("failed to load required {kind} source '{origin}': {source}")]
    SourceLoad {
        /// Kind of the provider that failed.
        kind: ProviderKind,
        /// Human-readable origin such as a file path or parameter prefix.
        origin: String,
        /// Underlying reason for the failure.
        #[source]
        source: SourceError,
    },

    /// A key could not be normalised into a key path.
    #[error("invalid configuration key: {0}")]
    InvalidKey(#[from] KeyPathError),

    /// An environment variable needed to compose a source was unset or blank.
    #[error("environment variable '{variable}' must be set to compose the {purpose}")]
    MissingSetting {
        /// Name of the unset variable.
        variable: String,
        /// What the variable contributes to.
        purpose: &'static str,
    },

    /// An environment variable held a value that could not be interpreted.
    #[error("environment variable '{variable}' has unsupported value '{value}': expected {expected}")]
    InvalidSetting {
        /// Name of the offending variable.
        variable: String,
        /// Value found in the environment.
        value: String,
        /// Description of accepted values.
        expected: &'static str,
    },

    /// The dotenv file exists but could not be read or parsed.
    #[error("failed to read dotenv file '{path}': {source}")]
    Dotenv {
        /// Location of the dotenv file.
        path: Utf8PathBuf,
        /// Parser or I/O failure reported by `dotenvy`.
        #[source]
        source: dotenvy::Error,
    },

    /// The resolver's own settings could not be extracted.
    #[error("failed to load resolver settings: {0}")]
    Settings(#[from] Box<FigmentError>),
}

/// Why a single source failed to load.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// Reading the backing file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The file contents were not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The file contents were not valid TOML.
    #[error("invalid TOML: {0}")]
    Toml(#[from] Box<toml_edit::TomlError>),

    /// The contents parsed but could not be flattened into key paths.
    #[error("{0}")]
    Malformed(String),

    /// The parameter store could not be reached or rejected the request.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The source was requested but nothing was configured to back it.
    #[error("{0}")]
    NotConfigured(String),
}
