//! Error types produced while assembling and loading the provider chain.

mod constructors;
mod types;

pub use types::{LineageError, SourceError};

/// Result alias used across the crate.
pub type LineageResult<T> = Result<T, LineageError>;

#[cfg(test)]
mod tests;
