//! Configuration sources and the contract the chain queries them through.
//!
//! Each concrete provider loads its state once, at construction, into a
//! [`KeyValueStore`]. Queries after that are pure lookups.

mod command_line;
mod environment;
mod file;
mod parameter_store;
mod store;

use std::fmt;

use crate::KeyPath;

pub use command_line::CommandLineProvider;
pub use environment::EnvironmentProvider;
pub use file::{FileFormat, FileProvider};
pub use parameter_store::{
    DirectoryParameterStore, FetchError, InMemoryParameterStore, Parameter, ParameterPath,
    ParameterStoreClient, ParameterStoreProvider, RetryPolicy,
};
pub use store::KeyValueStore;

/// Semantic label identifying which kind of source supplied a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ProviderKind {
    /// A JSON settings file.
    JsonFile,
    /// A TOML settings file.
    TomlFile,
    /// The per-user secrets store.
    UserSecrets,
    /// A remote parameter store.
    RemoteParameterStore,
    /// Process environment variables.
    Environment,
    /// Command-line arguments.
    CommandLine,
}

impl ProviderKind {
    /// Stable label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::JsonFile => "JsonFile",
            Self::TomlFile => "TomlFile",
            Self::UserSecrets => "UserSecrets",
            Self::RemoteParameterStore => "RemoteParameterStore",
            Self::Environment => "Environment",
            Self::CommandLine => "CommandLine",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One configuration source in a [`crate::ProviderChain`].
pub trait Provider: fmt::Debug {
    /// Kind reported as the winner when this provider supplies a key.
    fn kind(&self) -> ProviderKind;

    /// Value for `key`, or `None` when this provider does not supply it.
    fn try_get(&self, key: &KeyPath) -> Option<&str>;

    /// Every key this provider supplies, in key order.
    fn keys(&self) -> Box<dyn Iterator<Item = &KeyPath> + '_>;
}
