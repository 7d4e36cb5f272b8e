//! Layered configuration resolution with per-key provenance.
//!
//! A [`Resolver`] assembles an ordered [`ProviderChain`] from settings files,
//! an optional remote parameter store, user secrets, the process environment
//! and command-line arguments. Later providers take precedence. For any
//! [`KeyPath`] the resolver reports both the effective value and the kind of
//! provider that supplied it.
//!
//! ```no_run
//! use config_lineage::{Resolver, ResolverSettings};
//!
//! let args: Vec<String> = std::env::args().skip(1).collect();
//! let resolver = Resolver::builder(ResolverSettings::load()?).build_from_process(&args)?;
//! let result = resolver.resolve_str("Db:ConnectionString")?;
//! if let (Some(value), Some(winner)) = (result.value(), result.winner()) {
//!     println!("{value} from {winner}");
//! }
//! # Ok::<_, config_lineage::LineageError>(())
//! ```

mod chain;
mod error;
mod fs;
mod key_path;
mod provider;
mod resolver;
mod snapshot;

pub use chain::{
    Candidate, ChainEntry, LoadStatus, ProviderChain, ProviderChainBuilder, Resolution,
    ResolutionResult,
};
pub use error::{LineageError, LineageResult, SourceError};
pub use key_path::{ENV_DELIMITER, KEY_DELIMITER, KeyPath, KeyPathError};
pub use provider::{
    CommandLineProvider, DirectoryParameterStore, EnvironmentProvider, FetchError, FileFormat,
    FileProvider, InMemoryParameterStore, KeyValueStore, Parameter, ParameterPath,
    ParameterStoreClient, ParameterStoreProvider, Provider, ProviderKind, RetryPolicy,
};
pub use resolver::{
    FeatureFlags, ProviderDescriptor, RemoteStoreSettings, Resolver, ResolverBuilder,
    ResolverSettings,
};
pub use snapshot::{DotenvOutcome, EnvironmentSnapshot};
