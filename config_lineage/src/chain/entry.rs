//! Chain entries: a provider plus where it came from and how loading went.

use std::fmt;

use crate::KeyPath;
use crate::provider::{Provider, ProviderKind};

/// Outcome of loading one source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// The source loaded and supplies `keys` keys.
    Loaded {
        /// Number of keys the source supplies.
        keys: usize,
    },
    /// An optional source was unavailable and contributes nothing.
    Skipped {
        /// Why the source was skipped.
        reason: String,
    },
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded { keys: 1 } => f.write_str("loaded, 1 key"),
            Self::Loaded { keys } => write!(f, "loaded, {keys} keys"),
            Self::Skipped { reason } => write!(f, "skipped ({reason})"),
        }
    }
}

/// One position in a [`crate::ProviderChain`].
#[derive(Debug)]
pub struct ChainEntry {
    kind: ProviderKind,
    origin: String,
    status: LoadStatus,
    provider: Option<Box<dyn Provider>>,
}

impl ChainEntry {
    /// Wrap a loaded provider.
    #[must_use]
    pub fn loaded(provider: impl Provider + 'static, origin: impl Into<String>) -> Self {
        let keys = provider.keys().count();
        Self {
            kind: provider.kind(),
            origin: origin.into(),
            status: LoadStatus::Loaded { keys },
            provider: Some(Box::new(provider)),
        }
    }

    /// Record an optional source that could not be loaded. The entry never
    /// supplies a key.
    #[must_use]
    pub fn skipped(kind: ProviderKind, origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            origin: origin.into(),
            status: LoadStatus::Skipped {
                reason: reason.into(),
            },
            provider: None,
        }
    }

    /// Kind of the source at this position.
    #[must_use]
    pub const fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Where the source was loaded from.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// How loading went.
    #[must_use]
    pub const fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Value for `key` supplied by this entry.
    #[must_use]
    pub fn try_get(&self, key: &KeyPath) -> Option<&str> {
        self.provider.as_ref()?.try_get(key)
    }

    /// Keys supplied by this entry.
    pub fn keys(&self) -> Box<dyn Iterator<Item = &KeyPath> + '_> {
        match &self.provider {
            Some(provider) => provider.keys(),
            None => Box::new(std::iter::empty()),
        }
    }
}
