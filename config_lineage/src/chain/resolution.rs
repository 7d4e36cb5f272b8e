//! Results of looking a key up in the chain.

use crate::KeyPath;
use crate::provider::ProviderKind;

use super::ChainEntry;

/// The winning value for a key together with its provenance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    value: String,
    winner: ProviderKind,
    origin: String,
    position: usize,
}

impl Resolution {
    pub(super) fn new(value: &str, entry: &ChainEntry, position: usize) -> Self {
        Self {
            value: value.to_owned(),
            winner: entry.kind(),
            origin: entry.origin().to_owned(),
            position,
        }
    }

    /// Effective value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Kind of the provider that supplied the value.
    #[must_use]
    pub const fn winner(&self) -> ProviderKind {
        self.winner
    }

    /// Origin of the winning provider.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Chain index of the winning provider (0 is the lowest precedence).
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }
}

/// Outcome of resolving one key.
///
/// The value and the winner are either both present or both absent; an
/// unsupplied key is an ordinary outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionResult {
    key: KeyPath,
    resolution: Option<Resolution>,
}

impl ResolutionResult {
    pub(super) const fn new(key: KeyPath, resolution: Option<Resolution>) -> Self {
        Self { key, resolution }
    }

    /// Key that was resolved.
    #[must_use]
    pub const fn key(&self) -> &KeyPath {
        &self.key
    }

    /// Effective value, if any provider supplied the key.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.resolution.as_ref().map(Resolution::value)
    }

    /// Kind of the winning provider, if any provider supplied the key.
    #[must_use]
    pub fn winner(&self) -> Option<ProviderKind> {
        self.resolution.as_ref().map(Resolution::winner)
    }

    /// Full resolution details.
    #[must_use]
    pub const fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Whether any provider supplied the key.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.resolution.is_some()
    }
}

/// A provider that supplies a key, found while listing candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate<'a> {
    position: usize,
    kind: ProviderKind,
    origin: &'a str,
    value: &'a str,
}

impl<'a> Candidate<'a> {
    pub(super) fn new(position: usize, entry: &'a ChainEntry, value: &'a str) -> Self {
        Self {
            position,
            kind: entry.kind(),
            origin: entry.origin(),
            value,
        }
    }

    /// Chain index of the provider.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Kind of the provider.
    #[must_use]
    pub const fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Origin of the provider.
    #[must_use]
    pub const fn origin(&self) -> &'a str {
        self.origin
    }

    /// Value the provider supplies.
    #[must_use]
    pub const fn value(&self) -> &'a str {
        self.value
    }
}
