//! Ordered precedence stack of providers and the lookup rules over it.
//!
//! Entries are stored lowest precedence first. Conceptually the providers are
//! merged low to high, so a later provider overrides an earlier one for the
//! same key. Winner identification walks the stack in reverse and stops at the
//! first provider that actually supplies the key; a provider's presence in the
//! chain says nothing about which keys it supplies.

mod entry;
mod resolution;

use std::collections::BTreeMap;

use crate::KeyPath;

pub use entry::{ChainEntry, LoadStatus};
pub use resolution::{Candidate, Resolution, ResolutionResult};

/// Mutable list of entries that is frozen into a [`ProviderChain`].
#[derive(Debug, Default)]
pub struct ProviderChainBuilder {
    entries: Vec<ChainEntry>,
}

impl ProviderChainBuilder {
    /// Create an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry above every entry pushed so far.
    pub fn push(&mut self, entry: ChainEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    /// Freeze the entries into an immutable chain.
    #[must_use]
    pub fn build(self) -> ProviderChain {
        ProviderChain {
            entries: self.entries,
        }
    }
}

/// Immutable, ordered set of providers; index 0 has the lowest precedence.
#[derive(Debug)]
pub struct ProviderChain {
    entries: Vec<ChainEntry>,
}

impl ProviderChain {
    /// Start building a chain.
    #[must_use]
    pub const fn builder() -> ProviderChainBuilder {
        ProviderChainBuilder::new()
    }

    /// Find the effective value of `key` and the provider that supplied it.
    ///
    /// # Examples
    ///
    /// ```
    /// use config_lineage::{ChainEntry, CommandLineProvider, ProviderChain, ProviderKind};
    ///
    /// let mut builder = ProviderChain::builder();
    /// builder
    ///     .push(ChainEntry::loaded(CommandLineProvider::parse(["--Mode=low"]), "first"))
    ///     .push(ChainEntry::loaded(CommandLineProvider::parse(["--Other=x"]), "second"));
    /// let chain = builder.build();
    ///
    /// let result = chain.resolve(&"Mode".parse()?);
    /// assert_eq!(result.value(), Some("low"));
    /// assert_eq!(result.winner(), Some(ProviderKind::CommandLine));
    /// assert_eq!(result.resolution().map(|r| r.position()), Some(0));
    /// # Ok::<_, config_lineage::KeyPathError>(())
    /// ```
    #[must_use]
    pub fn resolve(&self, key: &KeyPath) -> ResolutionResult {
        let resolution = self
            .entries
            .iter()
            .enumerate()
            .rev()
            .find_map(|(position, entry)| {
                entry
                    .try_get(key)
                    .map(|value| Resolution::new(value, entry, position))
            });
        ResolutionResult::new(key.clone(), resolution)
    }

    /// Every provider that supplies `key`, highest precedence first. The first
    /// candidate, if any, is the winner; the rest are shadowed.
    #[must_use]
    pub fn candidates(&self, key: &KeyPath) -> Vec<Candidate<'_>> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(position, entry)| {
                entry
                    .try_get(key)
                    .map(|value| Candidate::new(position, entry, value))
            })
            .collect()
    }

    /// Merge every provider low to high into one effective view.
    #[must_use]
    pub fn effective(&self) -> BTreeMap<KeyPath, Resolution> {
        let mut merged = BTreeMap::new();
        for (position, entry) in self.entries.iter().enumerate() {
            for key in entry.keys() {
                if let Some(value) = entry.try_get(key) {
                    merged.insert(key.clone(), Resolution::new(value, entry, position));
                }
            }
        }
        merged
    }

    /// Entries in ascending precedence.
    #[must_use]
    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
