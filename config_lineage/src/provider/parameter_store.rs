//! Remote parameter store provider and its client seam.
//!
//! Fetching happens once, at construction, through a [`ParameterStoreClient`].
//! Transient failures are retried according to a [`RetryPolicy`]; anything
//! else, or exhausting the attempts, fails the load.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{KeyPath, SourceError, fs};

use super::{KeyValueStore, Provider, ProviderKind};

/// Failure reported by a [`ParameterStoreClient`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// A failure that may succeed on retry, such as a timeout.
    #[error("transient parameter store failure: {0}")]
    Transient(String),
    /// A failure that retrying cannot fix, such as a missing region.
    #[error("parameter store request failed: {0}")]
    Permanent(String),
}

impl FetchError {
    /// Construct a [`FetchError::Transient`].
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    /// Construct a [`FetchError::Permanent`].
    #[must_use]
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent(message.into())
    }

    /// Whether the failure is worth retrying.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// A named parameter returned by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    /// Full parameter name, for example `/shop/prod/Db/ConnectionString`.
    pub name: String,
    /// Parameter value.
    pub value: String,
}

impl Parameter {
    /// Construct a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Slash-separated prefix under which parameters are fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterPath {
    segments: Vec<String>,
}

impl ParameterPath {
    /// Compose a prefix from path segments. Surrounding slashes on each
    /// segment are ignored.
    ///
    /// Returns `None` when no segments are given or a segment is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use config_lineage::ParameterPath;
    ///
    /// let path = ParameterPath::compose(["shop", "/prod/"]).expect("valid segments");
    /// assert_eq!(path.to_string(), "/shop/prod");
    /// assert!(ParameterPath::compose(["shop", " "]).is_none());
    /// ```
    pub fn compose<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = segments
            .into_iter()
            .map(|segment| segment.as_ref().trim().trim_matches('/').to_owned())
            .collect();
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self { segments })
    }

    /// Append the segments of `other` to this path.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        Self {
            segments: self.segments.iter().chain(&other.segments).cloned().collect(),
        }
    }

    /// Key path for a parameter name under this prefix.
    ///
    /// Returns `None` for names outside the prefix or names that do not form
    /// a valid key path.
    #[must_use]
    pub fn relative_key(&self, name: &str) -> Option<KeyPath> {
        let rest = name
            .strip_prefix(self.to_string().as_str())?
            .strip_prefix('/')?;
        KeyPath::from_segments(rest.split('/')).ok()
    }
}

impl fmt::Display for ParameterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Bounded exponential backoff for transient fetch failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves as one.
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 200,
            max_backoff_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Delay to wait after the failed attempt numbered `attempt` (1-based).
    ///
    /// # Examples
    ///
    /// ```
    /// use config_lineage::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy { max_attempts: 5, initial_backoff_ms: 100, max_backoff_ms: 300 };
    /// assert_eq!(policy.backoff(1), Duration::from_millis(100));
    /// assert_eq!(policy.backoff(2), Duration::from_millis(200));
    /// assert_eq!(policy.backoff(3), Duration::from_millis(300));
    /// ```
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1_u64
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u64::MAX);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Seam over the networked store so the provider can be exercised offline.
pub trait ParameterStoreClient: fmt::Debug {
    /// Fetch every parameter whose name starts with `prefix` in `region`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the store cannot be reached or rejects the
    /// request.
    fn fetch(&self, prefix: &ParameterPath, region: &str) -> Result<Vec<Parameter>, FetchError>;
}

/// Client reading parameters published as `<root>/<region>.json`.
///
/// Each file holds a JSON object of full parameter names to string values.
#[derive(Clone, Debug)]
pub struct DirectoryParameterStore {
    root: Utf8PathBuf,
}

impl DirectoryParameterStore {
    /// Create a client rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ParameterStoreClient for DirectoryParameterStore {
    fn fetch(&self, prefix: &ParameterPath, region: &str) -> Result<Vec<Parameter>, FetchError> {
        let path = self.root.join(format!("{region}.json"));
        let data = fs::read_to_string(&path).map_err(|err| read_failure(region, &path, &err))?;
        let published: BTreeMap<String, String> = serde_json::from_str(&data)
            .map_err(|err| FetchError::permanent(format!("decoding '{path}': {err}")))?;
        let scope = format!("{prefix}/");
        Ok(published
            .into_iter()
            .filter(|(name, _)| name.starts_with(&scope))
            .map(|(name, value)| Parameter::new(name, value))
            .collect())
    }
}

/// Only interruptions and timeouts are worth retrying.
fn read_failure(region: &str, path: &Utf8Path, err: &io::Error) -> FetchError {
    match err.kind() {
        io::ErrorKind::NotFound => {
            FetchError::permanent(format!("region '{region}' is not published at '{path}'"))
        }
        io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
            FetchError::transient(format!("reading '{path}': {err}"))
        }
        _ => FetchError::permanent(format!("reading '{path}': {err}")),
    }
}

/// Client serving parameters from memory, keyed by region.
#[derive(Clone, Debug, Default)]
pub struct InMemoryParameterStore {
    regions: HashMap<String, Vec<Parameter>>,
}

impl InMemoryParameterStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter to `region`.
    #[must_use]
    pub fn with_parameter(
        mut self,
        region: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.regions
            .entry(region.into())
            .or_default()
            .push(Parameter::new(name, value));
        self
    }
}

impl ParameterStoreClient for InMemoryParameterStore {
    fn fetch(&self, prefix: &ParameterPath, region: &str) -> Result<Vec<Parameter>, FetchError> {
        let parameters = self
            .regions
            .get(region)
            .ok_or_else(|| FetchError::permanent(format!("unknown region '{region}'")))?;
        let scope = format!("{prefix}/");
        Ok(parameters
            .iter()
            .filter(|parameter| parameter.name.starts_with(&scope))
            .cloned()
            .collect())
    }
}

/// Provider holding parameters fetched from a remote store.
#[derive(Debug)]
pub struct ParameterStoreProvider {
    prefix: ParameterPath,
    region: String,
    store: KeyValueStore,
}

impl ParameterStoreProvider {
    /// Fetch parameters under `prefix`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Fetch`] with the last failure once a permanent
    /// error occurs or the attempts are exhausted.
    pub fn fetch(
        client: &dyn ParameterStoreClient,
        prefix: ParameterPath,
        region: &str,
        policy: &RetryPolicy,
    ) -> Result<Self, SourceError> {
        let parameters = fetch_with_retry(client, &prefix, region, policy)?;
        let mut store = KeyValueStore::new();
        for parameter in parameters {
            match prefix.relative_key(&parameter.name) {
                Some(key) => {
                    store.insert(key, parameter.value);
                }
                None => tracing::debug!(name = %parameter.name, %prefix, "ignoring parameter outside prefix"),
            }
        }
        tracing::debug!(%prefix, region, keys = store.len(), "fetched remote parameters");
        Ok(Self {
            prefix,
            region: region.to_owned(),
            store,
        })
    }

    /// Prefix the parameters were fetched under.
    #[must_use]
    pub const fn prefix(&self) -> &ParameterPath {
        &self.prefix
    }

    /// Region the parameters were fetched from.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }
}

fn fetch_with_retry(
    client: &dyn ParameterStoreClient,
    prefix: &ParameterPath,
    region: &str,
    policy: &RetryPolicy,
) -> Result<Vec<Parameter>, FetchError> {
    let attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match client.fetch(prefix, region) {
            Ok(parameters) => return Ok(parameters),
            Err(err) if err.is_transient() && attempt < attempts => {
                let delay = policy.backoff(attempt);
                tracing::warn!(%prefix, region, attempt, ?delay, %err, "retrying parameter store fetch");
                std::thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

impl Provider for ParameterStoreProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::RemoteParameterStore
    }

    fn try_get(&self, key: &KeyPath) -> Option<&str> {
        self.store.get(key)
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &KeyPath> + '_> {
        Box::new(self.store.keys())
    }
}
