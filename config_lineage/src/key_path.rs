//! Normalised hierarchical configuration keys.
//!
//! Every provider speaks its own separator dialect: settings files nest
//! objects, environment variables use `__`, and command-line arguments use
//! `:`. Providers translate their native names into a [`KeyPath`] once at load
//! time so lookups compare segment sequences rather than raw strings.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Separator used when rendering a [`KeyPath`] and when parsing user input.
pub const KEY_DELIMITER: char = ':';

/// Separator used by environment variables in place of [`KEY_DELIMITER`].
pub const ENV_DELIMITER: &str = "__";

/// Reasons a raw key cannot become a [`KeyPath`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum KeyPathError {
    /// The key contained no characters at all.
    #[error("configuration keys must not be empty")]
    Empty,
    /// A separator appeared at the start, at the end, or twice in a row.
    #[error("configuration key '{raw}' has an empty segment at position {position}")]
    EmptySegment {
        /// Key as supplied by the caller.
        raw: String,
        /// Zero-based index of the offending segment.
        position: usize,
    },
}

/// Ordered, case-sensitive sequence of key segments.
///
/// Two paths are equal when their segments are equal, whichever separator
/// produced them.
///
/// # Examples
///
/// ```
/// use config_lineage::KeyPath;
///
/// let from_cli: KeyPath = "Db:ConnectionString".parse()?;
/// let from_env = KeyPath::from_env_name("Db__ConnectionString")?;
/// assert_eq!(from_cli, from_env);
/// assert_eq!(from_env.to_string(), "Db:ConnectionString");
/// # Ok::<_, config_lineage::KeyPathError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a `:`-separated key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPathError`] when the key is empty or contains an empty
    /// segment.
    pub fn parse(raw: &str) -> Result<Self, KeyPathError> {
        Self::split(raw, raw.split(KEY_DELIMITER))
    }

    /// Parse an environment variable name, treating both `__` and `:` as
    /// separators.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPathError`] when the name is empty or contains an empty
    /// segment (for example `Db____Name`).
    pub fn from_env_name(name: &str) -> Result<Self, KeyPathError> {
        Self::split(
            name,
            name.split(ENV_DELIMITER)
                .flat_map(|part| part.split(KEY_DELIMITER)),
        )
    }

    /// Build a path from already separated segments. Segments that still
    /// contain `:` are split further.
    ///
    /// # Errors
    ///
    /// Returns [`KeyPathError`] when no segments are supplied or one of them
    /// is empty.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, KeyPathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let owned: Vec<String> = segments.into_iter().map(Into::into).collect();
        let raw = owned.join(&KEY_DELIMITER.to_string());
        Self::split(&raw, owned.iter().flat_map(|s| s.split(KEY_DELIMITER)))
    }

    fn split<'a, I>(raw: &str, parts: I) -> Result<Self, KeyPathError>
    where
        I: Iterator<Item = &'a str>,
    {
        if raw.is_empty() {
            return Err(KeyPathError::Empty);
        }
        let mut segments = Vec::new();
        for (position, part) in parts.enumerate() {
            if part.is_empty() {
                return Err(KeyPathError::EmptySegment {
                    raw: raw.to_owned(),
                    position,
                });
            }
            segments.push(part.to_owned());
        }
        if segments.is_empty() {
            return Err(KeyPathError::Empty);
        }
        Ok(Self { segments })
    }

    /// Iterate over the segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Number of segments; always at least one.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; a [`KeyPath`] cannot be empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append the segments of `suffix` to a copy of this path.
    #[must_use]
    pub fn join(&self, suffix: &Self) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(suffix.segments.iter().cloned());
        Self { segments }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, "{KEY_DELIMITER}")?;
            }
            f.write_str(segment)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for KeyPath {
    type Err = KeyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for KeyPath {
    type Error = KeyPathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
