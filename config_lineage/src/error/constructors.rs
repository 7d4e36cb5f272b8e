//! Constructors and accessors for [`LineageError`] and [`SourceError`].

use figment::Error as FigmentError;

use crate::provider::ProviderKind;

use super::{LineageError, SourceError};

impl LineageError {
    /// Construct a [`LineageError::SourceLoad`] for a required source.
    ///
    /// # Examples
    ///
    /// ```
    /// use config_lineage::{LineageError, ProviderKind, SourceError};
    ///
    /// let err = LineageError::source_load(
    ///     ProviderKind::RemoteParameterStore,
    ///     "/shop/prod",
    ///     SourceError::malformed("unreachable"),
    /// );
    /// assert_eq!(err.failed_kind(), Some(ProviderKind::RemoteParameterStore));
    /// ```
    #[must_use]
    pub fn source_load(
        kind: ProviderKind,
        origin: impl Into<String>,
        source: impl Into<SourceError>,
    ) -> Self {
        Self::SourceLoad {
            kind,
            origin: origin.into(),
            source: source.into(),
        }
    }

    /// Construct a [`LineageError::MissingSetting`].
    #[must_use]
    pub fn missing_setting(variable: impl Into<String>, purpose: &'static str) -> Self {
        Self::MissingSetting {
            variable: variable.into(),
            purpose,
        }
    }

    /// Construct a [`LineageError::InvalidSetting`].
    #[must_use]
    pub fn invalid_setting(
        variable: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidSetting {
            variable: variable.into(),
            value: value.into(),
            expected,
        }
    }

    /// Kind of the source that failed, when the error is a source failure.
    #[must_use]
    pub const fn failed_kind(&self) -> Option<ProviderKind> {
        match self {
            Self::SourceLoad { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<FigmentError> for LineageError {
    fn from(e: FigmentError) -> Self {
        Self::Settings(Box::new(e))
    }
}

impl SourceError {
    /// Construct a [`SourceError::Malformed`] from a message.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Construct a [`SourceError::NotConfigured`] from a message.
    #[must_use]
    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::NotConfigured(message.into())
    }

    /// Whether the failure means the backing file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<toml_edit::TomlError> for SourceError {
    fn from(e: toml_edit::TomlError) -> Self {
        Self::Toml(Box::new(e))
    }
}
