//! Feature flags read from the environment snapshot.

use super::settings::RemoteStoreSettings;
use crate::{EnvironmentSnapshot, LineageError, LineageResult};

const BOOLEAN_EXPECTED: &str = "a boolean (true/false, 1/0, yes/no, on/off)";

/// Switches that decide which optional descriptors are planned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Whether the remote parameter store joins the chain.
    pub remote_parameter_store: bool,
}

impl FeatureFlags {
    /// Flags with every optional source disabled.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            remote_parameter_store: false,
        }
    }

    /// Flags with the remote parameter store enabled.
    #[must_use]
    pub const fn with_remote_parameter_store(mut self, enabled: bool) -> Self {
        self.remote_parameter_store = enabled;
        self
    }

    /// Read the flags from `env`. An unset or blank variable means disabled.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::InvalidSetting`] when the variable holds
    /// something other than a recognised boolean.
    pub fn from_environment(
        env: &EnvironmentSnapshot,
        remote: &RemoteStoreSettings,
    ) -> LineageResult<Self> {
        let remote_parameter_store = env.get(&remote.enabled_variable).map_or(Ok(false), |raw| {
            parse_bool(raw).ok_or_else(|| {
                LineageError::invalid_setting(&remote.enabled_variable, raw, BOOLEAN_EXPECTED)
            })
        })?;
        Ok(Self {
            remote_parameter_store,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
