//! Settings that shape how the resolver composes its sources.
//!
//! The settings themselves are layered with figment: serialized defaults
//! under variables prefixed with `CONFIG_LINEAGE_` (nested fields use `__`,
//! for example `CONFIG_LINEAGE_REMOTE_STORE__OPTIONAL=true`).

use camino::Utf8PathBuf;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::provider::RetryPolicy;
use crate::{EnvironmentSnapshot, LineageResult};

const USER_SECRETS_DIR: &str = "config-lineage/user-secrets";
const USER_SECRETS_FILE: &str = "secrets.json";

/// Names and defaults used to build the provider descriptors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Directory holding the settings files and, when relative, the dotenv
    /// file.
    pub settings_dir: Utf8PathBuf,
    /// File stem shared by the base and environment settings files.
    pub settings_stem: String,
    /// Extension of the settings files; selects the parser.
    pub settings_extension: String,
    /// Variable naming the active environment.
    pub environment_variable: String,
    /// Environment used when the variable is unset or blank.
    pub default_environment: String,
    /// Dotenv file merged into the environment snapshot.
    pub dotenv_file: Utf8PathBuf,
    /// Identity selecting the user secrets document; none disables it.
    pub user_secrets_id: Option<String>,
    /// Override for the directory holding per-identity secrets.
    pub user_secrets_root: Option<Utf8PathBuf>,
    /// Remote parameter store composition.
    pub remote_store: RemoteStoreSettings,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            settings_dir: Utf8PathBuf::from("."),
            settings_stem: "appsettings".to_owned(),
            settings_extension: "json".to_owned(),
            environment_variable: "APP_ENVIRONMENT".to_owned(),
            default_environment: "Production".to_owned(),
            dotenv_file: Utf8PathBuf::from(".env"),
            user_secrets_id: None,
            user_secrets_root: None,
            remote_store: RemoteStoreSettings::default(),
        }
    }
}

/// Variables and defaults for the remote parameter store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteStoreSettings {
    /// Boolean variable enabling the store.
    pub enabled_variable: String,
    /// Variable naming the region.
    pub region_variable: String,
    /// Region used when the variable is unset or blank.
    pub default_region: String,
    /// Variable supplying the first path segment.
    pub application_variable: String,
    /// Variable supplying the second path segment.
    pub stage_variable: String,
    /// Whether a failed fetch is tolerated.
    pub optional: bool,
    /// Retry policy for transient fetch failures.
    pub retry: RetryPolicy,
}

impl Default for RemoteStoreSettings {
    fn default() -> Self {
        Self {
            enabled_variable: "REMOTE_PARAMETER_STORE_ENABLED".to_owned(),
            region_variable: "REMOTE_PARAMETER_STORE_REGION".to_owned(),
            default_region: "us-east-1".to_owned(),
            application_variable: "REMOTE_PARAMETER_STORE_APPLICATION".to_owned(),
            stage_variable: "REMOTE_PARAMETER_STORE_STAGE".to_owned(),
            optional: false,
            retry: RetryPolicy::default(),
        }
    }
}

impl ResolverSettings {
    /// Prefix of the variables that override these settings.
    pub const ENV_PREFIX: &'static str = "CONFIG_LINEAGE_";

    /// Figment layering defaults under prefixed environment variables.
    #[must_use]
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
    }

    /// Extract settings from [`ResolverSettings::figment`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::LineageError::Settings`] when a variable cannot be
    /// deserialised into its field.
    pub fn load() -> LineageResult<Self> {
        Ok(Self::figment().extract()?)
    }

    /// Path of the base settings file.
    #[must_use]
    pub fn base_file(&self) -> Utf8PathBuf {
        self.settings_dir
            .join(format!("{}.{}", self.settings_stem, self.settings_extension))
    }

    /// Path of the settings file for `environment`.
    #[must_use]
    pub fn environment_file(&self, environment: &str) -> Utf8PathBuf {
        self.settings_dir.join(format!(
            "{}.{environment}.{}",
            self.settings_stem, self.settings_extension
        ))
    }

    /// Active environment name read from `env`.
    #[must_use]
    pub fn environment_name<'a>(&'a self, env: &'a EnvironmentSnapshot) -> &'a str {
        env.non_blank(&self.environment_variable)
            .unwrap_or(&self.default_environment)
    }

    /// Dotenv path, resolved against the settings directory when relative.
    #[must_use]
    pub fn dotenv_path(&self) -> Utf8PathBuf {
        if self.dotenv_file.is_absolute() {
            self.dotenv_file.clone()
        } else {
            self.settings_dir.join(&self.dotenv_file)
        }
    }

    /// Location of the user secrets document, or `None` when no identity is
    /// configured or no configuration directory can be determined.
    #[must_use]
    pub fn user_secrets_file(&self) -> Option<Utf8PathBuf> {
        let id = self
            .user_secrets_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())?;
        let root = self.user_secrets_root.clone().or_else(|| {
            dirs::config_dir()
                .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
                .map(|dir| dir.join(USER_SECRETS_DIR))
        })?;
        Some(root.join(id).join(USER_SECRETS_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::ResolverSettings;
    use crate::EnvironmentSnapshot;
    use camino::Utf8PathBuf;
    use rstest::rstest;

    #[test]
    fn default_file_names_follow_the_stem() {
        let settings = ResolverSettings {
            settings_dir: Utf8PathBuf::from("conf"),
            ..ResolverSettings::default()
        };
        assert_eq!(settings.base_file(), "conf/appsettings.json");
        assert_eq!(
            settings.environment_file("Development"),
            "conf/appsettings.Development.json"
        );
        assert_eq!(settings.dotenv_path(), "conf/.env");
    }

    #[rstest]
    #[case(None, "Production")]
    #[case(Some(""), "Production")]
    #[case(Some("Development"), "Development")]
    fn environment_name_defaults_to_production(
        #[case] raw: Option<&str>,
        #[case] expected: &str,
    ) {
        let settings = ResolverSettings::default();
        let env = raw.map_or_else(EnvironmentSnapshot::new, |value| {
            EnvironmentSnapshot::new().with_var("APP_ENVIRONMENT", value)
        });
        assert_eq!(settings.environment_name(&env), expected);
    }

    #[test]
    fn user_secrets_need_an_identity() {
        let mut settings = ResolverSettings {
            user_secrets_root: Some(Utf8PathBuf::from("/secrets")),
            ..ResolverSettings::default()
        };
        assert_eq!(settings.user_secrets_file(), None);
        settings.user_secrets_id = Some("  ".to_owned());
        assert_eq!(settings.user_secrets_file(), None);
        settings.user_secrets_id = Some("shop-api".to_owned());
        assert_eq!(
            settings.user_secrets_file(),
            Some(Utf8PathBuf::from("/secrets/shop-api/secrets.json"))
        );
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        test_helpers::with_jail(|jail| {
            jail.set_env("CONFIG_LINEAGE_SETTINGS_DIR", "deploy");
            jail.set_env("CONFIG_LINEAGE_DEFAULT_ENVIRONMENT", "Staging");
            jail.set_env("CONFIG_LINEAGE_REMOTE_STORE__OPTIONAL", "true");
            jail.set_env("CONFIG_LINEAGE_REMOTE_STORE__RETRY__MAX_ATTEMPTS", "5");
            let settings = ResolverSettings::load().map_err(|err| err.to_string())?;
            assert_eq!(settings.settings_dir, "deploy");
            assert_eq!(settings.default_environment, "Staging");
            assert!(settings.remote_store.optional);
            assert_eq!(settings.remote_store.retry.max_attempts, 5);
            assert_eq!(settings.settings_stem, "appsettings");
            Ok(())
        })
        .expect("jail");
    }
}
