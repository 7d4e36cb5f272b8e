//! Descriptors naming each source before it is loaded.

use camino::Utf8PathBuf;

use crate::chain::ChainEntry;
use crate::provider::{
    CommandLineProvider, EnvironmentProvider, FileFormat, FileProvider, ParameterPath,
    ParameterStoreClient, ParameterStoreProvider, ProviderKind, RetryPolicy,
};
use crate::{EnvironmentSnapshot, LineageError, LineageResult, SourceError};

/// Static description of one source, in the order it joins the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderDescriptor {
    /// A settings file.
    File {
        /// Location of the file.
        path: Utf8PathBuf,
        /// Whether a missing or malformed file is tolerated.
        optional: bool,
    },
    /// The per-user secrets document; `None` when no identity is configured.
    UserSecrets {
        /// Location of the secrets document.
        path: Option<Utf8PathBuf>,
        /// Whether an unavailable document is tolerated.
        optional: bool,
    },
    /// Parameters fetched from a remote store.
    RemoteParameterStore {
        /// Prefix the parameters live under.
        prefix: ParameterPath,
        /// Region to fetch from.
        region: String,
        /// Whether a failed fetch is tolerated.
        optional: bool,
    },
    /// The process environment snapshot.
    Environment,
    /// Command-line arguments.
    CommandLine,
}

/// Inputs shared by every descriptor while loading.
#[derive(Clone, Copy)]
pub(crate) struct LoadContext<'a> {
    pub(crate) env: &'a EnvironmentSnapshot,
    pub(crate) args: &'a [String],
    pub(crate) parameter_store: Option<&'a dyn ParameterStoreClient>,
    pub(crate) retry: &'a RetryPolicy,
}

impl ProviderDescriptor {
    /// Kind the loaded provider will report.
    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::File { path, .. } => {
                FileFormat::detect(path).map_or(ProviderKind::JsonFile, FileFormat::kind)
            }
            Self::UserSecrets { .. } => ProviderKind::UserSecrets,
            Self::RemoteParameterStore { .. } => ProviderKind::RemoteParameterStore,
            Self::Environment => ProviderKind::Environment,
            Self::CommandLine => ProviderKind::CommandLine,
        }
    }

    /// Whether a load failure is recovered rather than fatal.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        match self {
            Self::File { optional, .. }
            | Self::UserSecrets { optional, .. }
            | Self::RemoteParameterStore { optional, .. } => *optional,
            Self::Environment | Self::CommandLine => false,
        }
    }

    /// Human-readable origin recorded on the chain entry.
    #[must_use]
    pub fn origin(&self) -> String {
        match self {
            Self::File { path, .. } | Self::UserSecrets { path: Some(path), .. } => {
                path.to_string()
            }
            Self::UserSecrets { path: None, .. } => "user secrets".to_owned(),
            Self::RemoteParameterStore { prefix, region, .. } => format!("{prefix} ({region})"),
            Self::Environment => "process environment".to_owned(),
            Self::CommandLine => "argv".to_owned(),
        }
    }

    /// Load the source into a chain entry.
    ///
    /// Optional sources that fail become skipped entries; required sources
    /// that fail abort with [`LineageError::SourceLoad`].
    pub(crate) fn load(&self, ctx: LoadContext<'_>) -> LineageResult<ChainEntry> {
        let kind = self.kind();
        let origin = self.origin();
        if let Self::UserSecrets {
            path: None,
            optional: true,
        } = self
        {
            tracing::debug!("no user secrets id configured");
            return Ok(ChainEntry::skipped(kind, origin, "no user secrets id"));
        }
        self.open(ctx, &origin).or_else(|err| {
            if !self.is_optional() {
                return Err(LineageError::source_load(kind, origin, err));
            }
            let reason = if err.is_not_found() {
                tracing::debug!(%kind, %origin, "optional source not found");
                "not found".to_owned()
            } else {
                tracing::warn!(%kind, %origin, error = %err, "skipping optional source");
                err.to_string()
            };
            Ok(ChainEntry::skipped(kind, origin, reason))
        })
    }

    fn open(&self, ctx: LoadContext<'_>, origin: &str) -> Result<ChainEntry, SourceError> {
        let entry = match self {
            Self::File { path, .. } => ChainEntry::loaded(FileProvider::load(path)?, origin),
            Self::UserSecrets {
                path: Some(path), ..
            } => ChainEntry::loaded(FileProvider::load_user_secrets(path)?, origin),
            Self::UserSecrets { path: None, .. } => {
                return Err(SourceError::not_configured("no user secrets id configured"));
            }
            Self::RemoteParameterStore { prefix, region, .. } => {
                let client = ctx.parameter_store.ok_or_else(|| {
                    SourceError::not_configured("no parameter store client configured")
                })?;
                let provider =
                    ParameterStoreProvider::fetch(client, prefix.clone(), region, ctx.retry)?;
                ChainEntry::loaded(provider, origin)
            }
            Self::Environment => ChainEntry::loaded(EnvironmentProvider::from_snapshot(ctx.env), origin),
            Self::CommandLine => ChainEntry::loaded(CommandLineProvider::parse(ctx.args), origin),
        };
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadContext, ProviderDescriptor};
    use crate::provider::{InMemoryParameterStore, ParameterPath, ProviderKind, RetryPolicy};
    use crate::{EnvironmentSnapshot, LineageError, LoadStatus};
    use camino::Utf8PathBuf;
    use rstest::rstest;

    fn load(descriptor: &ProviderDescriptor) -> crate::LineageResult<crate::ChainEntry> {
        let env = EnvironmentSnapshot::new();
        let retry = RetryPolicy::no_retry();
        descriptor.load(LoadContext {
            env: &env,
            args: &[],
            parameter_store: None,
            retry: &retry,
        })
    }

    #[rstest]
    #[case("conf/appsettings.json", ProviderKind::JsonFile)]
    #[case("conf/appsettings.toml", ProviderKind::TomlFile)]
    fn file_kind_follows_extension(#[case] path: &str, #[case] expected: ProviderKind) {
        let descriptor = ProviderDescriptor::File {
            path: Utf8PathBuf::from(path),
            optional: true,
        };
        assert_eq!(descriptor.kind(), expected);
    }

    #[test]
    fn missing_optional_file_is_skipped() {
        let descriptor = ProviderDescriptor::File {
            path: Utf8PathBuf::from("definitely/not/here.json"),
            optional: true,
        };
        let entry = load(&descriptor).expect("optional file");
        assert_eq!(
            entry.status(),
            &LoadStatus::Skipped {
                reason: "not found".to_owned()
            }
        );
    }

    #[test]
    fn missing_required_file_is_fatal() {
        let descriptor = ProviderDescriptor::File {
            path: Utf8PathBuf::from("definitely/not/here.json"),
            optional: false,
        };
        let err = load(&descriptor).expect_err("required file");
        assert_eq!(err.failed_kind(), Some(ProviderKind::JsonFile));
    }

    #[test]
    fn remote_store_without_client_is_a_source_failure() {
        let descriptor = ProviderDescriptor::RemoteParameterStore {
            prefix: ParameterPath::compose(["shop", "prod"]).expect("prefix"),
            region: "eu-west-1".to_owned(),
            optional: false,
        };
        let err = load(&descriptor).expect_err("no client");
        assert!(matches!(err, LineageError::SourceLoad { .. }), "{err}");
        assert!(err.to_string().contains("/shop/prod (eu-west-1)"), "{err}");
    }

    #[test]
    fn remote_store_reads_through_the_client() {
        let client = InMemoryParameterStore::new().with_parameter(
            "eu-west-1",
            "/shop/prod/Db/ConnectionString",
            "remote",
        );
        let descriptor = ProviderDescriptor::RemoteParameterStore {
            prefix: ParameterPath::compose(["shop", "prod"]).expect("prefix"),
            region: "eu-west-1".to_owned(),
            optional: false,
        };
        let env = EnvironmentSnapshot::new();
        let retry = RetryPolicy::no_retry();
        let entry = descriptor
            .load(LoadContext {
                env: &env,
                args: &[],
                parameter_store: Some(&client),
                retry: &retry,
            })
            .expect("fetch");
        let key = "Db:ConnectionString".parse().expect("key");
        assert_eq!(entry.try_get(&key), Some("remote"));
        assert_eq!(entry.kind(), ProviderKind::RemoteParameterStore);
    }

    #[test]
    fn user_secrets_without_identity_are_skipped() {
        let descriptor = ProviderDescriptor::UserSecrets {
            path: None,
            optional: true,
        };
        let entry = load(&descriptor).expect("optional secrets");
        assert!(matches!(entry.status(), LoadStatus::Skipped { .. }));
        assert_eq!(entry.origin(), "user secrets");
    }
}
