//! Assemble the provider chain from settings, flags and the environment.
//!
//! [`ResolverBuilder::plan`] turns settings plus a snapshot into an ordered
//! list of [`ProviderDescriptor`]s:
//!
//! 1. the base settings file (optional);
//! 2. the environment-specific settings file (optional);
//! 3. the remote parameter store, when enabled (required unless configured
//!    otherwise);
//! 4. the user secrets document (optional);
//! 5. the process environment;
//! 6. the command-line arguments.
//!
//! [`ResolverBuilder::build`] loads each descriptor in that order and freezes
//! the result into a [`Resolver`].

mod descriptor;
mod flags;
mod settings;

use crate::chain::{ProviderChain, ResolutionResult};
use crate::provider::{ParameterPath, ParameterStoreClient, ProviderKind};
use crate::{EnvironmentSnapshot, KeyPath, LineageError, LineageResult};

use descriptor::LoadContext;

pub use descriptor::ProviderDescriptor;
pub use flags::FeatureFlags;
pub use settings::{RemoteStoreSettings, ResolverSettings};

const REMOTE_PATH_PURPOSE: &str = "remote parameter store path segment";

/// Configures and builds a [`Resolver`].
#[derive(Debug)]
pub struct ResolverBuilder {
    settings: ResolverSettings,
    parameter_store: Option<Box<dyn ParameterStoreClient>>,
}

impl ResolverBuilder {
    /// Start from `settings` with no parameter store client.
    #[must_use]
    pub const fn new(settings: ResolverSettings) -> Self {
        Self {
            settings,
            parameter_store: None,
        }
    }

    /// Use `client` when the remote parameter store is enabled.
    #[must_use]
    pub fn parameter_store(mut self, client: impl ParameterStoreClient + 'static) -> Self {
        self.parameter_store = Some(Box::new(client));
        self
    }

    /// Settings the builder was created with.
    #[must_use]
    pub const fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Ordered descriptors for `env` and `flags`.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::MissingSetting`] when the remote store is
    /// enabled but a path segment variable is unset or blank.
    pub fn plan(
        &self,
        env: &EnvironmentSnapshot,
        flags: FeatureFlags,
    ) -> LineageResult<Vec<ProviderDescriptor>> {
        let environment = self.settings.environment_name(env);
        let mut descriptors = vec![
            ProviderDescriptor::File {
                path: self.settings.base_file(),
                optional: true,
            },
            ProviderDescriptor::File {
                path: self.settings.environment_file(environment),
                optional: true,
            },
        ];
        if flags.remote_parameter_store {
            descriptors.push(self.remote_descriptor(env)?);
        }
        descriptors.extend([
            ProviderDescriptor::UserSecrets {
                path: self.settings.user_secrets_file(),
                optional: true,
            },
            ProviderDescriptor::Environment,
            ProviderDescriptor::CommandLine,
        ]);
        Ok(descriptors)
    }

    fn remote_descriptor(&self, env: &EnvironmentSnapshot) -> LineageResult<ProviderDescriptor> {
        let remote = &self.settings.remote_store;
        let segment = |variable: &str| -> LineageResult<ParameterPath> {
            let value = env
                .non_blank(variable)
                .ok_or_else(|| LineageError::missing_setting(variable, REMOTE_PATH_PURPOSE))?;
            ParameterPath::compose([value]).ok_or_else(|| {
                LineageError::invalid_setting(variable, value, "a path segment other than '/'")
            })
        };
        let application = segment(&remote.application_variable)?;
        let prefix = application.join(&segment(&remote.stage_variable)?);
        let region = env
            .non_blank(&remote.region_variable)
            .unwrap_or(&remote.default_region)
            .to_owned();
        Ok(ProviderDescriptor::RemoteParameterStore {
            prefix,
            region,
            optional: remote.optional,
        })
    }

    /// Load every planned source and freeze the chain.
    ///
    /// # Errors
    ///
    /// Returns the planning errors of [`ResolverBuilder::plan`] and
    /// [`LineageError::SourceLoad`] when a required source fails.
    pub fn build(
        &self,
        env: &EnvironmentSnapshot,
        flags: FeatureFlags,
        args: &[String],
    ) -> LineageResult<Resolver> {
        let ctx = LoadContext {
            env,
            args,
            parameter_store: self.parameter_store.as_deref(),
            retry: &self.settings.remote_store.retry,
        };
        let mut builder = ProviderChain::builder();
        for descriptor in self.plan(env, flags)? {
            builder.push(descriptor.load(ctx)?);
        }
        let chain = builder.build();
        let environment_name = self.settings.environment_name(env).to_owned();
        tracing::info!(
            providers = chain.len(),
            environment = %environment_name,
            remote_parameter_store = flags.remote_parameter_store,
            "provider chain assembled"
        );
        Ok(Resolver {
            chain,
            environment_name,
        })
    }

    /// Capture the process environment, merge the dotenv file once, read
    /// the feature flags and build.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Dotenv`] for a malformed dotenv file,
    /// [`LineageError::InvalidSetting`] for an unreadable flag, and the
    /// errors of [`ResolverBuilder::build`].
    pub fn build_from_process(&self, args: &[String]) -> LineageResult<Resolver> {
        let mut env = EnvironmentSnapshot::capture();
        env.merge_dotenv(&self.settings.dotenv_path())?;
        let flags = FeatureFlags::from_environment(&env, &self.settings.remote_store)?;
        self.build(&env, flags, args)
    }
}

/// Answers "what is the value" and "who supplied it" for any key.
#[derive(Debug)]
pub struct Resolver {
    chain: ProviderChain,
    environment_name: String,
}

impl Resolver {
    /// Start configuring a resolver.
    #[must_use]
    pub const fn builder(settings: ResolverSettings) -> ResolverBuilder {
        ResolverBuilder::new(settings)
    }

    /// Resolve `key` against the chain.
    #[must_use]
    pub fn resolve(&self, key: &KeyPath) -> ResolutionResult {
        self.chain.resolve(key)
    }

    /// Parse `raw` as a key and resolve it.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::InvalidKey`] when `raw` is not a valid key.
    pub fn resolve_str(&self, raw: &str) -> LineageResult<ResolutionResult> {
        Ok(self.resolve(&KeyPath::parse(raw)?))
    }

    /// Effective value of `key`, if any provider supplies it.
    #[must_use]
    pub fn effective_value(&self, key: &KeyPath) -> Option<String> {
        self.resolve(key).value().map(str::to_owned)
    }

    /// Kind of the provider whose value wins for `key`.
    #[must_use]
    pub fn winning_provider(&self, key: &KeyPath) -> Option<ProviderKind> {
        self.resolve(key).winner()
    }

    /// The frozen chain.
    #[must_use]
    pub const fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    /// Active environment name the settings file was chosen for.
    #[must_use]
    pub fn environment_name(&self) -> &str {
        &self.environment_name
    }
}

#[cfg(test)]
#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest injects fixtures by value"
)]
