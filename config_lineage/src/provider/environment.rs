//! Provider backed by an environment snapshot.

use crate::{EnvironmentSnapshot, KeyPath};

use super::{KeyValueStore, Provider, ProviderKind};

/// Exposes environment variables as configuration keys.
///
/// Variable names use `__` (or `:`) between segments, so
/// `Db__ConnectionString` supplies `Db:ConnectionString`. Names that do not
/// form a valid key path, such as `A____B` or `__X`, are ignored.
#[derive(Debug)]
pub struct EnvironmentProvider {
    store: KeyValueStore,
}

impl EnvironmentProvider {
    /// Build the provider from the variables in `snapshot`.
    #[must_use]
    pub fn from_snapshot(snapshot: &EnvironmentSnapshot) -> Self {
        let mut store = KeyValueStore::new();
        for (name, value) in snapshot.iter() {
            match KeyPath::from_env_name(name) {
                Ok(key) => {
                    if let Some(previous) = store.insert(key, value) {
                        tracing::debug!(
                            variable = name,
                            replaced = previous.len(),
                            "environment variable aliases an earlier key"
                        );
                    }
                }
                Err(err) => tracing::debug!(variable = name, %err, "ignoring environment variable"),
            }
        }
        Self { store }
    }
}

impl Provider for EnvironmentProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Environment
    }

    fn try_get(&self, key: &KeyPath) -> Option<&str> {
        self.store.get(key)
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &KeyPath> + '_> {
        Box::new(self.store.keys())
    }
}

#[cfg(test)]
mod tests {
    use super::EnvironmentProvider;
    use crate::provider::{Provider, ProviderKind};
    use crate::{EnvironmentSnapshot, KeyPath};

    fn key(raw: &str) -> KeyPath {
        KeyPath::parse(raw).expect("valid key")
    }

    #[test]
    fn double_underscore_maps_to_key_segments() {
        let snapshot: EnvironmentSnapshot = [
            ("Db__ConnectionString", "envval"),
            ("ApiIntegration:ApiKey", "colon-form"),
        ]
        .into_iter()
        .collect();
        let provider = EnvironmentProvider::from_snapshot(&snapshot);
        assert_eq!(provider.kind(), ProviderKind::Environment);
        assert_eq!(provider.try_get(&key("Db:ConnectionString")), Some("envval"));
        assert_eq!(provider.try_get(&key("ApiIntegration:ApiKey")), Some("colon-form"));
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let snapshot: EnvironmentSnapshot = [("DB__CONNECTIONSTRING", "shout")].into_iter().collect();
        let provider = EnvironmentProvider::from_snapshot(&snapshot);
        assert_eq!(provider.try_get(&key("Db:ConnectionString")), None);
        assert_eq!(provider.try_get(&key("DB:CONNECTIONSTRING")), Some("shout"));
    }

    #[test]
    fn invalid_names_are_skipped() {
        let snapshot: EnvironmentSnapshot = [("__", "x"), ("A____B", "y"), ("OK", "z")]
            .into_iter()
            .collect();
        let provider = EnvironmentProvider::from_snapshot(&snapshot);
        assert_eq!(provider.keys().count(), 1);
        assert_eq!(provider.try_get(&key("OK")), Some("z"));
    }
}
