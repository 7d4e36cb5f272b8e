//! Provider backed by command-line arguments.

use crate::KeyPath;

use super::{KeyValueStore, Provider, ProviderKind};

/// Exposes `--Key=Value` style arguments as configuration keys.
///
/// Accepted forms are `--Key=Value`, `/Key=Value`, `Key=Value`,
/// `--Key Value` and `/Key Value`. Single-dash switches, bare words and a
/// trailing `--Key` without a value are ignored. When a key repeats, the
/// last occurrence wins.
///
/// # Examples
///
/// ```
/// use config_lineage::{CommandLineProvider, KeyPath, Provider};
///
/// let provider = CommandLineProvider::parse(["--Db:ConnectionString=clival", "/Mode", "fast"]);
/// assert_eq!(provider.try_get(&"Db:ConnectionString".parse()?), Some("clival"));
/// assert_eq!(provider.try_get(&"Mode".parse()?), Some("fast"));
/// # Ok::<_, config_lineage::KeyPathError>(())
/// ```
#[derive(Debug)]
pub struct CommandLineProvider {
    store: KeyValueStore,
}

impl CommandLineProvider {
    /// Parse `args` into key/value pairs.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = KeyValueStore::new();
        let mut remaining = args.into_iter();
        while let Some(raw) = remaining.next() {
            let arg = raw.as_ref();
            let (body, prefixed) = if let Some(rest) = arg.strip_prefix("--") {
                (rest, true)
            } else if let Some(rest) = arg.strip_prefix('/') {
                (rest, true)
            } else if arg.starts_with('-') {
                tracing::debug!(arg, "ignoring single-dash argument");
                continue;
            } else {
                (arg, false)
            };

            let (name, value) = match body.split_once('=') {
                Some((name, value)) => (name, value.to_owned()),
                None if prefixed && !body.is_empty() => match remaining.next() {
                    Some(value) => (body, value.as_ref().to_owned()),
                    None => {
                        tracing::debug!(arg, "ignoring trailing switch without a value");
                        continue;
                    }
                },
                None => {
                    tracing::debug!(arg, "ignoring argument without a key");
                    continue;
                }
            };

            match KeyPath::parse(name) {
                Ok(key) => {
                    store.insert(key, value);
                }
                Err(err) => tracing::debug!(arg, %err, "ignoring argument with an invalid key"),
            }
        }
        Self { store }
    }
}

impl Provider for CommandLineProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::CommandLine
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
    use super::CommandLineProvider;
    use crate::KeyPath;
    use crate::provider::Provider;
    use rstest::rstest;

    fn key(raw: &str) -> KeyPath {
        KeyPath::parse(raw).expect("valid key")
    }

    #[rstest]
    #[case(&["--Db:ConnectionString=clival"])]
    #[case(&["/Db:ConnectionString=clival"])]
    #[case(&["Db:ConnectionString=clival"])]
    #[case(&["--Db:ConnectionString", "clival"])]
    #[case(&["/Db:ConnectionString", "clival"])]
    fn accepts_every_supported_form(#[case] args: &[&str]) {
        let provider = CommandLineProvider::parse(args);
        assert_eq!(provider.try_get(&key("Db:ConnectionString")), Some("clival"));
    }

    #[test]
    fn last_occurrence_wins() {
        let provider = CommandLineProvider::parse(["--Mode=slow", "--Mode=fast"]);
        assert_eq!(provider.try_get(&key("Mode")), Some("fast"));
    }

    #[test]
    fn values_may_contain_equals_signs() {
        let provider = CommandLineProvider::parse(["--Db:ConnectionString=Server=x;User=y"]);
        assert_eq!(
            provider.try_get(&key("Db:ConnectionString")),
            Some("Server=x;User=y")
        );
    }

    #[rstest]
    #[case(&["-v"])]
    #[case(&["bare"])]
    #[case(&["--dangling"])]
    #[case(&["--=value"])]
    #[case(&["--"])]
    fn ignores_unusable_arguments(#[case] args: &[&str]) {
        let provider = CommandLineProvider::parse(args);
        assert_eq!(provider.keys().count(), 0);
    }

    #[test]
    fn empty_values_are_still_supplied() {
        let provider = CommandLineProvider::parse(["--ApiIntegration:ApiKey="]);
        assert_eq!(provider.try_get(&key("ApiIntegration:ApiKey")), Some(""));
    }
}
