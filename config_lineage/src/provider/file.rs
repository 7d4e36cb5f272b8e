//! File-backed providers for settings files and the user secrets store.

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use toml_edit::{DocumentMut, Item, Table, Value as TomlValue};

use crate::{KeyPath, SourceError, fs};

use super::{KeyValueStore, Provider, ProviderKind};

/// Formats a settings file may be written in, chosen by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    /// `.json` files.
    Json,
    /// `.toml` files.
    Toml,
}

impl FileFormat {
    /// Detect the format from the extension of `path`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Malformed`] for missing or unsupported
    /// extensions.
    pub fn detect(path: &Utf8Path) -> Result<Self, SourceError> {
        match path.extension().map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some(other) => Err(SourceError::malformed(format!(
                "unsupported settings file extension '.{other}'"
            ))),
            None => Err(SourceError::malformed(
                "settings file has no extension to select a format",
            )),
        }
    }

    /// Provider kind reported for files in this format.
    #[must_use]
    pub const fn kind(self) -> ProviderKind {
        match self {
            Self::Json => ProviderKind::JsonFile,
            Self::Toml => ProviderKind::TomlFile,
        }
    }

    /// Parse `data` into a document whose scalars keep their source text.
    fn parse(self, data: &str) -> Result<Value, SourceError> {
        match self {
            Self::Json => Ok(serde_json::from_str(data)?),
            Self::Toml => {
                let document = data.parse::<DocumentMut>()?;
                Ok(toml_table(&document))
            }
        }
    }
}

/// Numbers and datetimes become their literal token so `1.50` stays `1.50`.
fn toml_table(table: &Table) -> Value {
    Value::Object(
        table
            .iter()
            .filter_map(|(name, item)| toml_item(item).map(|value| (name.to_owned(), value)))
            .collect::<Map<_, _>>(),
    )
}

fn toml_item(item: &Item) -> Option<Value> {
    match item {
        Item::None => None,
        Item::Value(value) => Some(toml_value(value)),
        Item::Table(table) => Some(toml_table(table)),
        Item::ArrayOfTables(tables) => Some(Value::Array(tables.iter().map(toml_table).collect())),
    }
}

fn toml_value(value: &TomlValue) -> Value {
    match value {
        TomlValue::String(text) => Value::String(text.value().clone()),
        TomlValue::Integer(number) => Value::String(number.display_repr().into_owned()),
        TomlValue::Float(number) => Value::String(number.display_repr().into_owned()),
        TomlValue::Boolean(flag) => Value::Bool(*flag.value()),
        TomlValue::Datetime(when) => Value::String(when.display_repr().into_owned()),
        TomlValue::Array(items) => Value::Array(items.iter().map(toml_value).collect()),
        TomlValue::InlineTable(table) => Value::Object(
            table
                .iter()
                .map(|(name, nested)| (name.to_owned(), toml_value(nested)))
                .collect(),
        ),
    }
}

/// Provider holding the flattened contents of one file.
#[derive(Debug)]
pub struct FileProvider {
    kind: ProviderKind,
    path: Utf8PathBuf,
    store: KeyValueStore,
}

impl FileProvider {
    /// Load a settings file, choosing the parser from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] when the file cannot be read (including
    /// when it does not exist), [`SourceError::Json`] or
    /// [`SourceError::Toml`] when the contents do not parse and
    /// [`SourceError::Malformed`] when they cannot be flattened.
    pub fn load(path: &Utf8Path) -> Result<Self, SourceError> {
        let format = FileFormat::detect(path)?;
        Self::load_as(format.kind(), format, path)
    }

    /// Load a user secrets document. Secrets are always JSON.
    ///
    /// # Errors
    ///
    /// Fails in the same situations as [`FileProvider::load`].
    pub fn load_user_secrets(path: &Utf8Path) -> Result<Self, SourceError> {
        Self::load_as(ProviderKind::UserSecrets, FileFormat::Json, path)
    }

    fn load_as(kind: ProviderKind, format: FileFormat, path: &Utf8Path) -> Result<Self, SourceError> {
        let data = fs::read_to_string(path)?;
        let document = format.parse(&data)?;
        let store = KeyValueStore::from_document(&document)?;
        tracing::debug!(%path, %kind, keys = store.len(), "loaded settings file");
        Ok(Self {
            kind,
            path: path.to_owned(),
            store,
        })
    }

    /// Path the provider was loaded from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl Provider for FileProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn try_get(&self, key: &KeyPath) -> Option<&str> {
        self.store.get(key)
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &KeyPath> + '_> {
        Box::new(self.store.keys())
    }
}

#[cfg(test)]
#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest injects fixtures by value"
)]
mod tests {
    use super::{FileFormat, FileProvider};
    use crate::provider::{Provider, ProviderKind};
    use crate::{KeyPath, SourceError};
    use camino::{Utf8Path, Utf8PathBuf};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Workspace {
        _dir: TempDir,
        root: Utf8PathBuf,
    }

    impl Workspace {
        fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
            let path = self.root.join(name);
            std::fs::write(&path, contents).expect("write fixture");
            path
        }
    }

    #[fixture]
    fn workspace() -> Workspace {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        Workspace { _dir: dir, root }
    }

    fn key(raw: &str) -> KeyPath {
        KeyPath::parse(raw).expect("valid key")
    }

    #[rstest]
    #[case("appsettings.json", FileFormat::Json)]
    #[case("APPSETTINGS.JSON", FileFormat::Json)]
    #[case("settings.toml", FileFormat::Toml)]
    fn detects_formats(#[case] name: &str, #[case] expected: FileFormat) {
        assert_eq!(FileFormat::detect(Utf8Path::new(name)).expect("format"), expected);
    }

    #[rstest]
    #[case("settings.yaml")]
    #[case("settings")]
    fn rejects_unknown_formats(#[case] name: &str) {
        assert!(FileFormat::detect(Utf8Path::new(name)).is_err());
    }

    #[rstest]
    fn loads_json_settings(workspace: Workspace) {
        let path = workspace.write(
            "appsettings.json",
            r#"{"Db": {"ConnectionString": "fileval"}, "Retries": 3}"#,
        );
        let provider = FileProvider::load(&path).expect("load json");
        assert_eq!(provider.kind(), ProviderKind::JsonFile);
        assert_eq!(provider.try_get(&key("Db:ConnectionString")), Some("fileval"));
        assert_eq!(provider.try_get(&key("Retries")), Some("3"));
        assert_eq!(provider.try_get(&key("Db:Missing")), None);
        assert_eq!(provider.path(), path);
    }

    #[rstest]
    fn loads_toml_settings(workspace: Workspace) {
        let path = workspace.write(
            "appsettings.toml",
            "[Db]\nConnectionString = \"tomlval\"\n",
        );
        let provider = FileProvider::load(&path).expect("load toml");
        assert_eq!(provider.kind(), ProviderKind::TomlFile);
        assert_eq!(provider.try_get(&key("Db:ConnectionString")), Some("tomlval"));
    }

    #[rstest]
    fn user_secrets_report_their_own_kind(workspace: Workspace) {
        let path = workspace.write("secrets.json", r#"{"ApiIntegration:ApiKey": "s3cret"}"#);
        let provider = FileProvider::load_user_secrets(&path).expect("load secrets");
        assert_eq!(provider.kind(), ProviderKind::UserSecrets);
        assert_eq!(provider.try_get(&key("ApiIntegration:ApiKey")), Some("s3cret"));
    }

    #[rstest]
    fn missing_files_are_not_found_errors(workspace: Workspace) {
        let err = FileProvider::load(&workspace.root.join("absent.json")).expect_err("missing");
        assert!(err.is_not_found(), "{err}");
    }

    #[rstest]
    #[case("broken.json", "{ not json")]
    #[case("broken.toml", "[Db\nName = ")]
    fn malformed_files_are_parse_errors(
        workspace: Workspace,
        #[case] name: &str,
        #[case] contents: &str,
    ) {
        let path = workspace.write(name, contents);
        let err = FileProvider::load(&path).expect_err("malformed");
        assert!(
            matches!(err, SourceError::Json(_) | SourceError::Toml(_)),
            "{err}"
        );
        assert!(!err.is_not_found());
    }

    #[rstest]
    #[case("Price", "1.50")]
    #[case("Big", "1e2")]
    #[case("Huge", "12345678901234567890123")]
    #[case("Negative", "-0.0")]
    #[case("Nothing", "")]
    fn json_numbers_keep_their_literal_text(
        workspace: Workspace,
        #[case] name: &str,
        #[case] expected: &str,
    ) {
        let path = workspace.write(
            "appsettings.json",
            r#"{"Price": 1.50, "Big": 1e2, "Huge": 12345678901234567890123,
                "Negative": -0.0, "Nothing": null}"#,
        );
        let provider = FileProvider::load(&path).expect("load json");
        assert_eq!(provider.try_get(&key(name)), Some(expected));
    }

    #[rstest]
    #[case("Price", "1.50")]
    #[case("Big", "1e2")]
    #[case("Port", "0x1F90")]
    #[case("Limit", "1_000")]
    #[case("Enabled", "true")]
    #[case("Release:When", "1979-05-27T07:32:00Z")]
    #[case("Release:Day", "1979-05-27")]
    #[case("Hosts:1", "b")]
    #[case("Replicas:0:Host", "r1")]
    #[case("Inline:Timeout", "2.5")]
    fn toml_scalars_keep_their_literal_text(
        workspace: Workspace,
        #[case] name: &str,
        #[case] expected: &str,
    ) {
        let path = workspace.write(
            "appsettings.toml",
            concat!(
                "Price = 1.50\n",
                "Big = 1e2\n",
                "Port = 0x1F90\n",
                "Limit = 1_000\n",
                "Enabled = true\n",
                "Hosts = [\"a\", \"b\"]\n",
                "Inline = { Timeout = 2.5 }\n",
                "[Release]\n",
                "When = 1979-05-27T07:32:00Z\n",
                "Day = 1979-05-27\n",
                "[[Replicas]]\n",
                "Host = \"r1\"\n",
            ),
        );
        let provider = FileProvider::load(&path).expect("load toml");
        assert_eq!(provider.try_get(&key(name)), Some(expected));
    }

    #[rstest]
    fn toml_datetimes_are_plain_keys(workspace: Workspace) {
        let path = workspace.write("appsettings.toml", "When = 1979-05-27T07:32:00Z\n");
        let provider = FileProvider::load(&path).expect("load toml");
        let keys: Vec<String> = provider.keys().map(ToString::to_string).collect();
        assert_eq!(keys, ["When"]);
    }
}
