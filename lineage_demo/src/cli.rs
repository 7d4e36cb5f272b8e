//! Command-line surface of the `config-lineage` binary.

use camino::Utf8PathBuf;
use clap::Parser;
use config_lineage::{KeyPath, KeyPathError, ResolverSettings};

/// Keys reported when no `--key` is given.
pub const DEFAULT_KEYS: [&str; 2] = ["Db:ConnectionString", "ApiIntegration:ApiKey"];

/// Show the effective value of configuration keys and which source supplied
/// each one.
///
/// Arguments after `--` feed the command-line provider, for example
/// `config-lineage -- --Db:ConnectionString=clival`.
#[derive(Debug, Parser)]
#[command(name = "config-lineage", version)]
pub struct Cli {
    /// Directory holding the settings files.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<Utf8PathBuf>,
    /// Dotenv file to merge, relative to the settings directory.
    #[arg(long, value_name = "FILE")]
    pub dotenv: Option<Utf8PathBuf>,
    /// Key to report; may be repeated.
    #[arg(long = "key", value_name = "KEY")]
    pub keys: Vec<String>,
    /// Identity selecting the user secrets document.
    #[arg(long, value_name = "ID")]
    pub user_secrets_id: Option<String>,
    /// Directory of `<region>.json` files served as the remote parameter
    /// store.
    #[arg(long, value_name = "DIR")]
    pub parameter_store_dir: Option<Utf8PathBuf>,
    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
    /// Arguments for the command-line provider.
    #[arg(last = true, value_name = "ARGS")]
    pub overrides: Vec<String>,
}

impl Cli {
    /// Overlay the flags that were given onto `settings`.
    pub fn apply_to(&self, settings: &mut ResolverSettings) {
        if let Some(dir) = &self.dir {
            settings.settings_dir.clone_from(dir);
        }
        if let Some(dotenv) = &self.dotenv {
            settings.dotenv_file.clone_from(dotenv);
        }
        if let Some(id) = &self.user_secrets_id {
            settings.user_secrets_id = Some(id.clone());
        }
    }

    /// Keys to report, falling back to [`DEFAULT_KEYS`].
    ///
    /// # Errors
    ///
    /// Returns [`KeyPathError`] for the first key that fails to parse.
    pub fn key_paths(&self) -> Result<Vec<KeyPath>, KeyPathError> {
        if self.keys.is_empty() {
            DEFAULT_KEYS.iter().map(|raw| KeyPath::parse(raw)).collect()
        } else {
            self.keys.iter().map(|raw| KeyPath::parse(raw)).collect()
        }
    }
}
