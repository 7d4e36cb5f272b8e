//! Injected view of the process environment.
//!
//! The resolver never reads `std::env` directly. Callers capture a snapshot,
//! optionally fill gaps from a dotenv file, and hand the snapshot to the
//! resolver, which keeps chain construction testable without mutating the
//! real process environment.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use camino::Utf8Path;

use crate::{LineageError, LineageResult};

/// What happened when a dotenv file was merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DotenvOutcome {
    /// No file exists at the given path; the snapshot is unchanged.
    Missing,
    /// The file was read.
    Merged {
        /// Variables newly added from the file.
        added: usize,
        /// Variables in the file that were already set and left untouched.
        retained: usize,
    },
}

/// Owned copy of environment variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvironmentSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vars: BTreeMap::new(),
        }
    }

    /// Capture the current process environment. Variables whose name or
    /// value is not valid Unicode are skipped.
    #[must_use]
    pub fn capture() -> Self {
        let mut vars = BTreeMap::new();
        for (name, value) in std::env::vars_os() {
            match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => {
                    vars.insert(name, value);
                }
                (name, _) => {
                    tracing::debug!(?name, "skipping non-Unicode environment variable");
                }
            }
        }
        Self { vars }
    }

    /// Return a copy with `name` set to `value`, replacing any prior value.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Value of `name`, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Value of `name` with surrounding whitespace removed, or `None` when
    /// unset or blank.
    #[must_use]
    pub fn non_blank(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|value| !value.is_empty())
    }

    /// Iterate over variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the snapshot holds no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Add each pair whose name is not already set. Existing variables always
    /// win. Returns `(added, retained)` counts.
    pub fn fill_missing<I, K, V>(&mut self, pairs: I) -> (usize, usize)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut added = 0;
        let mut retained = 0;
        for (name, value) in pairs {
            match self.vars.entry(name.into()) {
                Entry::Occupied(_) => retained += 1,
                Entry::Vacant(slot) => {
                    slot.insert(value.into());
                    added += 1;
                }
            }
        }
        (added, retained)
    }

    /// Merge a dotenv file into the snapshot without overriding variables
    /// that are already set.
    ///
    /// Merging the same file twice leaves the snapshot as it was after the
    /// first merge. A missing file is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Dotenv`] when the file exists but cannot be
    /// read or contains a malformed line.
    pub fn merge_dotenv(&mut self, path: &Utf8Path) -> LineageResult<DotenvOutcome> {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(err) if err.not_found() => {
                tracing::debug!(%path, "no dotenv file to merge");
                return Ok(DotenvOutcome::Missing);
            }
            Err(source) => return Err(dotenv_error(path, source)),
        };
        let pairs = iter
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| dotenv_error(path, source))?;
        let (added, retained) = self.fill_missing(pairs);
        tracing::debug!(%path, added, retained, "merged dotenv file");
        Ok(DotenvOutcome::Merged { added, retained })
    }
}

fn dotenv_error(path: &Utf8Path, source: dotenvy::Error) -> LineageError {
    LineageError::Dotenv {
        path: path.to_owned(),
        source,
    }
}

impl<K, V> FromIterator<(K, V)> for EnvironmentSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest injects fixtures by value"
)]
mod tests {
    use super::{DotenvOutcome, EnvironmentSnapshot};
    use crate::LineageError;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct DotenvDir {
        _dir: TempDir,
        path: Utf8PathBuf,
    }

    #[fixture]
    fn dotenv_dir() -> DotenvDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        DotenvDir {
            _dir: dir,
            path: root.join(".env"),
        }
    }

    #[rstest]
    fn missing_dotenv_is_a_no_op(dotenv_dir: DotenvDir) {
        let mut snapshot = EnvironmentSnapshot::new().with_var("KEEP", "1");
        let before = snapshot.clone();
        let outcome = snapshot.merge_dotenv(&dotenv_dir.path).expect("merge");
        assert_eq!(outcome, DotenvOutcome::Missing);
        assert_eq!(snapshot, before);
    }

    #[rstest]
    fn dotenv_fills_gaps_without_overriding(dotenv_dir: DotenvDir) {
        std::fs::write(
            &dotenv_dir.path,
            "ApiIntegration__ApiKey=from-dotenv\nDb__ConnectionString=from-dotenv\n",
        )
        .expect("write dotenv");
        let mut snapshot = EnvironmentSnapshot::new().with_var("Db__ConnectionString", "from-process");

        let outcome = snapshot.merge_dotenv(&dotenv_dir.path).expect("merge");

        assert_eq!(outcome, DotenvOutcome::Merged { added: 1, retained: 1 });
        assert_eq!(snapshot.get("Db__ConnectionString"), Some("from-process"));
        assert_eq!(snapshot.get("ApiIntegration__ApiKey"), Some("from-dotenv"));
    }

    #[rstest]
    fn merging_twice_matches_merging_once(dotenv_dir: DotenvDir) {
        std::fs::write(&dotenv_dir.path, "A=1\nB=2\n").expect("write dotenv");
        let mut once = EnvironmentSnapshot::new().with_var("B", "process");
        once.merge_dotenv(&dotenv_dir.path).expect("first merge");
        let mut twice = once.clone();

        let outcome = twice.merge_dotenv(&dotenv_dir.path).expect("second merge");

        assert_eq!(twice, once);
        assert_eq!(outcome, DotenvOutcome::Merged { added: 0, retained: 2 });
        assert_eq!(twice.get("B"), Some("process"));
    }

    #[rstest]
    fn malformed_dotenv_is_reported(dotenv_dir: DotenvDir) {
        std::fs::write(&dotenv_dir.path, "NOT A VALID LINE\n").expect("write dotenv");
        let mut snapshot = EnvironmentSnapshot::new();
        let err = snapshot.merge_dotenv(&dotenv_dir.path).expect_err("malformed");
        assert!(matches!(err, LineageError::Dotenv { .. }), "{err}");
    }

    #[rstest]
    #[case(Some("  Staging "), Some("Staging"))]
    #[case(Some("   "), None)]
    #[case(None, None)]
    fn non_blank_trims_values(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        let snapshot = raw.map_or_else(EnvironmentSnapshot::new, |value| {
            EnvironmentSnapshot::new().with_var("APP_ENVIRONMENT", value)
        });
        assert_eq!(snapshot.non_blank("APP_ENVIRONMENT"), expected);
    }

    #[test]
    fn capture_sees_process_variables() {
        test_helpers::with_jail(|jail| {
            jail.set_env("CONFIG_LINEAGE_CAPTURE_PROBE", "present");
            let snapshot = EnvironmentSnapshot::capture();
            assert_eq!(snapshot.get("CONFIG_LINEAGE_CAPTURE_PROBE"), Some("present"));
            Ok(())
        })
        .expect("jail");
    }
}
