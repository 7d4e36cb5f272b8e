//! Shared filesystem helpers for reading source files through `cap-std`.

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};

/// Return the parent directory of `path`, falling back to `"."` when the path
/// has no parent or the parent is empty.
pub(crate) fn parent_or_dot(path: &Utf8Path) -> &Utf8Path {
    path.parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."))
}

/// Open the parent directory of `path` and extract the file name.
///
/// # Errors
///
/// Returns an [`std::io::Error`] if the file name cannot be determined or the
/// parent directory cannot be opened.
pub(crate) fn open_parent_dir_and_name(path: &Utf8Path) -> std::io::Result<(Dir, String)> {
    let parent = parent_or_dot(path);
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::other("cannot determine file name for source path"))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name.to_owned()))
}

/// Read `path` into a string.
///
/// # Errors
///
/// Returns an [`std::io::Error`] when the parent directory cannot be opened
/// or the file cannot be read. Missing files surface as
/// [`std::io::ErrorKind::NotFound`].
pub(crate) fn read_to_string(path: &Utf8Path) -> std::io::Result<String> {
    let (dir, name) = open_parent_dir_and_name(path)?;
    dir.read_to_string(name)
}

#[cfg(test)]
mod tests {
    use super::{parent_or_dot, read_to_string};
    use camino::{Utf8Path, Utf8PathBuf};

    #[test]
    fn bare_file_names_resolve_against_cwd() {
        assert_eq!(parent_or_dot(Utf8Path::new("appsettings.json")), ".");
        assert_eq!(parent_or_dot(Utf8Path::new("conf/app.json")), "conf");
    }

    #[test]
    fn reads_existing_files_and_reports_missing_ones() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        let path = root.join("present.json");
        std::fs::write(&path, "{}").expect("write fixture");

        assert_eq!(read_to_string(&path).expect("read fixture"), "{}");

        let missing = root.join("absent.json");
        let err = read_to_string(&missing).expect_err("missing file");
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        let dir_err = read_to_string(&root.join("no-such-dir/app.json")).expect_err("missing dir");
        assert_eq!(dir_err.kind(), std::io::ErrorKind::NotFound);
    }
}
