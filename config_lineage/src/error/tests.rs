//! Unit tests for error construction and rendering.

use rstest::rstest;

use super::{LineageError, SourceError};
use crate::provider::{FetchError, ProviderKind};

#[test]
fn source_load_names_kind_and_origin() {
    let err = LineageError::source_load(
        ProviderKind::RemoteParameterStore,
        "/shop/prod",
        FetchError::transient("connection reset"),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("RemoteParameterStore"), "{rendered}");
    assert!(rendered.contains("/shop/prod"), "{rendered}");
    assert!(rendered.contains("connection reset"), "{rendered}");
    assert_eq!(err.failed_kind(), Some(ProviderKind::RemoteParameterStore));
}

#[test]
fn non_source_errors_have_no_failed_kind() {
    let err = LineageError::missing_setting("APP_STAGE", "parameter store path");
    assert_eq!(err.failed_kind(), None);
    assert!(err.to_string().contains("APP_STAGE"));
}

#[rstest]
#[case(std::io::ErrorKind::NotFound, true)]
#[case(std::io::ErrorKind::PermissionDenied, false)]
fn classifies_missing_files(#[case] kind: std::io::ErrorKind, #[case] expected: bool) {
    let err = SourceError::from(std::io::Error::new(kind, "boom"));
    assert_eq!(err.is_not_found(), expected);
}

#[test]
fn parser_errors_keep_their_format() {
    let json = serde_json::from_str::<serde_json::Value>("{ nope").expect_err("bad json");
    assert!(matches!(SourceError::from(json), SourceError::Json(_)));
    let toml = "= 1".parse::<toml_edit::DocumentMut>().expect_err("bad toml");
    let err = SourceError::from(toml);
    assert!(matches!(err, SourceError::Toml(_)));
    assert!(err.to_string().starts_with("invalid TOML"), "{err}");
    assert!(!SourceError::malformed("dup").is_not_found());
}
