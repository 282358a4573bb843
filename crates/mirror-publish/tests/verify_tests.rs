//! Precondition checks

use mirror_publish::{Error, PublishConfig, verify_conditions};
use mirror_test_utils::git::{bare_remote, url_for};
use tempfile::TempDir;

#[test]
fn test_missing_destination() {
    let err = verify_conditions(&PublishConfig::default()).unwrap_err();
    assert!(matches!(err, Error::MissingDestination));
    assert_eq!(err.to_string(), "Plugin configuration missing 'destination_url'");
}

#[test]
fn test_destination_must_differ_from_repository() {
    let config = PublishConfig {
        destination_url: Some("git@example.com:org/app.git".into()),
        repository_url: Some("git@example.com:org/app.git".into()),
        exclude: vec![],
    };
    let err = verify_conditions(&config).unwrap_err();
    assert!(matches!(err, Error::SameRepository { .. }));
}

#[test]
fn test_invalid_exclude_pattern() {
    let config = PublishConfig {
        destination_url: Some("/does/not/matter.git".into()),
        repository_url: None,
        exclude: vec!["[oops".into()],
    };
    let err = verify_conditions(&config).unwrap_err();
    assert!(matches!(
        err,
        Error::Sync(mirror_sync::SyncError::InvalidPattern { .. })
    ));
}

#[test]
fn test_unreachable_destination() {
    let temp = TempDir::new().unwrap();
    let url = url_for(&temp.path().join("missing.git"));
    let config = PublishConfig {
        destination_url: Some(url.clone()),
        ..Default::default()
    };

    let err = verify_conditions(&config).unwrap_err();

    match err {
        Error::Unreachable { url: reported, .. } => assert_eq!(reported, url),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_reachable_destination_passes() {
    let temp = TempDir::new().unwrap();
    let remote = bare_remote(temp.path(), &[("README.md", "# dist")]);
    let config = PublishConfig {
        destination_url: Some(url_for(&remote)),
        repository_url: Some("git@example.com:org/app.git".into()),
        exclude: vec!["*.map".into()],
    };

    verify_conditions(&config).unwrap();
}
