//! Loading publish configuration from disk

use assert_fs::TempDir;
use assert_fs::prelude::*;
use mirror_publish::{Error, PublishConfig};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn expected() -> PublishConfig {
    PublishConfig {
        destination_url: Some("git@example.com:org/dist.git".into()),
        repository_url: Some("git@example.com:org/app.git".into()),
        exclude: vec!["*.map".into(), "/internal/".into()],
    }
}

#[rstest]
#[case(
    "git-mirror.toml",
    "destination_url = \"git@example.com:org/dist.git\"\nrepository_url = \"git@example.com:org/app.git\"\nexclude = [\"*.map\", \"/internal/\"]\n"
)]
#[case(
    "git-mirror.json",
    r#"{"destination_url": "git@example.com:org/dist.git", "repository_url": "git@example.com:org/app.git", "exclude": ["*.map", "/internal/"]}"#
)]
#[case(
    "git-mirror.yaml",
    "destination_url: git@example.com:org/dist.git\nrepository_url: git@example.com:org/app.git\nexclude:\n  - \"*.map\"\n  - /internal/\n"
)]
fn test_load_each_format(#[case] name: &str, #[case] content: &str) {
    let temp = TempDir::new().unwrap();
    let file = temp.child(name);
    file.write_str(content).unwrap();

    assert_eq!(PublishConfig::load(file.path()).unwrap(), expected());
}

#[test]
fn test_missing_fields_default() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("git-mirror.toml");
    file.write_str("destination_url = \"/srv/dist.git\"\n").unwrap();

    let config = PublishConfig::load(file.path()).unwrap();

    assert_eq!(config.destination_url.as_deref(), Some("/srv/dist.git"));
    assert!(config.repository_url.is_none());
    assert!(config.exclude.is_empty());
}

#[test]
fn test_unknown_extension_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("git-mirror.ini");
    file.write_str("destination_url=x").unwrap();

    let err = PublishConfig::load(file.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::Fs(mirror_fs::Error::UnsupportedFormat { .. })
    ));
}
