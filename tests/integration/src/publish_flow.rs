//! End-to-end publishing flows
//!
//! Each test publishes into a local bare repository, then inspects what a
//! fresh clone of that repository would see.

use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository;
use mirror_fs::NormalizedPath;
use mirror_git::GitRepository;
use mirror_publish::{NextRelease, PublishConfig, publish, verify_conditions};
use mirror_sync::build_exclusion_predicate;
use mirror_test_utils::git::{bare_remote, url_for};
use mirror_test_utils::tree::{TestTree, tree_differences};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn config(remote: &Path, exclude: &[&str]) -> PublishConfig {
    PublishConfig {
        destination_url: Some(url_for(remote)),
        repository_url: Some("git@example.com:org/app.git".into()),
        exclude: exclude.iter().map(|s| s.to_string()).collect(),
    }
}

fn fresh_clone(remote: &Path, into: &Path) -> PathBuf {
    GitRepository::clone_from(&url_for(remote), into).unwrap();
    into.to_path_buf()
}

fn tagged_messages(remote: &Path) -> Vec<(String, String)> {
    let repo = Repository::open(remote).unwrap();
    let mut tags: Vec<(String, String)> = repo
        .tag_names(None)
        .unwrap()
        .iter()
        .flatten()
        .map(|name| {
            let commit = repo
                .find_reference(&format!("refs/tags/{name}"))
                .unwrap()
                .peel_to_commit()
                .unwrap();
            (name.to_string(), commit.summary().unwrap_or_default().to_string())
        })
        .collect();
    tags.sort();
    tags
}

#[test]
fn test_successive_releases_track_source() {
    let temp = TempDir::new().unwrap();
    let remote = bare_remote(temp.path(), &[("LICENSE", "MIT")]);
    let cfg = config(&remote, &["*.map"]);
    verify_conditions(&cfg).unwrap();

    let source = TestTree::new();
    source
        .write("index.js", "v1")
        .write("index.js.map", "{}")
        .write("lib/util.js", "util");
    let first = publish(&cfg, source.root(), &NextRelease::new("1.0.0", "").unwrap()).unwrap();
    assert_eq!(first.sync.removed, vec![NormalizedPath::new("LICENSE")]);

    fs::remove_file(source.root().join("lib/util.js")).unwrap();
    source.write("index.js", "v2").write("lib/extra.js", "extra");
    let second = publish(&cfg, source.root(), &NextRelease::new("1.1.0", "Second").unwrap()).unwrap();

    assert_eq!(second.sync.removed, vec![NormalizedPath::new("lib/util.js")]);
    assert_eq!(second.sync.updated, vec![NormalizedPath::new("index.js")]);
    assert_eq!(
        tagged_messages(&remote),
        vec![
            ("v1.0.0".to_string(), "Publishing version 1.0.0".to_string()),
            ("v1.1.0".to_string(), "Publishing version 1.1.0".to_string()),
        ]
    );

    let clone_dir = temp.path().join("check");
    let clone = fresh_clone(&remote, &clone_dir);
    let predicate = build_exclusion_predicate(source.root(), &clone, &["*.map"]).unwrap();
    let remaining: Vec<String> = tree_differences(source.root(), &clone)
        .into_iter()
        .filter(|path| !predicate.is_excluded(path))
        .collect();
    assert!(remaining.is_empty(), "differences: {remaining:?}");
}

#[test]
fn test_destination_ignore_rules_protect_destination_files() {
    let temp = TempDir::new().unwrap();
    let remote = bare_remote(
        temp.path(),
        &[(".gitignore", "*.secret\n"), ("app.txt", "old")],
    );
    let source = TestTree::new();
    source
        .write(".gitignore", "*.secret\n")
        .write("app.txt", "new")
        .write("token.secret", "do not publish");

    let report = publish(
        &config(&remote, &[]),
        source.root(),
        &NextRelease::new("0.1.0", "").unwrap(),
    )
    .unwrap();

    assert_eq!(report.sync.updated, vec![NormalizedPath::new("app.txt")]);
    assert!(report.sync.created.is_empty());

    let clone = fresh_clone(&remote, &temp.path().join("check"));
    assert_eq!(fs::read_to_string(clone.join("app.txt")).unwrap(), "new");
    assert!(!clone.join("token.secret").exists());
}

#[test]
fn test_publish_from_config_file() {
    let temp = TempDir::new().unwrap();
    let remote = bare_remote(temp.path(), &[("README.md", "# dist")]);
    let config_path = temp.path().join("git-mirror.yaml");
    fs::write(
        &config_path,
        format!(
            "destination_url: {}\nexclude:\n  - /internal/\n",
            url_for(&remote)
        ),
    )
    .unwrap();
    let source = TestTree::new();
    source
        .write("README.md", "# dist")
        .write("internal/notes.md", "private")
        .write("public/notes.md", "public");

    let cfg = PublishConfig::load(&config_path).unwrap();
    verify_conditions(&cfg).unwrap();
    let report = publish(&cfg, source.root(), &NextRelease::new("2.0.0", "").unwrap()).unwrap();

    assert_eq!(report.sync.created, vec![NormalizedPath::new("public/notes.md")]);
    let clone = fresh_clone(&remote, &temp.path().join("check"));
    assert!(clone.join("public/notes.md").exists());
    assert!(!clone.join("internal").exists());
}
