//! Tests for the git2-backed working copy

use mirror_fs::NormalizedPath;
use mirror_git::{Error, GitRepository, StatusSummary, VersionControl, list_remote};
use mirror_test_utils::git::{bare_remote, commit_all, file_at_ref, url_for};
use mirror_test_utils::tree::TestTree;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

fn working_copy() -> (TestTree, GitRepository) {
    let (tree, _repo) = TestTree::with_git();
    let git = GitRepository::open(tree.root()).unwrap();
    (tree, git)
}

#[test]
fn test_open_non_repository_fails() {
    let temp = TempDir::new().unwrap();
    let result = GitRepository::open(temp.path());
    assert!(matches!(result, Err(Error::NotAWorkingCopy { .. })));
}

#[test]
fn test_stage_new_file_shows_as_created() {
    let (tree, git) = working_copy();
    tree.write("a.txt", "hello");

    git.stage(&NormalizedPath::new("a.txt")).unwrap();

    let status = git.status().unwrap();
    assert_eq!(
        status,
        StatusSummary {
            created: vec!["a.txt".into()],
            staged: vec!["a.txt".into()],
            ..Default::default()
        }
    );
}

#[test]
fn test_remove_deletes_from_index_and_disk() {
    let (tree, repo) = TestTree::with_git();
    tree.write("dir/nested.txt", "content");
    commit_all(&repo, "initial");
    let git = GitRepository::open(tree.root()).unwrap();

    git.remove(&NormalizedPath::new("dir/nested.txt")).unwrap();

    tree.assert_missing("dir/nested.txt");
    tree.assert_missing("dir");
    let status = git.status().unwrap();
    assert_eq!(status.deleted, vec!["dir/nested.txt".to_string()]);
    assert_eq!(status.staged, vec!["dir/nested.txt".to_string()]);
}

#[test]
fn test_remove_keeps_non_empty_parent() {
    let (tree, repo) = TestTree::with_git();
    tree.write("dir/one.txt", "1").write("dir/two.txt", "2");
    commit_all(&repo, "initial");
    let git = GitRepository::open(tree.root()).unwrap();

    git.remove(&NormalizedPath::new("dir/one.txt")).unwrap();

    tree.assert_missing("dir/one.txt");
    tree.assert_exists("dir/two.txt");
}

#[rstest]
#[case("*.log\n", "debug.log", true)]
#[case("*.log\n", "nested/debug.log", true)]
#[case("*.log\n", "main.rs", false)]
#[case("*.log\n!keep.log\n", "keep.log", false)]
#[case("docs/*.md\n", "docs/a.md", true)]
#[case("docs/*.md\n", "docs/deep/a.md", false)]
fn test_is_ignored_follows_gitignore(
    #[case] rules: &str,
    #[case] path: &str,
    #[case] expected: bool,
) {
    let (tree, git) = working_copy();
    tree.write(".gitignore", rules);

    assert_eq!(git.is_ignored(&NormalizedPath::new(path)).unwrap(), expected, "{path}");
}

#[test]
fn test_is_ignored_honors_info_exclude() {
    let (tree, repo) = TestTree::with_git();
    let info = repo.path().join("info");
    fs::create_dir_all(&info).unwrap();
    fs::write(info.join("exclude"), "secret.txt\n").unwrap();
    let git = GitRepository::open(tree.root()).unwrap();

    assert!(git.is_ignored(&NormalizedPath::new("secret.txt")).unwrap());
    assert!(!git.is_ignored(&NormalizedPath::new("public.txt")).unwrap());
}

#[test]
fn test_tracked_file_is_never_reported_ignored() {
    let (tree, repo) = TestTree::with_git();
    tree.write("build.log", "tracked before the rule existed");
    commit_all(&repo, "initial");
    tree.write(".gitignore", "*.log\n");
    let git = GitRepository::open(tree.root()).unwrap();

    assert!(!git.is_ignored(&NormalizedPath::new("build.log")).unwrap());
}

#[test]
fn test_commit_refuses_empty_unless_allowed() {
    let (tree, repo) = TestTree::with_git();
    tree.write("a.txt", "a");
    commit_all(&repo, "initial");
    let git = GitRepository::open(tree.root()).unwrap();

    assert!(matches!(git.commit("nothing", false), Err(Error::NothingToCommit)));
    let oid = git.commit("empty on purpose", true).unwrap();

    let commit = repo.find_commit(oid).unwrap();
    assert_eq!(commit.message(), Some("empty on purpose"));
    assert_eq!(commit.parent_count(), 1);
}

#[test]
fn test_commit_on_unborn_branch() {
    let (tree, git) = working_copy();
    tree.write("a.txt", "a");
    git.stage(&NormalizedPath::new("a.txt")).unwrap();

    let oid = git.commit("first", false).unwrap();

    assert!(git.is_clean().unwrap());
    assert!(!oid.is_zero());
}

#[test]
fn test_add_tag_points_at_head() {
    let (tree, repo) = TestTree::with_git();
    tree.write("a.txt", "a");
    let head = commit_all(&repo, "initial");
    let git = GitRepository::open(tree.root()).unwrap();

    git.add_tag("v1.2.3").unwrap();

    let tagged = repo
        .find_reference("refs/tags/v1.2.3")
        .unwrap()
        .peel_to_commit()
        .unwrap();
    assert_eq!(tagged.id(), head);
}

#[test]
fn test_current_branch_on_fresh_repository() {
    let (_tree, git) = working_copy();
    let branch = git.current_branch().unwrap();
    assert!(!branch.is_empty());
    assert!(!branch.starts_with("refs/"));
}

#[test]
fn test_clone_commit_push_round_trip() {
    let temp = TempDir::new().unwrap();
    let remote = bare_remote(temp.path(), &[("README.md", "# remote")]);
    let clone_path = temp.path().join("clone");

    let git = GitRepository::clone_from(&url_for(&remote), &clone_path).unwrap();
    fs::write(clone_path.join("new.txt"), "pushed").unwrap();
    git.stage(&NormalizedPath::new("new.txt")).unwrap();
    git.commit("add new.txt", false).unwrap();
    git.add_tag("v0.1.0").unwrap();
    git.push().unwrap();
    git.push_tags().unwrap();

    let branch = git.current_branch().unwrap();
    assert_eq!(
        file_at_ref(&remote, &format!("refs/heads/{branch}"), "new.txt").as_deref(),
        Some("pushed")
    );
    assert_eq!(
        file_at_ref(&remote, "refs/tags/v0.1.0", "README.md").as_deref(),
        Some("# remote")
    );
}

#[test]
fn test_push_without_origin_fails() {
    let (tree, repo) = TestTree::with_git();
    tree.write("a.txt", "a");
    commit_all(&repo, "initial");
    let git = GitRepository::open(tree.root()).unwrap();

    let err = git.push().unwrap_err();
    assert!(matches!(err, Error::RemoteNotFound { .. }), "got: {err}");
}

#[test]
fn test_list_remote_reachable_and_unreachable() {
    let temp = TempDir::new().unwrap();
    let remote = bare_remote(temp.path(), &[("README.md", "# remote")]);

    assert!(list_remote(&url_for(&remote)).unwrap() > 0);

    let missing = temp.path().join("does-not-exist.git");
    let err = list_remote(&url_for(&missing)).unwrap_err();
    assert!(matches!(err, Error::Unreachable { .. }), "got: {err}");
}

#[test]
fn test_lock_is_exclusive() {
    let (_tree, git) = working_copy();
    let guard = git.lock().unwrap();
    assert!(matches!(git.lock(), Err(Error::Fs(mirror_fs::Error::LockFailed { .. }))));
    drop(guard);
    assert!(git.lock().is_ok());
}

#[test]
fn test_init_creates_working_copy() {
    let temp = TempDir::new().unwrap();
    let git = GitRepository::init(temp.path()).unwrap();
    assert_eq!(
        git.root().canonicalize().unwrap(),
        temp.path().canonicalize().unwrap()
    );
    assert!(git.is_clean().unwrap());
}
