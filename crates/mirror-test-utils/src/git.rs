//! Git fixtures built with `git2` only, so tests do not depend on a `git`
//! binary or on the user's global configuration.

use std::path::{Path, PathBuf};

use git2::{IndexAddOption, Repository, Signature};

const TEST_NAME: &str = "Test User";
const TEST_EMAIL: &str = "test@test.com";

/// Initialise a working copy with a local identity configured.
///
/// # Panics
/// Panics if any git operation fails.
pub fn init_work_repo(path: &Path) -> Repository {
    let repo = Repository::init(path)
        .unwrap_or_else(|e| panic!("init_work_repo: init at {} failed: {e}", path.display()));
    configure_identity(&repo);
    repo
}

fn configure_identity(repo: &Repository) {
    let mut config = repo
        .config()
        .unwrap_or_else(|e| panic!("configure_identity: no config: {e}"));
    config.set_str("user.name", TEST_NAME).unwrap();
    config.set_str("user.email", TEST_EMAIL).unwrap();
    config.set_bool("commit.gpgsign", false).unwrap();
}

/// Stage everything (`git add --all`) and commit it on top of HEAD.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"], IndexAddOption::DEFAULT, None)
        .unwrap();
    index.update_all(["*"], None).unwrap();
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let signature = Signature::now(TEST_NAME, TEST_EMAIL).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap_or_else(|e| panic!("commit_all: commit failed: {e}"))
}

/// Create a bare repository at `dir/remote.git` seeded with one commit
/// containing `files`, and return its path.
///
/// An empty `files` slice leaves the remote without any commit.
///
/// # Panics
/// Panics if any git operation fails.
pub fn bare_remote(dir: &Path, files: &[(&str, &str)]) -> PathBuf {
    let bare_path = dir.join("remote.git");
    Repository::init_bare(&bare_path)
        .unwrap_or_else(|e| panic!("bare_remote: init_bare failed: {e}"));

    if files.is_empty() {
        return bare_path;
    }

    let seed_path = dir.join("seed");
    let seed = Repository::clone(&url_for(&bare_path), &seed_path)
        .unwrap_or_else(|e| panic!("bare_remote: clone failed: {e}"));
    configure_identity(&seed);

    for (path, content) in files {
        let full = seed_path.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full, content).unwrap();
    }
    commit_all(&seed, "seed");

    let head = seed.head().unwrap();
    let refname = head.name().unwrap().to_string();
    seed.find_remote("origin")
        .unwrap()
        .push(&[format!("{refname}:{refname}")], None)
        .unwrap_or_else(|e| panic!("bare_remote: push failed: {e}"));

    bare_path
}

/// URL form of a local repository path accepted by libgit2.
pub fn url_for(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Read the blob stored for `file` in the tip commit of `branch_ref`.
///
/// Returns `None` when the file is not in that commit.
pub fn file_at_ref(repo_path: &Path, refname: &str, file: &str) -> Option<String> {
    let repo = Repository::open(repo_path).unwrap();
    let commit = repo.find_reference(refname).ok()?.peel_to_commit().ok()?;
    let entry = commit.tree().ok()?.get_path(Path::new(file)).ok()?;
    let blob = repo.find_blob(entry.id()).ok()?;
    Some(String::from_utf8_lossy(blob.content()).into_owned())
}
