//! [`TestTree`] builder for directory fixtures.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tempfile::TempDir;
use walkdir::WalkDir;

/// A temporary directory with helpers to lay out and inspect files.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::tree::TestTree;
///
/// let tree = TestTree::new();
/// tree.write("dir/nested.txt", "hello");
/// tree.assert_file_contains("dir/nested.txt", "hello");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a temporary directory initialised as a git working copy.
    pub fn with_git() -> (Self, git2::Repository) {
        let tree = Self::new();
        let repo = crate::git::init_work_repo(tree.root());
        (tree, repo)
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `path` (relative to root), creating parents.
    pub fn write(&self, path: &str, content: &str) -> &Self {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        self
    }

    /// Create the directory `path` (relative to root) and its parents.
    pub fn mkdir(&self, path: &str) -> &Self {
        fs::create_dir_all(self.root().join(path)).unwrap();
        self
    }

    /// Read the file at `path` (relative to root).
    pub fn read(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }

    /// Assert that `path` (relative to root) exists.
    pub fn assert_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(full_path.exists(), "Expected path to exist: {}", full_path.display());
    }

    /// Assert that `path` (relative to root) does **not** exist.
    pub fn assert_missing(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(!full_path.exists(), "Expected path NOT to exist: {}", full_path.display());
    }
}

/// Snapshot a tree as `relative path -> Some(content)` for files and `None`
/// for directories, skipping `.git`.
pub fn snapshot(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .map(|e| e.unwrap())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            let content = e.file_type().is_file().then(|| fs::read(e.path()).unwrap());
            (rel, content)
        })
        .collect()
}

/// Paths whose presence, kind or content differs between two trees,
/// ignoring `.git` directories. Empty when the trees are identical.
pub fn tree_differences(a: &Path, b: &Path) -> Vec<String> {
    let left = snapshot(a);
    let right = snapshot(b);
    let mut differences: Vec<String> = left
        .iter()
        .filter(|(path, content)| right.get(*path) != Some(*content))
        .map(|(path, _)| path.clone())
        .collect();
    differences.extend(right.keys().filter(|p| !left.contains_key(*p)).cloned());
    differences.sort();
    differences
}
