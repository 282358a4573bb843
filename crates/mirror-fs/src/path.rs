//! Relative, forward-slash path handling for tree comparison

use std::path::{Component, Path, PathBuf};

/// A path relative to a tree root, normalized to forward slashes.
///
/// The internal form never has a leading `./`, a leading `/` or a trailing
/// slash, so two entries describing the same location compare equal no matter
/// which side of a comparison produced them. The tree root itself is the
/// empty path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Backslashes become forward slashes; empty and `.` segments are dropped.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy().replace('\\', "/");
        let inner = path_str
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect::<Vec<_>>()
            .join("/");
        Self { inner }
    }

    /// The empty path, naming a tree root.
    pub fn root() -> Self {
        Self {
            inner: String::new(),
        }
    }

    /// Build the relative path of `path` below `root`.
    ///
    /// Returns `None` when `path` is not inside `root`.
    pub fn relative_to(path: &Path, root: &Path) -> Option<Self> {
        let stripped = path.strip_prefix(root).ok()?;
        let mut segments = Vec::new();
        for component in stripped.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(Self {
            inner: segments.join("/"),
        })
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// True for the tree root.
    pub fn is_root(&self) -> bool {
        self.inner.is_empty()
    }

    /// Resolve this relative path below `root` as a platform-native path.
    pub fn to_native(&self, root: &Path) -> PathBuf {
        let mut native = root.to_path_buf();
        for segment in self.segments() {
            native.push(segment);
        }
        native
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment = Self::new(segment);
        if self.inner.is_empty() {
            return segment;
        }
        if segment.inner.is_empty() {
            return self.clone();
        }
        Self {
            inner: format!("{}/{}", self.inner, segment.inner),
        }
    }

    /// Get the parent directory. The parent of a top-level entry is the root.
    pub fn parent(&self) -> Option<Self> {
        if self.inner.is_empty() {
            return None;
        }
        match self.inner.rfind('/') {
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => Some(Self::root()),
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Iterate over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|segment| !segment.is_empty())
    }

    /// Every proper ancestor, shallowest first, excluding the root.
    ///
    /// `a/b/c.txt` yields `a` then `a/b`.
    pub fn ancestors(&self) -> Vec<Self> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(path) = current {
            if path.is_root() {
                break;
            }
            current = path.parent();
            ancestors.push(path);
        }
        ancestors.reverse();
        ancestors
    }

    /// Whether `self` equals `other` or lies beneath it.
    pub fn starts_with(&self, other: &NormalizedPath) -> bool {
        if other.inner.is_empty() || self.inner == other.inner {
            return true;
        }
        self.inner
            .strip_prefix(other.inner.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.inner.is_empty() {
            return write!(f, ".");
        }
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

impl serde::Serialize for NormalizedPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}
