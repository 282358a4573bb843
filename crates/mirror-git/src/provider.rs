//! The index primitives the reconciler depends on

use crate::Result;
use mirror_fs::NormalizedPath;

/// The three capabilities the reconciler needs from a version-controlled
/// destination.
///
/// Paths are relative to the working copy root. Implementations own the
/// consistency of their index; callers never cache index state.
pub trait VersionControl {
    /// Stage the current content of `path` (`git add`).
    fn stage(&self, path: &NormalizedPath) -> Result<()>;

    /// Remove `path` from both the index and the working tree (`git rm`).
    ///
    /// Parent directories left empty by the removal are pruned.
    fn remove(&self, path: &NormalizedPath) -> Result<()>;

    /// Whether the working copy's own ignore rules exclude `path`
    /// (`git check-ignore`). Paths already tracked in the index are never
    /// reported as ignored.
    fn is_ignored(&self, path: &NormalizedPath) -> Result<bool>;
}
