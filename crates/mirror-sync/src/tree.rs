//! Tree walking and classification

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use mirror_fs::NormalizedPath;
use mirror_fs::checksum::compute_file_checksum;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{Operation, Result, SyncError};
use crate::exclude::ExclusionPredicate;

/// What a path is on disk. Symbolic links are classified by their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// One path found while walking a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: NormalizedPath,
    pub kind: EntryKind,
    /// Byte length for files, zero for directories.
    pub size: u64,
}

/// How a path compares between the source and destination trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffState {
    Equal,
    OnlySource,
    OnlyDest,
    Distinct,
}

impl fmt::Display for DiffState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Equal => "equal",
            Self::OnlySource => "only in source",
            Self::OnlyDest => "only in destination",
            Self::Distinct => "distinct",
        };
        f.write_str(name)
    }
}

/// A path's classified comparison result.
///
/// `OnlySource` carries only `source_kind`, `OnlyDest` only `dest_kind`,
/// `Equal` and `Distinct` carry both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub path: NormalizedPath,
    pub state: DiffState,
    pub source_kind: Option<EntryKind>,
    pub dest_kind: Option<EntryKind>,
}

/// Walk `root`, skipping `.git` and every path `predicate` excludes.
///
/// Excluded directories are pruned, so nothing beneath them is visited.
///
/// # Errors
///
/// Returns [`SyncError::Walk`] when a directory cannot be read, a symbolic
/// link dangles or loops, or metadata cannot be obtained.
pub fn walk_tree(
    root: &Path,
    predicate: &ExclusionPredicate,
) -> Result<BTreeMap<NormalizedPath, TreeEntry>> {
    let mut entries = BTreeMap::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            NormalizedPath::relative_to(entry.path(), root)
                .is_none_or(|rel| !predicate.excludes(&rel, entry.file_type().is_dir()))
        });

    for entry in walker {
        let entry = entry.map_err(|source| SyncError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let Some(path) = NormalizedPath::relative_to(entry.path(), root) else {
            continue;
        };

        let file_type = entry.file_type();
        let (kind, size) = if file_type.is_dir() {
            (EntryKind::Directory, 0)
        } else if file_type.is_file() {
            let metadata = entry.metadata().map_err(|source| SyncError::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            (EntryKind::File, metadata.len())
        } else {
            tracing::debug!(%path, root = %root.display(), "Skipping special file");
            continue;
        };

        entries.insert(path.clone(), TreeEntry { path, kind, size });
    }

    tracing::trace!(root = %root.display(), entries = entries.len(), "Walked tree");
    Ok(entries)
}

/// Classify every non-excluded path of both trees.
///
/// Entries come back in lexical path order, so a directory precedes its
/// contents. `Equal` entries are dropped.
///
/// # Errors
///
/// Returns [`SyncError::Walk`] when either tree cannot be walked and
/// [`SyncError::Filesystem`] when a file cannot be hashed.
pub fn diff_trees(
    source_root: &Path,
    dest_root: &Path,
    predicate: &ExclusionPredicate,
) -> Result<Vec<DiffEntry>> {
    let source = walk_tree(source_root, predicate)?;
    let dest = walk_tree(dest_root, predicate)?;

    let paths: BTreeSet<&NormalizedPath> = source.keys().chain(dest.keys()).collect();
    let mut diff = Vec::new();

    for path in paths {
        let source_entry = source.get(path);
        let dest_entry = dest.get(path);

        let state = match (source_entry, dest_entry) {
            (Some(_), None) => DiffState::OnlySource,
            (None, Some(_)) => DiffState::OnlyDest,
            (Some(s), Some(d)) => compare(s, d, source_root, dest_root)?,
            (None, None) => continue,
        };
        if state == DiffState::Equal {
            continue;
        }

        diff.push(DiffEntry {
            path: path.clone(),
            state,
            source_kind: source_entry.map(|e| e.kind),
            dest_kind: dest_entry.map(|e| e.kind),
        });
    }

    tracing::debug!(
        source_entries = source.len(),
        dest_entries = dest.len(),
        differences = diff.len(),
        "Compared trees"
    );
    Ok(diff)
}

fn compare(
    source: &TreeEntry,
    dest: &TreeEntry,
    source_root: &Path,
    dest_root: &Path,
) -> Result<DiffState> {
    match (source.kind, dest.kind) {
        (EntryKind::Directory, EntryKind::Directory) => Ok(DiffState::Equal),
        (EntryKind::File, EntryKind::File) if source.size != dest.size => Ok(DiffState::Distinct),
        (EntryKind::File, EntryKind::File) => {
            let same = checksum(&source.path, source_root)? == checksum(&dest.path, dest_root)?;
            Ok(if same {
                DiffState::Equal
            } else {
                DiffState::Distinct
            })
        }
        _ => Ok(DiffState::Distinct),
    }
}

fn checksum(path: &NormalizedPath, root: &Path) -> Result<String> {
    let native = path.to_native(root);
    compute_file_checksum(&native).map_err(|e| SyncError::Filesystem {
        path: path.clone(),
        operation: Operation::Hash,
        source: mirror_fs::Error::io(&native, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exclude::build_exclusion_predicate;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const NO_PATTERNS: &[&str] = &[];

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn diff(source: &Path, dest: &Path, patterns: &[&str]) -> Vec<(String, DiffState)> {
        let predicate = build_exclusion_predicate(source, dest, patterns).unwrap();
        diff_trees(source, dest, &predicate)
            .unwrap()
            .into_iter()
            .map(|e| (e.path.to_string(), e.state))
            .collect()
    }

    #[test]
    fn test_classifies_all_states() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write(source.path(), "same.txt", "same");
        write(dest.path(), "same.txt", "same");
        write(source.path(), "new.txt", "new");
        write(dest.path(), "old.txt", "old");
        write(source.path(), "changed.txt", "one");
        write(dest.path(), "changed.txt", "two");
        write(source.path(), "grown.txt", "longer content");
        write(dest.path(), "grown.txt", "short");

        assert_eq!(
            diff(source.path(), dest.path(), NO_PATTERNS),
            vec![
                ("changed.txt".to_string(), DiffState::Distinct),
                ("grown.txt".to_string(), DiffState::Distinct),
                ("new.txt".to_string(), DiffState::OnlySource),
                ("old.txt".to_string(), DiffState::OnlyDest),
            ]
        );
    }

    #[test]
    fn test_directories_precede_their_contents() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write(source.path(), "a/b/c.txt", "c");
        write(source.path(), "a-b.txt", "x");

        let paths: Vec<String> = diff(source.path(), dest.path(), NO_PATTERNS)
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(paths, vec!["a", "a-b.txt", "a/b", "a/b/c.txt"]);
    }

    #[test]
    fn test_common_directories_are_equal() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::create_dir(source.path().join("shared")).unwrap();
        fs::create_dir(dest.path().join("shared")).unwrap();

        assert!(diff(source.path(), dest.path(), NO_PATTERNS).is_empty());
    }

    #[test]
    fn test_kind_change_is_distinct_with_both_kinds() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write(source.path(), "thing", "file");
        write(dest.path(), "thing/inner.txt", "nested");

        let predicate = build_exclusion_predicate(source.path(), dest.path(), NO_PATTERNS).unwrap();
        let entries = diff_trees(source.path(), dest.path(), &predicate).unwrap();

        assert_eq!(
            entries[0],
            DiffEntry {
                path: NormalizedPath::new("thing"),
                state: DiffState::Distinct,
                source_kind: Some(EntryKind::File),
                dest_kind: Some(EntryKind::Directory),
            }
        );
    }

    #[test]
    fn test_excluded_paths_and_git_dir_are_skipped() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write(source.path(), "keep.txt", "k");
        write(source.path(), "skip.log", "s");
        write(source.path(), "node_modules/pkg/index.js", "x");
        write(dest.path(), ".git/HEAD", "ref: refs/heads/main");

        assert_eq!(
            diff(source.path(), dest.path(), &["*.log", "node_modules/"]),
            vec![("keep.txt".to_string(), DiffState::OnlySource)]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_classified_by_target() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        write(source.path(), "real/file.txt", "content");
        std::os::unix::fs::symlink(source.path().join("real"), source.path().join("link"))
            .unwrap();

        let predicate = build_exclusion_predicate(source.path(), dest.path(), NO_PATTERNS).unwrap();
        let entries = walk_tree(source.path(), &predicate).unwrap();

        assert_eq!(entries[&NormalizedPath::new("link")].kind, EntryKind::Directory);
        assert_eq!(entries[&NormalizedPath::new("link/file.txt")].kind, EntryKind::File);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_fails_walk() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        std::os::unix::fs::symlink(source.path().join("missing"), source.path().join("broken"))
            .unwrap();

        let predicate = build_exclusion_predicate(source.path(), dest.path(), NO_PATTERNS).unwrap();
        let result = diff_trees(source.path(), dest.path(), &predicate);
        assert!(matches!(result, Err(SyncError::Walk { .. })));
    }
}
