//! Working copy status summary

use git2::{Status, Statuses};

/// Paths grouped by how they differ from HEAD, sorted.
///
/// `staged` lists every path with an index-side change, regardless of kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub created: Vec<String>,
    pub deleted: Vec<String>,
    pub modified: Vec<String>,
    pub renamed: Vec<String>,
    pub not_added: Vec<String>,
    pub conflicted: Vec<String>,
    pub staged: Vec<String>,
}

impl StatusSummary {
    pub(crate) fn from_statuses(statuses: &Statuses<'_>) -> Self {
        let mut summary = Self::default();

        for entry in statuses.iter() {
            let status = entry.status();
            let path = entry
                .head_to_index()
                .and_then(|delta| {
                    delta
                        .new_file()
                        .path()
                        .map(|p| p.to_string_lossy().into_owned())
                })
                .or_else(|| entry.path().map(str::to_string));
            let Some(path) = path else {
                continue;
            };

            if status.is_conflicted() {
                summary.conflicted.push(path);
                continue;
            }

            if status.contains(Status::INDEX_NEW) {
                summary.created.push(path.clone());
            }
            if status.contains(Status::INDEX_DELETED) {
                summary.deleted.push(path.clone());
            }
            if status.intersects(Status::INDEX_MODIFIED | Status::WT_MODIFIED) {
                summary.modified.push(path.clone());
            }
            if status.contains(Status::INDEX_RENAMED) {
                summary.renamed.push(path.clone());
            }
            if status.contains(Status::WT_NEW) {
                summary.not_added.push(path.clone());
            }
            if status.intersects(
                Status::INDEX_NEW
                    | Status::INDEX_MODIFIED
                    | Status::INDEX_DELETED
                    | Status::INDEX_RENAMED
                    | Status::INDEX_TYPECHANGE,
            ) {
                summary.staged.push(path);
            }
        }

        for list in [
            &mut summary.created,
            &mut summary.deleted,
            &mut summary.modified,
            &mut summary.renamed,
            &mut summary.not_added,
            &mut summary.conflicted,
            &mut summary.staged,
        ] {
            list.sort();
        }

        summary
    }

    /// True when nothing differs from HEAD, untracked files included.
    pub fn is_clean(&self) -> bool {
        self.created.is_empty()
            && self.deleted.is_empty()
            && self.modified.is_empty()
            && self.renamed.is_empty()
            && self.not_added.is_empty()
            && self.conflicted.is_empty()
    }
}
