//! git2-backed working copy

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;
use git2::{
    Commit, ErrorCode, FetchOptions, Index, ObjectType, Oid, PushOptions, Repository, Signature,
    StatusOptions,
};
use mirror_fs::{LockGuard, NormalizedPath, io};

use crate::provider::VersionControl;
use crate::status::StatusSummary;
use crate::{Error, Result, remote};

/// Remote that clone creates and that push targets.
pub const DEFAULT_REMOTE: &str = "origin";

/// Identity used for commits when neither the repository nor the user
/// configuration provides one.
const FALLBACK_NAME: &str = "git-mirror";
const FALLBACK_EMAIL: &str = "git-mirror@localhost";

/// Lock file created inside the git directory while a sync runs.
const LOCK_FILE: &str = "git-mirror.lock";

/// A non-bare git working copy.
pub struct GitRepository {
    repo: Repository,
    root: PathBuf,
}

impl GitRepository {
    /// Open the working copy rooted at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => Error::NotAWorkingCopy {
                path: path.to_path_buf(),
            },
            _ => Error::Git(e),
        })?;
        Self::from_repository(repo)
    }

    /// Initialise a new working copy at `path`.
    pub fn init(path: &Path) -> Result<Self> {
        let repo = Repository::init(path)?;
        Self::from_repository(repo)
    }

    /// Clone `url` into `path`, which must be empty or absent.
    pub fn clone_from(url: &str, path: &Path) -> Result<Self> {
        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(remote::callbacks());

        let repo = RepoBuilder::new().fetch_options(fetch).clone(url, path)?;
        tracing::debug!(url, path = %path.display(), "Cloned repository");
        Self::from_repository(repo)
    }

    fn from_repository(repo: Repository) -> Result<Self> {
        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::NotAWorkingCopy {
                path: repo.path().to_path_buf(),
            })?;
        Ok(Self { repo, root })
    }

    /// Root of the working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.git` directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Take the advisory lock that serializes mutations of this working copy.
    pub fn lock(&self) -> Result<LockGuard> {
        Ok(io::lock_exclusive(&self.git_dir().join(LOCK_FILE))?)
    }

    /// Summarize how the working copy differs from HEAD.
    pub fn status(&self) -> Result<StatusSummary> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .renames_head_to_index(true);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(StatusSummary::from_statuses(&statuses))
    }

    /// True when there is nothing to commit and no untracked files.
    pub fn is_clean(&self) -> Result<bool> {
        Ok(self.status()?.is_clean())
    }

    /// Name of the branch HEAD points to.
    ///
    /// Works on an unborn branch (fresh clone of an empty repository).
    pub fn current_branch(&self) -> Result<String> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().unwrap_or("HEAD").to_string()),
            Ok(_) => Err(Error::DetachedHead),
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                let target = head.symbolic_target().ok_or(Error::DetachedHead)?;
                Ok(target.trim_start_matches("refs/heads/").to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The index, re-read from disk when another handle changed it.
    fn index(&self) -> Result<Index> {
        let mut index = self.repo.index()?;
        index.read(false)?;
        Ok(index)
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn signature(&self) -> Result<Signature<'static>> {
        Ok(self
            .repo
            .signature()
            .or_else(|_| Signature::now(FALLBACK_NAME, FALLBACK_EMAIL))?)
    }

    /// Commit the index on top of HEAD.
    ///
    /// With `allow_empty` false, fails with [`Error::NothingToCommit`] when the
    /// index tree equals HEAD's tree.
    pub fn commit(&self, message: &str, allow_empty: bool) -> Result<Oid> {
        let mut index = self.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let parent = self.head_commit()?;

        if !allow_empty {
            let unchanged = match &parent {
                Some(commit) => commit.tree_id() == tree_id,
                None => index.is_empty(),
            };
            if unchanged {
                return Err(Error::NothingToCommit);
            }
        }

        let signature = self.signature()?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        tracing::debug!(%oid, "Created commit");
        Ok(oid)
    }

    /// Create a lightweight tag at HEAD (`git tag <name>`).
    pub fn add_tag(&self, name: &str) -> Result<Oid> {
        let head = self.repo.head()?.peel(ObjectType::Commit)?;
        let oid = self.repo.tag_lightweight(name, &head, false)?;
        tracing::debug!(tag = name, target = %head.id(), "Created tag");
        Ok(oid)
    }

    /// Push the current branch to `origin`.
    pub fn push(&self) -> Result<()> {
        let branch = self.current_branch()?;
        self.push_refspecs(&[format!("refs/heads/{branch}:refs/heads/{branch}")])
    }

    /// Push every local tag to `origin`.
    pub fn push_tags(&self) -> Result<()> {
        let tags = self.repo.tag_names(None)?;
        let refspecs: Vec<String> = tags
            .iter()
            .flatten()
            .map(|tag| format!("refs/tags/{tag}:refs/tags/{tag}"))
            .collect();

        if refspecs.is_empty() {
            tracing::debug!("No tags to push");
            return Ok(());
        }
        self.push_refspecs(&refspecs)
    }

    fn push_refspecs(&self, refspecs: &[String]) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(DEFAULT_REMOTE)
            .map_err(|_| Error::RemoteNotFound {
                name: DEFAULT_REMOTE.to_string(),
            })?;

        let rejected: RefCell<Option<(String, String)>> = RefCell::new(None);
        let mut callbacks = remote::callbacks();
        callbacks.push_update_reference(|refname, status| {
            if let Some(message) = status {
                rejected
                    .borrow_mut()
                    .get_or_insert_with(|| (refname.to_string(), message.to_string()));
            }
            Ok(())
        });

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);
        remote.push(refspecs, Some(&mut options))?;

        if let Some((refname, message)) = rejected.borrow_mut().take() {
            return Err(Error::PushRejected { refname, message });
        }

        tracing::debug!(?refspecs, "Pushed to {}", DEFAULT_REMOTE);
        Ok(())
    }

    fn is_tracked(&self, path: &NormalizedPath) -> Result<bool> {
        let index = self.index()?;
        Ok(index.get_path(path.as_ref(), 0).is_some())
    }
}

impl VersionControl for GitRepository {
    fn stage(&self, path: &NormalizedPath) -> Result<()> {
        let mut index = self.index()?;
        index.add_path(path.as_ref())?;
        index.write()?;
        tracing::trace!(%path, "Staged");
        Ok(())
    }

    fn remove(&self, path: &NormalizedPath) -> Result<()> {
        let mut index = self.index()?;
        if index.get_path(path.as_ref(), 0).is_some() {
            index.remove_path(path.as_ref())?;
            index.write()?;
        } else {
            tracing::debug!(%path, "Removing untracked file from disk only");
        }

        let native = path.to_native(&self.root);
        if native.exists() {
            fs::remove_file(&native).map_err(|e| mirror_fs::Error::io(&native, e))?;
        }
        if let Some(parent) = native.parent() {
            io::prune_empty_dirs(parent, &self.root)?;
        }

        tracing::trace!(%path, "Removed");
        Ok(())
    }

    fn is_ignored(&self, path: &NormalizedPath) -> Result<bool> {
        if self.is_tracked(path)? {
            return Ok(false);
        }
        Ok(self.repo.is_path_ignored(path.as_ref())?)
    }
}
