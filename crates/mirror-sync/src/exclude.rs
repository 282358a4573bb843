//! Ignore-rule resolution
//!
//! A path is excluded from reconciliation when the explicit pattern list, the
//! source tree's `.gitignore` files or the destination tree's `.gitignore`
//! files exclude it (union). Each origin follows gitignore semantics:
//!
//! - blank lines and `#` comments are skipped, trailing whitespace is trimmed
//! - `!pattern` re-includes a path excluded by an earlier rule
//! - a pattern without a `/` (other than a trailing one) matches at any depth
//! - a leading or interior `/` anchors the pattern to the rule file's directory
//! - a trailing `/` only matches directories
//! - `*`, `?` and `[...]` never cross `/`; `**` does
//! - the last matching rule of a file wins, and deeper files win over
//!   shallower ones
//! - a path beneath an excluded directory is excluded, whatever its own rules
//!
//! `.git` is always excluded at any depth.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use globset::{GlobBuilder, GlobMatcher};
use mirror_fs::NormalizedPath;

use crate::error::{Operation, Result, SyncError};

/// Name of the per-directory rule file.
pub const IGNORE_FILE: &str = ".gitignore";

/// Directory holding repository metadata, never reconciled.
pub const GIT_DIR: &str = ".git";

/// Origin reported for explicit patterns in [`SyncError::InvalidPattern`].
const EXPLICIT_ORIGIN: &str = "exclude list";

#[derive(Debug)]
struct Rule {
    pattern: String,
    matcher: GlobMatcher,
    negated: bool,
    directory_only: bool,
}

impl Rule {
    /// Parse one line of a rule file. Returns `None` for blanks and comments.
    fn parse(line: &str, origin: &str) -> Result<Option<Self>> {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (negated, body) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (
                false,
                line.strip_prefix('\\')
                    .filter(|rest| rest.starts_with(['#', '!']))
                    .unwrap_or(line),
            ),
        };
        let (directory_only, body) = match body.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        let (anchored, body) = match body.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (body.contains('/'), body),
        };
        if body.is_empty() {
            return Ok(None);
        }

        let glob = if anchored {
            body.to_string()
        } else {
            format!("**/{body}")
        };
        let matcher = GlobBuilder::new(&glob)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|source| SyncError::InvalidPattern {
                pattern: line.to_string(),
                origin: origin.to_string(),
                source,
            })?
            .compile_matcher();

        Ok(Some(Self {
            pattern: line.to_string(),
            matcher,
            negated,
            directory_only,
        }))
    }
}

/// The rules of one rule file, matched relative to the file's directory.
#[derive(Debug)]
struct RuleSet {
    base: NormalizedPath,
    rules: Vec<Rule>,
}

impl RuleSet {
    fn parse<'a>(
        base: NormalizedPath,
        lines: impl IntoIterator<Item = &'a str>,
        origin: &str,
    ) -> Result<Self> {
        let mut rules = Vec::new();
        for line in lines {
            if let Some(rule) = Rule::parse(line, origin)? {
                rules.push(rule);
            }
        }
        Ok(Self { base, rules })
    }

    /// `Some(true)` when the last matching rule excludes `path`, `Some(false)`
    /// when it re-includes it, `None` when no rule matches.
    fn decide(&self, path: &NormalizedPath, is_dir: bool) -> Option<bool> {
        let relative = if self.base.is_root() {
            path.as_str()
        } else {
            path.as_str()
                .strip_prefix(self.base.as_str())?
                .strip_prefix('/')?
        };

        self.rules
            .iter()
            .rev()
            .find(|rule| (is_dir || !rule.directory_only) && rule.matcher.is_match(relative))
            .map(|rule| {
                tracing::trace!(%path, pattern = %rule.pattern, base = %self.base, "Rule matched");
                !rule.negated
            })
    }
}

/// An explicit, always-active pattern list rooted at the compared trees.
#[derive(Debug)]
pub struct ExcludeRules {
    rules: RuleSet,
}

impl ExcludeRules {
    /// Compile `patterns` with gitignore semantics.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidPattern`] for the first pattern that is not
    /// a valid glob.
    pub fn parse<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let rules = RuleSet::parse(
            NormalizedPath::root(),
            patterns.iter().map(AsRef::as_ref),
            EXPLICIT_ORIGIN,
        )?;
        Ok(Self { rules })
    }

    /// Number of effective rules (comments and blanks are dropped).
    pub fn len(&self) -> usize {
        self.rules.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.rules.is_empty()
    }

    fn decide(&self, path: &NormalizedPath, is_dir: bool) -> Option<bool> {
        self.rules.decide(path, is_dir)
    }
}

/// Cascading `.gitignore` rule files of one tree, keyed by directory.
#[derive(Debug)]
struct IgnoreTree {
    root: PathBuf,
    sets: BTreeMap<NormalizedPath, RuleSet>,
}

impl IgnoreTree {
    /// Read every `.gitignore` under `root`, skipping directories that are
    /// already excluded by the rules read so far or by `explicit`.
    fn load(root: &Path, explicit: &ExcludeRules) -> Result<Self> {
        let mut tree = Self {
            root: root.to_path_buf(),
            sets: BTreeMap::new(),
        };
        let mut pending = vec![NormalizedPath::root()];

        while let Some(dir) = pending.pop() {
            let native = dir.to_native(root);
            tree.read_rule_file(&dir, &native)?;

            let entries = match fs::read_dir(&native) {
                Ok(entries) => entries,
                Err(e) if dir.is_root() && e.kind() == std::io::ErrorKind::NotFound => break,
                Err(e) => return Err(inspect_error(&dir, &native, e)),
            };
            for entry in entries {
                let entry = entry.map_err(|e| inspect_error(&dir, &native, e))?;
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                let is_dir = entry
                    .file_type()
                    .map_err(|e| inspect_error(&dir, &native, e))?
                    .is_dir();
                if name == GIT_DIR || !is_dir {
                    continue;
                }
                let child = dir.join(&name);
                if explicit.decide(&child, true) == Some(true) || tree.decide(&child, true) {
                    tracing::trace!(path = %child, root = %root.display(), "Not descending into ignored directory");
                    continue;
                }
                pending.push(child);
            }
        }

        tracing::debug!(root = %root.display(), files = tree.sets.len(), "Loaded ignore files");
        Ok(tree)
    }

    fn read_rule_file(&mut self, dir: &NormalizedPath, native_dir: &Path) -> Result<()> {
        let file = native_dir.join(IGNORE_FILE);
        if !file.is_file() {
            return Ok(());
        }
        let rel = dir.join(IGNORE_FILE);
        let content = fs::read_to_string(&file).map_err(|e| SyncError::Filesystem {
            path: rel.clone(),
            operation: Operation::ReadIgnoreFile,
            source: mirror_fs::Error::io(&file, e),
        })?;
        let origin = file.display().to_string();
        let set = RuleSet::parse(dir.clone(), content.lines(), &origin)?;
        self.sets.insert(dir.clone(), set);
        Ok(())
    }

    /// Whether this tree's own rules exclude `path`, ignoring ancestors.
    ///
    /// Root rules never exclude the root rule file. Both trees keep theirs at
    /// the same relative path, so only an explicit pattern can exclude it.
    fn decide(&self, path: &NormalizedPath, is_dir: bool) -> bool {
        let self_rule_file = path.as_str() == IGNORE_FILE;

        let mut bases = path.ancestors();
        bases.insert(0, NormalizedPath::root());
        bases
            .iter()
            .rev()
            .filter(|base| !(self_rule_file && base.is_root()))
            .filter_map(|base| self.sets.get(base))
            .find_map(|set| set.decide(path, is_dir))
            .unwrap_or(false)
    }
}

fn inspect_error(dir: &NormalizedPath, native: &Path, e: std::io::Error) -> SyncError {
    SyncError::Filesystem {
        path: dir.clone(),
        operation: Operation::Inspect,
        source: mirror_fs::Error::io(native, e),
    }
}

/// Decides whether a relative path takes part in reconciliation.
///
/// Built once per synchronization and evaluated identically for both trees:
/// a path that is a directory in either tree is judged as a directory, so a
/// directory-only rule gives one answer for both sides. Results are memoized
/// per `(path, is_dir)`.
#[derive(Debug)]
pub struct ExclusionPredicate {
    explicit: ExcludeRules,
    source: IgnoreTree,
    dest: IgnoreTree,
    cache: Mutex<HashMap<(NormalizedPath, bool), bool>>,
}

impl ExclusionPredicate {
    /// Whether `path` (a directory when `is_dir`) is excluded.
    pub fn excludes(&self, path: &NormalizedPath, is_dir: bool) -> bool {
        if path.is_root() {
            return false;
        }
        let is_dir = is_dir || self.is_directory_in_either(path);
        let key = (path.clone(), is_dir);
        if let Some(&cached) = self.cache().get(&key) {
            return cached;
        }

        let excluded = path.segments().any(|segment| segment == GIT_DIR)
            || path
                .parent()
                .is_some_and(|parent| self.excludes(&parent, true))
            || self.explicit.decide(path, is_dir) == Some(true)
            || self.source.decide(path, is_dir)
            || self.dest.decide(path, is_dir);

        self.cache().insert(key, excluded);
        excluded
    }

    /// Whether the relative path `path` is excluded. A trailing `/` marks it
    /// as a directory.
    pub fn is_excluded(&self, path: &str) -> bool {
        let is_dir = path.ends_with('/') || path.ends_with('\\');
        self.excludes(&NormalizedPath::new(path), is_dir)
    }

    /// Root of the source tree the predicate was built for.
    pub fn source_root(&self) -> &Path {
        &self.source.root
    }

    /// Root of the destination tree the predicate was built for.
    pub fn dest_root(&self) -> &Path {
        &self.dest.root
    }

    fn is_directory_in_either(&self, path: &NormalizedPath) -> bool {
        path.to_native(&self.source.root).is_dir() || path.to_native(&self.dest.root).is_dir()
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<(NormalizedPath, bool), bool>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Build the combined exclusion predicate for reconciling `source_root` into
/// `dest_root`.
///
/// # Errors
///
/// Returns [`SyncError::InvalidPattern`] when an explicit pattern or a
/// `.gitignore` line is not a valid glob, and [`SyncError::Filesystem`] when a
/// rule file cannot be read.
pub fn build_exclusion_predicate<S: AsRef<str>>(
    source_root: &Path,
    dest_root: &Path,
    patterns: &[S],
) -> Result<ExclusionPredicate> {
    let explicit = ExcludeRules::parse(patterns)?;
    let source = IgnoreTree::load(source_root, &explicit)?;
    let dest = IgnoreTree::load(dest_root, &explicit)?;

    tracing::debug!(
        explicit = explicit.len(),
        source_files = source.sets.len(),
        dest_files = dest.sets.len(),
        "Built exclusion predicate"
    );

    Ok(ExclusionPredicate {
        explicit,
        source,
        dest,
        cache: Mutex::new(HashMap::new()),
    })
}
