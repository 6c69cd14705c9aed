//! Version control backends.
//!
//! Each supported VCS is a stateless unit struct implementing
//! [`VersionControlSystem`]. The [`registry`] holds the fixed, ordered table of
//! all backends and selects one by type name, URL or directory. A
//! [`WorkingTree`] binds a backend to a directory on disk.
//!
//! # Modules
//!
//! - [`registry`] - backend lookup by type, URL or directory
//! - [`split`] - decomposition of browsing URLs into locators
//! - [`working_tree`] - queries against a checkout on disk
//! - [`git`], [`git_repo`], [`mercurial`], [`subversion`], [`cvs`] - backends

pub mod cvs;
pub mod git;
pub mod git_repo;
pub mod mercurial;
pub mod registry;
pub mod split;
pub mod subversion;
pub mod working_tree;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SrcpinError};
use crate::process::{self, CommandOptions};
use crate::versions::{is_version_at_least, parse_tool_version};

pub use cvs::Cvs;
pub use git::Git;
pub use git_repo::GitRepo;
pub use mercurial::Mercurial;
pub use registry::{for_directory, for_kind, for_type, for_url, ALL};
pub use split::split_url;
pub use subversion::Subversion;
pub use working_tree::WorkingTree;

/// The closed set of supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsKind {
    Git,
    GitRepo,
    Mercurial,
    Subversion,
    Cvs,
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VcsKind::Git => "Git",
            VcsKind::GitRepo => "GitRepo",
            VcsKind::Mercurial => "Mercurial",
            VcsKind::Subversion => "Subversion",
            VcsKind::Cvs => "Cvs",
        };
        f.write_str(name)
    }
}

/// Everything a backend needs to materialize one revision on disk.
#[derive(Debug, Clone)]
pub struct DownloadRequest<'a> {
    /// Clone URL.
    pub url: &'a str,
    /// Exact revision to check out.
    pub revision: &'a str,
    /// Sub-path to restrict the checkout to, empty for the whole repository.
    pub path: &'a str,
    /// Directory to check out into. Exists and is owned by the caller.
    pub target_dir: &'a Path,
    /// Whether nested repositories are materialized too.
    pub recursive: bool,
    /// Time budget for each external process.
    pub timeout: Option<Duration>,
}

impl DownloadRequest<'_> {
    /// Command options for running a tool inside `dir` under this request's budget.
    pub fn options_in(&self, dir: &Path) -> CommandOptions {
        CommandOptions::in_dir(dir).with_timeout(self.timeout)
    }
}

/// A version control system backend.
///
/// Implementations are stateless singletons. The working tree queries take
/// the directory to operate on; [`WorkingTree`] wraps them with a bound
/// directory and validity checks.
pub trait VersionControlSystem: fmt::Debug + Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> VcsKind;

    /// Lowercase names that clearly identify the VCS, e.g. `["svn", "subversion"]`.
    fn aliases(&self) -> &'static [&'static str];

    /// Name of the command line program.
    fn command_name(&self) -> &'static str;

    /// Named revisions that usually move as new revisions are created.
    fn moving_revision_names(&self) -> &'static [&'static str];

    /// Revision checked out when none is requested. Always a moving name.
    fn default_revision(&self) -> &'static str;

    /// Arguments that make the program print its version.
    fn version_args(&self) -> &'static [&'static str] {
        &["--version"]
    }

    /// Whether the VCS can download from `url`.
    ///
    /// Only true when almost unambiguous, e.g. a URL ending on `.git` for Git,
    /// but not when `git` merely appears in the host or project name.
    fn is_applicable_url(&self, url: &str) -> bool;

    /// Whether any alias matches `vcs_type`, ignoring case.
    fn is_applicable_type(&self, vcs_type: &str) -> bool {
        let vcs_type = vcs_type.to_lowercase();
        self.aliases().iter().any(|alias| *alias == vcs_type)
    }

    /// Whether `revision` likely names a fixed revision that does not move.
    fn is_fixed_revision(&self, revision: &str) -> bool {
        !revision.trim().is_empty()
            && !self
                .moving_revision_names()
                .iter()
                .any(|name| *name == revision)
    }

    /// Version string of the installed program.
    fn version(&self) -> Result<String> {
        let output = process::run(
            self.command_name(),
            self.version_args(),
            &CommandOptions::default(),
        )
        .map_err(|e| SrcpinError::query(self.kind(), e))?;

        let text = format!("{}{}", output.stdout, output.stderr);
        parse_tool_version(&text).ok_or_else(|| {
            SrcpinError::query(
                self.kind(),
                format!("no version in output of '{}'", output.command),
            )
        })
    }

    /// Whether the installed program is at least `expected`, e.g. to check for features.
    fn is_at_least_version(&self, expected: &str) -> Result<bool> {
        let actual = self.version()?;
        is_version_at_least(&actual, expected).ok_or_else(|| {
            SrcpinError::query(
                self.kind(),
                format!("cannot compare version '{actual}' with '{expected}'"),
            )
        })
    }

    /// Whether `dir` is under this VCS's control. Never fails.
    fn is_valid_tree(&self, dir: &Path) -> bool;

    /// Whether the working tree has truncated history.
    fn is_shallow(&self, _dir: &Path) -> Result<bool> {
        Ok(false)
    }

    /// Clone URL of the remote the working tree tracks.
    fn remote_url(&self, dir: &Path) -> Result<String>;

    /// Revision the working tree is at.
    fn revision(&self, dir: &Path) -> Result<String>;

    /// Top-level directory of the working tree.
    fn root_path(&self, dir: &Path) -> Result<PathBuf>;

    /// Tags available in the remote repository.
    fn list_remote_tags(&self, dir: &Path) -> Result<Vec<String>>;

    /// Check out exactly `request.revision` into `request.target_dir`.
    fn checkout(&self, request: &DownloadRequest<'_>) -> Result<()>;

    /// Materialize the nested repositories directly below `dir`.
    ///
    /// Returns the directories of the nested repositories that were checked
    /// out, so the caller can descend into them in turn. Backends whose tool
    /// handles nesting during [`checkout`](Self::checkout) return nothing.
    fn materialize_nested(
        &self,
        _dir: &Path,
        _request: &DownloadRequest<'_>,
    ) -> Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }
}

/// Run a query command of `vcs` in `dir` and return its trimmed stdout.
pub(crate) fn query_tool(
    vcs: VcsKind,
    program: &str,
    dir: &Path,
    args: &[&str],
) -> Result<String> {
    query_tool_with(vcs, program, args, &CommandOptions::in_dir(dir))
}

/// Like [`query_tool`] with explicit command options.
pub(crate) fn query_tool_with(
    vcs: VcsKind,
    program: &str,
    args: &[&str],
    options: &CommandOptions,
) -> Result<String> {
    process::run(program, args, options)
        .map(|output| output.stdout_trimmed().to_string())
        .map_err(|e| SrcpinError::query(vcs, e))
}

/// Closest ancestor of `dir` (including itself) for which `is_root` holds.
///
/// `dir` itself must exist; a missing directory is never under VCS control.
pub(crate) fn find_marker_root(dir: &Path, is_root: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }

    let dir = absolute(dir);
    dir.ancestors().find(|d| is_root(d)).map(Path::to_path_buf)
}

/// Best-effort absolute form of `path`, resolving symlinks where possible.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Whether `text` looks like a hexadecimal commit identifier.
pub(crate) fn is_hex_id(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_hexdigit())
}
