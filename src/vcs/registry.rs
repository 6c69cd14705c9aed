//! Backend lookup.
//!
//! The registry is a fixed table of stateless backends; lookups never
//! allocate and are safe from any thread.

use std::path::Path;

use super::{Cvs, Git, GitRepo, Mercurial, Subversion, VcsKind, VersionControlSystem, WorkingTree};

/// All backends, in lookup order for type names and URLs.
pub static ALL: [&'static dyn VersionControlSystem; 5] =
    [&Git, &GitRepo, &Mercurial, &Subversion, &Cvs];

/// Probe order for directories.
///
/// A repo-tool checkout also contains Git repositories, so GitRepo must be
/// asked before Git.
static DIRECTORY_PROBE_ORDER: [&'static dyn VersionControlSystem; 5] =
    [&GitRepo, &Git, &Mercurial, &Subversion, &Cvs];

/// The backend for `kind`.
pub fn for_kind(kind: VcsKind) -> &'static dyn VersionControlSystem {
    match kind {
        VcsKind::Git => &Git,
        VcsKind::GitRepo => &GitRepo,
        VcsKind::Mercurial => &Mercurial,
        VcsKind::Subversion => &Subversion,
        VcsKind::Cvs => &Cvs,
    }
}

/// The first backend one of whose aliases equals `vcs_type`, ignoring case.
pub fn for_type(vcs_type: &str) -> Option<&'static dyn VersionControlSystem> {
    let vcs_type = vcs_type.trim();
    if vcs_type.is_empty() {
        return None;
    }

    ALL.iter().copied().find(|vcs| vcs.is_applicable_type(vcs_type))
}

/// The first backend that can almost certainly download from `url`.
pub fn for_url(url: &str) -> Option<&'static dyn VersionControlSystem> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    ALL.iter().copied().find(|vcs| vcs.is_applicable_url(url))
}

/// A working tree for the first backend that governs `dir`.
pub fn for_directory(dir: &Path) -> Option<WorkingTree> {
    let found = DIRECTORY_PROBE_ORDER
        .iter()
        .copied()
        .find(|vcs| vcs.is_valid_tree(dir));

    match found {
        Some(vcs) => {
            tracing::debug!("'{}' is a {} working tree", dir.display(), vcs.kind());
            Some(WorkingTree::new(vcs, dir))
        }
        None => {
            tracing::debug!("'{}' is not under version control", dir.display());
            None
        }
    }
}
