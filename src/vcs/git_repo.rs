//! Checkouts managed by Google's `repo` tool.
//!
//! A repo checkout is a directory holding `.repo/`, whose
//! `.repo/manifests` is a plain Git clone of the manifest repository. All
//! working tree queries are answered by that manifest clone.

use std::path::{Path, PathBuf};

use super::{find_marker_root, DownloadRequest, Git, VcsKind, VersionControlSystem};
use crate::error::{Result, SrcpinError};
use crate::process;

const ALIASES: &[&str] = &["gitrepo", "git-repo", "repo"];
const MOVING_REVISIONS: &[&str] = &["HEAD", "master", "main"];

/// The `repo` multi-repository tool on top of Git.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitRepo;

impl GitRepo {
    /// The manifest clone governing `dir`.
    fn manifests_dir(&self, dir: &Path) -> Result<PathBuf> {
        repo_root(dir)
            .map(|root| root.join(".repo").join("manifests"))
            .ok_or_else(|| {
                SrcpinError::query(
                    self.kind(),
                    format!("'{}' is not inside a repo checkout", dir.display()),
                )
            })
    }

    /// Answer a query from the manifest clone, reporting failures as GitRepo's.
    fn ask_manifests<T>(&self, dir: &Path, query: impl FnOnce(&Path) -> Result<T>) -> Result<T> {
        let manifests = self.manifests_dir(dir)?;
        query(&manifests).map_err(|e| match e {
            SrcpinError::Query { message, .. } => SrcpinError::query(self.kind(), message),
            other => other,
        })
    }
}

impl VersionControlSystem for GitRepo {
    fn kind(&self) -> VcsKind {
        VcsKind::GitRepo
    }

    fn aliases(&self) -> &'static [&'static str] {
        ALIASES
    }

    fn command_name(&self) -> &'static str {
        "repo"
    }

    fn moving_revision_names(&self) -> &'static [&'static str] {
        MOVING_REVISIONS
    }

    fn default_revision(&self) -> &'static str {
        "master"
    }

    fn version_args(&self) -> &'static [&'static str] {
        &["version"]
    }

    /// Manifest URLs look exactly like Git URLs, so repo is never guessed.
    fn is_applicable_url(&self, _url: &str) -> bool {
        false
    }

    fn is_valid_tree(&self, dir: &Path) -> bool {
        repo_root(dir).is_some()
    }

    fn is_shallow(&self, dir: &Path) -> Result<bool> {
        self.ask_manifests(dir, |manifests| Git.is_shallow(manifests))
    }

    fn remote_url(&self, dir: &Path) -> Result<String> {
        self.ask_manifests(dir, |manifests| Git.remote_url(manifests))
    }

    fn revision(&self, dir: &Path) -> Result<String> {
        self.ask_manifests(dir, |manifests| Git.revision(manifests))
    }

    fn root_path(&self, dir: &Path) -> Result<PathBuf> {
        repo_root(dir).ok_or_else(|| {
            SrcpinError::query(
                self.kind(),
                format!("'{}' is not inside a repo checkout", dir.display()),
            )
        })
    }

    fn list_remote_tags(&self, dir: &Path) -> Result<Vec<String>> {
        self.ask_manifests(dir, |manifests| Git.list_remote_tags(manifests))
    }

    fn checkout(&self, request: &DownloadRequest<'_>) -> Result<()> {
        let target = request.target_dir;
        let options = request.options_in(target);

        let mut init = vec![
            "init",
            "--depth",
            "1",
            "-b",
            request.revision,
            "-u",
            request.url,
        ];
        if !request.path.is_empty() {
            init.extend(["-m", request.path]);
        }

        tracing::info!("Initializing repo manifest from '{}'", request.url);
        process::run(self.command_name(), &init, &options)?;

        let mut sync = vec!["sync", "-c"];
        if request.recursive {
            sync.push("--fetch-submodules");
        }

        tracing::info!("Syncing repo projects into '{}'", target.display());
        process::run(self.command_name(), &sync, &options)?;
        Ok(())
    }
}

/// Closest ancestor of `dir` holding a `.repo/manifests` checkout.
fn repo_root(dir: &Path) -> Option<PathBuf> {
    find_marker_root(dir, |d| d.join(".repo").join("manifests").is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::absolute;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn never_guessed_from_url() {
        assert!(
            !GitRepo.is_applicable_url("https://android.googlesource.com/platform/manifest.git")
        );
    }

    #[test]
    fn type_aliases() {
        assert!(GitRepo.is_applicable_type("repo"));
        assert!(GitRepo.is_applicable_type("GitRepo"));
        assert!(GitRepo.is_applicable_type("git-repo"));
        assert!(!GitRepo.is_applicable_type("git"));
    }

    #[test]
    fn default_revision_is_moving() {
        assert!(!GitRepo.is_fixed_revision(GitRepo.default_revision()));
    }

    #[test]
    fn root_is_directory_holding_repo() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".repo/manifests")).unwrap();
        let project = temp.path().join("platform/build");
        fs::create_dir_all(&project).unwrap();

        assert!(GitRepo.is_valid_tree(&project));
        assert_eq!(
            GitRepo.root_path(&project).unwrap(),
            absolute(temp.path())
        );
        assert_eq!(
            GitRepo.manifests_dir(&project).unwrap(),
            absolute(temp.path()).join(".repo/manifests")
        );
    }

    #[test]
    fn repo_directory_without_manifests_is_not_valid() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".repo")).unwrap();

        assert!(!GitRepo.is_valid_tree(temp.path()));
        assert!(GitRepo.root_path(temp.path()).is_err());
    }

    #[test]
    fn manifest_query_errors_are_reported_as_git_repo() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".repo/manifests")).unwrap();

        let err = GitRepo.revision(temp.path()).unwrap_err();

        match err {
            SrcpinError::Query { vcs, .. } => assert_eq!(vcs, "GitRepo"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
