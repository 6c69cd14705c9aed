//! Local working trees.

use std::path::{Component, Path, PathBuf};

use super::{absolute, VcsKind, VersionControlSystem};
use crate::error::{Result, SrcpinError};
use crate::model::Locator;
use crate::versions::filter_version_names;

/// A checkout on disk bound to one VCS backend.
///
/// `working_dir` does not need to be the top-level directory of the checkout;
/// see [`root_path`](Self::root_path). The tree does not own the directory's
/// contents: whoever created it (usually the downloader) is responsible for
/// cleaning up.
///
/// Every query except [`is_valid`](Self::is_valid) fails with
/// [`SrcpinError::Query`] if the directory is not governed by the backend.
#[derive(Debug, Clone)]
pub struct WorkingTree {
    vcs: &'static dyn VersionControlSystem,
    working_dir: PathBuf,
}

impl WorkingTree {
    /// Bind `vcs` to `working_dir`. Does not check validity.
    pub fn new(vcs: &'static dyn VersionControlSystem, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            vcs,
            working_dir: working_dir.into(),
        }
    }

    /// The backend this tree is bound to.
    pub fn vcs(&self) -> &'static dyn VersionControlSystem {
        self.vcs
    }

    /// Which backend this tree is bound to.
    pub fn vcs_type(&self) -> VcsKind {
        self.vcs.kind()
    }

    /// The directory this tree was created for.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Whether the directory is under the backend's control.
    pub fn is_valid(&self) -> bool {
        self.vcs.is_valid_tree(&self.working_dir)
    }

    /// Whether local history is truncated.
    pub fn is_shallow(&self) -> Result<bool> {
        self.ensure_valid()?;
        self.vcs.is_shallow(&self.working_dir)
    }

    /// Clone URL of the associated remote repository.
    pub fn remote_url(&self) -> Result<String> {
        self.ensure_valid()?;
        self.vcs.remote_url(&self.working_dir)
    }

    /// Backend-specific identifier of the checked out revision.
    pub fn revision(&self) -> Result<String> {
        self.ensure_valid()?;
        self.vcs.revision(&self.working_dir)
    }

    /// Top-level directory of the checkout.
    pub fn root_path(&self) -> Result<PathBuf> {
        self.ensure_valid()?;
        self.vcs.root_path(&self.working_dir)
    }

    /// Tags available in the remote repository.
    pub fn list_remote_tags(&self) -> Result<Vec<String>> {
        self.ensure_valid()?;
        self.vcs.list_remote_tags(&self.working_dir)
    }

    /// Find the tag that most likely names `version` of `project`.
    ///
    /// Returns an empty string if no tag matches.
    pub fn guess_revision_name(&self, project: &str, version: &str) -> Result<String> {
        let tags = self.list_remote_tags()?;
        let guess = filter_version_names(version, &tags, Some(project))
            .into_iter()
            .next()
            .unwrap_or_default();

        tracing::debug!(
            "Guessed revision '{}' for {} {} among {} tags",
            guess,
            project,
            version,
            tags.len()
        );

        Ok(guess)
    }

    /// All VCS information, optionally narrowed to `path` within the tree.
    pub fn info(&self, path: Option<&Path>) -> Result<Locator> {
        let path = match path {
            Some(path) => self.path_to_root(path)?,
            None => String::new(),
        };

        Ok(Locator::new(
            self.vcs_type().to_string(),
            self.remote_url()?,
            self.revision()?,
            path,
        ))
    }

    /// Path of `path` relative to the checkout root, with `/` separators.
    pub fn path_to_root(&self, path: &Path) -> Result<String> {
        let root = absolute(&self.root_path()?);
        let path = absolute(path);

        let relative = relative_path(&path, &root);
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        Ok(parts.join("/"))
    }

    fn ensure_valid(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(SrcpinError::query(
                self.vcs_type(),
                format!(
                    "'{}' is not a {} working tree",
                    self.working_dir.display(),
                    self.vcs_type()
                ),
            ))
        }
    }
}

/// `path` expressed relative to `base`, using `..` to leave `base`.
fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path_components: Vec<Component<'_>> = path.components().collect();
    let base_components: Vec<Component<'_>> = base.components().collect();

    let common = path_components
        .iter()
        .zip(&base_components)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push(Component::ParentDir);
    }
    for component in &path_components[common..] {
        relative.push(component);
    }
    relative
}
