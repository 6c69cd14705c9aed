//! Download orchestration.
//!
//! [`Downloader`] picks the backend for a package, refuses revisions that
//! would not reproduce, checks out exactly one revision and, if asked,
//! materializes nested repositories with an explicit worklist.
//!
//! # Example
//!
//! ```no_run
//! use srcpin::download::Downloader;
//! use srcpin::model::{Locator, Package};
//! use std::path::Path;
//!
//! let package = Package::new(
//!     "NPM::left-pad:1.3.0",
//!     Locator::new("", "https://github.com/stevemao/left-pad/tree/v1.3.0", "", ""),
//! );
//!
//! let tree = Downloader::new()
//!     .download(&package, Path::new("/tmp/left-pad"), false, true)
//!     .unwrap();
//! println!("{}", tree.revision().unwrap());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::DownloadConfig;
use crate::error::{Result, SrcpinError};
use crate::model::Package;
use crate::vcs::{registry, DownloadRequest, VersionControlSystem, WorkingTree};

/// Materializes packages' source code as working trees.
#[derive(Debug, Clone, Default)]
pub struct Downloader {
    timeout: Option<Duration>,
}

impl Downloader {
    /// A downloader whose external processes run without time limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// A downloader using the configured time budget.
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self {
            timeout: config.timeout(),
        }
    }

    /// Bound every external process to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The time budget for each external process, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Check out the source code of `package` into `target_dir`.
    ///
    /// Revisions that are not fixed are refused unless
    /// `allow_moving_revisions` is set; the check happens before anything is
    /// written. With `recursive` unset, nested repositories stay empty
    /// placeholders.
    ///
    /// # Errors
    ///
    /// - [`SrcpinError::UnsupportedLocator`] if no backend fits the package
    /// - [`SrcpinError::MovingRevision`] if the revision is ambiguous
    /// - [`SrcpinError::Download`] for anything going wrong on disk or in a
    ///   VCS tool; `target_dir` must then be considered garbage
    pub fn download(
        &self,
        package: &Package,
        target_dir: &Path,
        allow_moving_revisions: bool,
        recursive: bool,
    ) -> Result<WorkingTree> {
        let processed = package.processed();
        let vcs = resolve_backend(package)?;

        let revision = if processed.revision.is_empty() {
            vcs.default_revision()
        } else {
            processed.revision.as_str()
        };

        if !vcs.is_fixed_revision(revision) {
            if !allow_moving_revisions {
                return Err(SrcpinError::MovingRevision {
                    vcs: vcs.kind().to_string(),
                    revision: revision.to_string(),
                });
            }
            tracing::warn!(
                "Downloading moving {} revision '{}' of '{}'",
                vcs.kind(),
                revision,
                processed.url
            );
        }

        tracing::info!(
            "Downloading {} revision '{}' of '{}' into '{}'",
            vcs.kind(),
            revision,
            processed.url,
            target_dir.display()
        );

        let request = DownloadRequest {
            url: &processed.url,
            revision,
            path: &processed.path,
            target_dir,
            recursive,
            timeout: self.timeout,
        };

        materialize(vcs, &request).map_err(|e| SrcpinError::download(&processed.url, e))
    }
}

/// The backend for `package`: declared type, then processed type, then URL.
pub fn resolve_backend(package: &Package) -> Result<&'static dyn VersionControlSystem> {
    let processed = package.processed();
    let unsupported = || SrcpinError::UnsupportedLocator {
        vcs_type: package.declared.vcs_type.clone(),
        url: processed.url.clone(),
    };

    if processed.url.is_empty() {
        return Err(unsupported());
    }

    registry::for_type(&package.declared.vcs_type)
        .or_else(|| registry::for_type(&processed.vcs_type))
        .or_else(|| registry::for_url(&processed.url))
        .ok_or_else(unsupported)
}

fn materialize(
    vcs: &'static dyn VersionControlSystem,
    request: &DownloadRequest<'_>,
) -> Result<WorkingTree> {
    fs::create_dir_all(request.target_dir)?;
    vcs.checkout(request)?;

    if request.recursive {
        let mut worklist: Vec<PathBuf> = vec![request.target_dir.to_path_buf()];
        while let Some(dir) = worklist.pop() {
            let nested = vcs.materialize_nested(&dir, request)?;
            for child in &nested {
                tracing::debug!("Materialized nested repository '{}'", child.display());
            }
            worklist.extend(nested);
        }
    }

    let tree = WorkingTree::new(vcs, request.target_dir);
    if !tree.is_valid() {
        return Err(SrcpinError::Download {
            url: request.url.to_string(),
            message: format!(
                "'{}' is not a valid {} working tree after checkout",
                request.target_dir.display(),
                vcs.kind()
            ),
        });
    }

    Ok(tree)
}
