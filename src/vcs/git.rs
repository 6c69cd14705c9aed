//! Git backend.
//!
//! Downloads fetch exactly one revision with `--depth 1` where the server
//! allows it and fall back to a full fetch otherwise. Submodules are
//! initialized one level at a time so the downloader can walk them with an
//! explicit worklist.

use std::fs;
use std::path::{Path, PathBuf};

use super::{
    find_marker_root, is_hex_id, query_tool_with, DownloadRequest, VcsKind, VersionControlSystem,
};
use crate::error::{Result, SrcpinError};
use crate::process::{self, CommandOptions};

const ALIASES: &[&str] = &["git"];
const MOVING_REVISIONS: &[&str] = &["HEAD", "master", "main"];

/// Git, driven through the `git` program.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git;

impl Git {
    /// Options for running git in `dir` without ever prompting for credentials.
    fn options(dir: &Path) -> CommandOptions {
        CommandOptions::in_dir(dir).with_env("GIT_TERMINAL_PROMPT", "0")
    }

    fn query(&self, dir: &Path, args: &[&str]) -> Result<String> {
        query_tool_with(self.kind(), self.command_name(), args, &Self::options(dir))
    }

    fn run(&self, request: &DownloadRequest<'_>, dir: &Path, args: &[&str]) -> Result<()> {
        let options = request
            .options_in(dir)
            .with_env("GIT_TERMINAL_PROMPT", "0");
        process::run(self.command_name(), args, &options)?;
        Ok(())
    }

    /// Name of the remote to query: `origin` if configured, else the first one.
    fn remote_name(&self, dir: &Path) -> Result<String> {
        let remotes = self.query(dir, &["remote"])?;
        let names: Vec<&str> = remotes
            .lines()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .collect();

        names
            .iter()
            .find(|name| **name == "origin")
            .or_else(|| names.first())
            .map(|name| name.to_string())
            .ok_or_else(|| SrcpinError::query(self.kind(), "no remote configured"))
    }

    /// Restrict the checkout to `path` via a sparse checkout pattern.
    fn configure_sparse_checkout(&self, request: &DownloadRequest<'_>) -> Result<()> {
        let path = request.path.trim_matches('/');
        tracing::info!("Configuring sparse checkout of '{}'", path);

        self.run(request, request.target_dir, &["config", "core.sparseCheckout", "true"])?;

        let info_dir = request.target_dir.join(".git").join("info");
        fs::create_dir_all(&info_dir)?;
        fs::write(info_dir.join("sparse-checkout"), format!("/{path}\n"))?;
        Ok(())
    }
}

impl VersionControlSystem for Git {
    fn kind(&self) -> VcsKind {
        VcsKind::Git
    }

    fn aliases(&self) -> &'static [&'static str] {
        ALIASES
    }

    fn command_name(&self) -> &'static str {
        "git"
    }

    fn moving_revision_names(&self) -> &'static [&'static str] {
        MOVING_REVISIONS
    }

    fn default_revision(&self) -> &'static str {
        "HEAD"
    }

    fn is_applicable_url(&self, url: &str) -> bool {
        url.trim().trim_end_matches('/').ends_with(".git")
    }

    fn is_valid_tree(&self, dir: &Path) -> bool {
        find_marker_root(dir, |d| d.join(".git").exists()).is_some()
    }

    fn is_shallow(&self, dir: &Path) -> Result<bool> {
        let output = self.query(dir, &["rev-parse", "--is-shallow-repository"])?;
        match output.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(SrcpinError::query(
                self.kind(),
                format!("unexpected shallow state '{other}'"),
            )),
        }
    }

    fn remote_url(&self, dir: &Path) -> Result<String> {
        let remote = self.remote_name(dir)?;
        self.query(dir, &["remote", "get-url", &remote])
    }

    fn revision(&self, dir: &Path) -> Result<String> {
        let revision = self.query(dir, &["rev-parse", "HEAD"])?;
        if is_hex_id(&revision) {
            Ok(revision)
        } else {
            Err(SrcpinError::query(
                self.kind(),
                format!("'{revision}' is not a commit id"),
            ))
        }
    }

    fn root_path(&self, dir: &Path) -> Result<PathBuf> {
        let root = self.query(dir, &["rev-parse", "--show-toplevel"])?;
        if root.is_empty() {
            return Err(SrcpinError::query(self.kind(), "no top-level directory"));
        }
        Ok(PathBuf::from(root))
    }

    fn list_remote_tags(&self, dir: &Path) -> Result<Vec<String>> {
        let remote = self.remote_name(dir)?;
        let output = self.query(dir, &["ls-remote", "--refs", "--tags", &remote])?;
        Ok(parse_ls_remote_tags(&output))
    }

    fn checkout(&self, request: &DownloadRequest<'_>) -> Result<()> {
        let target = request.target_dir;

        self.run(request, target, &["init", "--quiet"])?;
        self.run(request, target, &["remote", "add", "origin", request.url])?;

        if !request.path.is_empty() {
            self.configure_sparse_checkout(request)?;
        }

        let shallow = self.run(
            request,
            target,
            &["fetch", "--quiet", "--depth", "1", "origin", request.revision],
        );

        match shallow {
            Ok(()) => self.run(request, target, &["checkout", "--quiet", "FETCH_HEAD"]),
            Err(e @ SrcpinError::CommandTimeout { .. }) => Err(e),
            Err(e) => {
                tracing::warn!(
                    "Shallow fetch of '{}' failed, fetching full history: {}",
                    request.revision,
                    e
                );
                self.run(request, target, &["fetch", "--quiet", "--tags", "origin"])?;
                self.run(request, target, &["checkout", "--quiet", request.revision])
            }
        }
    }

    fn materialize_nested(
        &self,
        dir: &Path,
        request: &DownloadRequest<'_>,
    ) -> Result<Vec<PathBuf>> {
        if !dir.join(".gitmodules").is_file() {
            return Ok(Vec::new());
        }

        tracing::info!("Initializing submodules in '{}'", dir.display());
        self.run(request, dir, &["submodule", "update", "--init", "--quiet"])?;

        let output = process::run(
            self.command_name(),
            &["config", "--file", ".gitmodules", "--get-regexp", r"^submodule\..*\.path$"],
            &Self::options(dir),
        )?;

        Ok(parse_submodule_paths(&output.stdout)
            .into_iter()
            .map(|path| dir.join(path))
            .collect())
    }
}

/// Tag names from `git ls-remote --refs --tags` output.
pub fn parse_ls_remote_tags(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|reference| reference.strip_prefix("refs/tags/"))
        .map(str::to_string)
        .collect()
}

/// Submodule paths from `git config --get-regexp` output over `.gitmodules`.
pub fn parse_submodule_paths(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_once(char::is_whitespace))
        .map(|(_, path)| path.trim().to_string())
        .filter(|path| !path.is_empty())
        .collect()
}
