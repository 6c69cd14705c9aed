//! CVS backend.
//!
//! CVS keeps its bookkeeping in a `CVS/` directory inside every checked out
//! directory. Most working tree queries read those files directly instead
//! of asking the server.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::{
    absolute, find_marker_root, query_tool, DownloadRequest, VcsKind, VersionControlSystem,
};
use crate::error::{Result, SrcpinError};
use crate::process;

const ALIASES: &[&str] = &["cvs"];
const MOVING_REVISIONS: &[&str] = &["HEAD"];

/// CVSROOT access methods that identify a CVS URL.
const CVSROOT_PREFIXES: &[&str] = &[":pserver:", ":ext:", ":ssh:", ":local:"];

/// CVS, driven through the `cvs` program.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cvs;

impl Cvs {
    fn read_admin_file(&self, dir: &Path, name: &str) -> Result<String> {
        let path = dir.join("CVS").join(name);
        fs::read_to_string(&path)
            .map(|content| content.trim().to_string())
            .map_err(|e| SrcpinError::query(self.kind(), format!("{}: {e}", path.display())))
    }

    fn root(&self, dir: &Path) -> Result<PathBuf> {
        cvs_root(dir).ok_or_else(|| {
            SrcpinError::query(
                self.kind(),
                format!("'{}' is not a CVS working directory", dir.display()),
            )
        })
    }
}

impl VersionControlSystem for Cvs {
    fn kind(&self) -> VcsKind {
        VcsKind::Cvs
    }

    fn aliases(&self) -> &'static [&'static str] {
        ALIASES
    }

    fn command_name(&self) -> &'static str {
        "cvs"
    }

    fn moving_revision_names(&self) -> &'static [&'static str] {
        MOVING_REVISIONS
    }

    fn default_revision(&self) -> &'static str {
        "HEAD"
    }

    fn is_applicable_url(&self, url: &str) -> bool {
        let url = url.trim();
        CVSROOT_PREFIXES.iter().any(|prefix| url.starts_with(prefix))
    }

    fn is_valid_tree(&self, dir: &Path) -> bool {
        find_marker_root(dir, |d| d.join("CVS").join("Root").is_file()).is_some()
    }

    fn remote_url(&self, dir: &Path) -> Result<String> {
        let root = self.root(dir)?;
        let cvsroot = self.read_admin_file(&root, "Root")?;
        let repository = self.read_admin_file(&root, "Repository")?;

        Ok(format!(
            "{}/{}",
            cvsroot.trim_end_matches('/'),
            repository.trim_start_matches('/')
        ))
    }

    fn revision(&self, dir: &Path) -> Result<String> {
        let root = self.root(dir)?;

        if let Ok(tag) = self.read_admin_file(&root, "Tag") {
            if let Some(name) = parse_sticky_tag(&tag) {
                return Ok(name);
            }
        }

        let mut entries = Vec::new();
        collect_entries(&root, &root, &mut entries)
            .map_err(|e| SrcpinError::query(self.kind(), e))?;

        if entries.is_empty() {
            return Err(SrcpinError::query(self.kind(), "no file revisions recorded"));
        }

        Ok(revision_digest(entries))
    }

    fn root_path(&self, dir: &Path) -> Result<PathBuf> {
        self.root(dir)
    }

    fn list_remote_tags(&self, dir: &Path) -> Result<Vec<String>> {
        let root = self.root(dir)?;
        let output = query_tool(self.kind(), self.command_name(), &root, &["-q", "status", "-v"])?;
        Ok(parse_existing_tags(&output))
    }

    fn checkout(&self, request: &DownloadRequest<'_>) -> Result<()> {
        let (cvsroot, module) = split_cvs_url(request.url).ok_or_else(|| {
            SrcpinError::query(self.kind(), format!("'{}' names no module", request.url))
        })?;

        let target = absolute(request.target_dir);
        let (Some(parent), Some(name)) = (target.parent(), target.file_name()) else {
            return Err(SrcpinError::query(
                self.kind(),
                format!("cannot check out into '{}'", target.display()),
            ));
        };
        let name = name.to_string_lossy();

        let path = request.path.trim_matches('/');
        let module = if path.is_empty() {
            module.to_string()
        } else {
            format!("{module}/{path}")
        };

        tracing::info!("Checking out module '{}' from '{}'", module, cvsroot);
        process::run(
            self.command_name(),
            &[
                "-q",
                "-d",
                cvsroot,
                "checkout",
                "-r",
                request.revision,
                "-d",
                &*name,
                module.as_str(),
            ],
            &request.options_in(parent),
        )?;
        Ok(())
    }
}

/// Highest ancestor of `dir` in the unbroken chain of directories with a `CVS/`
/// admin directory.
fn cvs_root(dir: &Path) -> Option<PathBuf> {
    let start = find_marker_root(dir, |d| d.join("CVS").join("Root").is_file())?;
    start
        .ancestors()
        .take_while(|d| d.join("CVS").is_dir())
        .last()
        .map(Path::to_path_buf)
}

/// Split a CVS URL into CVSROOT and module at the last `/`.
pub fn split_cvs_url(url: &str) -> Option<(&str, &str)> {
    let (root, module) = url.trim().trim_end_matches('/').rsplit_once('/')?;
    if root.is_empty() || module.is_empty() {
        None
    } else {
        Some((root, module))
    }
}

/// Tag name from a `CVS/Tag` file.
///
/// The first character is the tag kind (`T` branch, `N` non-branch tag); date
/// stickiness (`D`) does not name a revision.
pub fn parse_sticky_tag(content: &str) -> Option<String> {
    let content = content.lines().next()?.trim();
    let mut chars = content.chars();
    match chars.next()? {
        'T' | 'N' => Some(chars.as_str().to_string()).filter(|name| !name.is_empty()),
        _ => None,
    }
}

/// Append the `(path, revision)` pairs of every `CVS/Entries` below `dir`.
fn collect_entries(
    root: &Path,
    dir: &Path,
    entries: &mut Vec<(String, String)>,
) -> std::io::Result<()> {
    let entries_file = dir.join("CVS").join("Entries");
    if entries_file.is_file() {
        let prefix = dir
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();

        for (name, revision) in parse_entries(&fs::read_to_string(&entries_file)?) {
            let path = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };
            entries.push((path, revision));
        }
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() && entry.file_name() != "CVS" {
            collect_entries(root, &entry.path(), entries)?;
        }
    }

    Ok(())
}

/// File names and revisions from a `CVS/Entries` file.
///
/// File lines look like `/name/revision/timestamp/options/tagdate`;
/// directory lines start with `D` and are skipped.
pub fn parse_entries(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| line.strip_prefix('/'))
        .filter_map(|line| {
            let mut fields = line.split('/');
            let name = fields.next()?;
            let revision = fields.next()?;
            (!name.is_empty() && !revision.is_empty())
                .then(|| (name.to_string(), revision.to_string()))
        })
        .collect()
}

/// SHA-256 over the sorted `path revision` pairs, hex encoded.
pub fn revision_digest(mut entries: Vec<(String, String)>) -> String {
    entries.sort();

    let mut hasher = Sha256::new();
    for (path, revision) in &entries {
        hasher.update(format!("{path} {revision}\n").as_bytes());
    }
    hex::encode(&hasher.finalize()[..])
}

/// Tag names from the "Existing Tags" sections of `cvs status -v` output.
pub fn parse_existing_tags(output: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut in_tags = false;

    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed == "Existing Tags:" {
            in_tags = true;
            continue;
        }
        if !in_tags {
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("===") {
            in_tags = false;
            continue;
        }
        if trimmed == "No Tags Exist" {
            continue;
        }

        if let Some(name) = trimmed.split_whitespace().next() {
            if !tags.iter().any(|t| t == name) {
                tags.push(name.to_string());
            }
        }
    }

    tags
}
