//! Subversion backend.
//!
//! Subversion has no first-class tags; by convention they are copies below
//! `<repository root>/tags`. Named revisions are therefore checked out from
//! that directory, while numeric revisions are passed to `svn -r`.

use std::path::{Path, PathBuf};

use url::Url;

use super::{find_marker_root, query_tool, DownloadRequest, VcsKind, VersionControlSystem};
use crate::error::{Result, SrcpinError};
use crate::process;

const ALIASES: &[&str] = &["subversion", "svn"];
const MOVING_REVISIONS: &[&str] = &["HEAD", "trunk"];

/// Subversion, driven through the `svn` program.
#[derive(Debug, Clone, Copy, Default)]
pub struct Subversion;

impl Subversion {
    fn query(&self, dir: &Path, args: &[&str]) -> Result<String> {
        query_tool(self.kind(), self.command_name(), dir, args)
    }

    fn info_item(&self, dir: &Path, item: &str) -> Result<String> {
        let value = self.query(dir, &["info", "--non-interactive", "--show-item", item])?;
        if value.is_empty() {
            return Err(SrcpinError::query(
                self.kind(),
                format!("'svn info' reported no {item}"),
            ));
        }
        Ok(value)
    }
}

impl VersionControlSystem for Subversion {
    fn kind(&self) -> VcsKind {
        VcsKind::Subversion
    }

    fn aliases(&self) -> &'static [&'static str] {
        ALIASES
    }

    fn command_name(&self) -> &'static str {
        "svn"
    }

    fn moving_revision_names(&self) -> &'static [&'static str] {
        MOVING_REVISIONS
    }

    fn default_revision(&self) -> &'static str {
        "HEAD"
    }

    fn is_applicable_url(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url.trim()) else {
            return false;
        };

        matches!(parsed.scheme(), "svn" | "svn+ssh")
            || parsed.path().split('/').any(|segment| segment == "svn")
    }

    fn is_valid_tree(&self, dir: &Path) -> bool {
        find_marker_root(dir, |d| d.join(".svn").is_dir()).is_some()
    }

    fn remote_url(&self, dir: &Path) -> Result<String> {
        self.info_item(dir, "url")
    }

    fn revision(&self, dir: &Path) -> Result<String> {
        self.info_item(dir, "revision")
    }

    fn root_path(&self, dir: &Path) -> Result<PathBuf> {
        self.info_item(dir, "wc-root").map(PathBuf::from)
    }

    fn list_remote_tags(&self, dir: &Path) -> Result<Vec<String>> {
        let root = self.info_item(dir, "repos-root-url")?;
        let tags_url = format!("{}/tags", root.trim_end_matches('/'));
        let output = self.query(dir, &["list", "--non-interactive", &tags_url])?;
        Ok(parse_list(&output))
    }

    fn checkout(&self, request: &DownloadRequest<'_>) -> Result<()> {
        let url = checkout_url(request.url, request.revision, request.path);
        let pinned = is_numeric_or_head(request.revision).then_some(request.revision);

        let mut args = vec!["checkout", "--non-interactive"];
        if let Some(revision) = pinned {
            args.extend(["-r", revision]);
        }
        if !request.recursive {
            args.push("--ignore-externals");
        }
        args.extend([url.as_str(), "."]);

        tracing::info!("Checking out '{}'", url);
        process::run(
            self.command_name(),
            &args,
            &request.options_in(request.target_dir),
        )?;
        Ok(())
    }
}

fn is_numeric_or_head(revision: &str) -> bool {
    revision == "HEAD" || (!revision.is_empty() && revision.chars().all(|c| c.is_ascii_digit()))
}

/// The URL to check out `revision` of `url`, narrowed to `path`.
///
/// Numeric revisions and `HEAD` address `url` itself, `trunk` its trunk
/// directory and any other name the tag of that name.
pub fn checkout_url(url: &str, revision: &str, path: &str) -> String {
    let base = url.trim_end_matches('/');
    let path = path.trim_matches('/');

    let mut target = if is_numeric_or_head(revision) {
        base.to_string()
    } else if revision == "trunk" {
        format!("{base}/trunk")
    } else {
        format!("{base}/tags/{revision}")
    };

    if !path.is_empty() {
        target.push('/');
        target.push_str(path);
    }
    target
}

/// Entry names from `svn list` output; directories carry a trailing `/`.
pub fn parse_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim().trim_end_matches('/'))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
