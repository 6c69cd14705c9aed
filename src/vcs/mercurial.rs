//! Mercurial backend.

use std::path::{Path, PathBuf};

use url::Url;

use super::{
    find_marker_root, is_hex_id, query_tool, DownloadRequest, VcsKind, VersionControlSystem,
};
use crate::error::{Result, SrcpinError};
use crate::process;

const ALIASES: &[&str] = &["mercurial", "hg"];
const MOVING_REVISIONS: &[&str] = &["tip", "default"];

/// Mercurial, driven through the `hg` program.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mercurial;

impl Mercurial {
    fn query(&self, dir: &Path, args: &[&str]) -> Result<String> {
        query_tool(self.kind(), self.command_name(), dir, args)
    }
}

impl VersionControlSystem for Mercurial {
    fn kind(&self) -> VcsKind {
        VcsKind::Mercurial
    }

    fn aliases(&self) -> &'static [&'static str] {
        ALIASES
    }

    fn command_name(&self) -> &'static str {
        "hg"
    }

    fn moving_revision_names(&self) -> &'static [&'static str] {
        MOVING_REVISIONS
    }

    fn default_revision(&self) -> &'static str {
        "default"
    }

    fn is_applicable_url(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url.trim()) else {
            return false;
        };

        let host_matches = parsed
            .host_str()
            .is_some_and(|host| host.to_ascii_lowercase().starts_with("hg."));

        host_matches || parsed.path().split('/').any(|segment| segment == "hg")
    }

    fn is_valid_tree(&self, dir: &Path) -> bool {
        find_marker_root(dir, |d| d.join(".hg").is_dir()).is_some()
    }

    fn remote_url(&self, dir: &Path) -> Result<String> {
        self.query(dir, &["paths", "default"])
    }

    fn revision(&self, dir: &Path) -> Result<String> {
        let id = self.query(dir, &["--debug", "id", "-i"])?;
        let id = id.trim_end_matches('+');

        if is_hex_id(id) {
            Ok(id.to_string())
        } else {
            Err(SrcpinError::query(
                self.kind(),
                format!("'{id}' is not a changeset id"),
            ))
        }
    }

    fn root_path(&self, dir: &Path) -> Result<PathBuf> {
        self.query(dir, &["root"]).map(PathBuf::from)
    }

    fn list_remote_tags(&self, dir: &Path) -> Result<Vec<String>> {
        let output = self.query(dir, &["tags"])?;
        Ok(parse_tags(&output))
    }

    fn checkout(&self, request: &DownloadRequest<'_>) -> Result<()> {
        let target = request.target_dir;
        let options = request.options_in(target);
        let hg = self.command_name();

        process::run(hg, &["clone", "--noupdate", request.url, "."], &options)?;

        if !request.path.is_empty() {
            tracing::info!("Restricting checkout to '{}'", request.path);
            let include = format!("path:{}", request.path.trim_matches('/'));
            process::run(
                hg,
                &["--config", "extensions.sparse=", "debugsparse", "--include", &include],
                &options,
            )?;
        }

        let mut update = Vec::new();
        if !request.path.is_empty() {
            update.extend(["--config", "extensions.sparse="]);
        }
        if !request.recursive {
            update.extend(["--config", "subrepos.allowed=false"]);
        }
        update.extend(["update", "-r", request.revision]);

        process::run(hg, &update, &options)?;
        Ok(())
    }
}

/// Tag names from `hg tags` output, without the always-moving `tip`.
///
/// Each line is the tag name padded with spaces, followed by `rev:node`.
/// Tag names may contain spaces themselves.
pub fn parse_tags(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.trim_end().rsplit_once(char::is_whitespace))
        .map(|(name, _)| name.trim().to_string())
        .filter(|name| !name.is_empty() && name != "tip")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn applicable_urls() {
        assert!(Mercurial.is_applicable_url("https://hg.mozilla.org/mozilla-central"));
        assert!(Mercurial.is_applicable_url("https://example.org/hg/project"));
        assert!(!Mercurial.is_applicable_url("https://example.org/hgweb/project"));
        assert!(!Mercurial.is_applicable_url("https://github.com/owner/hg-tools"));
        assert!(!Mercurial.is_applicable_url("not a url"));
    }

    #[test]
    fn moving_revisions() {
        assert!(!Mercurial.is_fixed_revision("tip"));
        assert!(!Mercurial.is_fixed_revision("default"));
        assert!(Mercurial.is_fixed_revision("1.0"));
    }

    #[test]
    fn marker_directory() {
        let temp = TempDir::new().unwrap();
        assert!(!Mercurial.is_valid_tree(temp.path()));

        fs::create_dir_all(temp.path().join(".hg")).unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        assert!(Mercurial.is_valid_tree(&temp.path().join("src")));
    }

    #[test]
    fn parses_tags() {
        let output = "\
tip                              120:6b1a0e2d4c3f
release 2.0                      118:9f2c1a7b3e4d
1.0                               42:1c4d2e8f0a9b
";
        assert_eq!(parse_tags(output), vec!["release 2.0", "1.0"]);
        assert!(parse_tags("").is_empty());
    }
}
