//! Detect command implementation.
//!
//! The `srcpin detect` command identifies the VCS governing a directory and
//! reports the locator of its checkout.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::DetectArgs;
use crate::error::Result;
use crate::model::Locator;
use crate::vcs::for_directory;

use super::dispatcher::{write_json, Command, CommandResult};

/// What `detect` reports about a working tree.
#[derive(Debug, Serialize)]
pub struct DetectReport {
    #[serde(flatten)]
    pub locator: Locator,

    /// Top-level directory of the checkout.
    pub root: PathBuf,

    /// Whether history is truncated.
    pub shallow: bool,

    /// Version of the installed VCS program, if it reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
}

/// The detect command implementation.
pub struct DetectCommand {
    working_dir: PathBuf,
    args: DetectArgs,
}

impl DetectCommand {
    /// Create a new detect command.
    pub fn new(working_dir: &Path, args: DetectArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            args,
        }
    }
}

impl Command for DetectCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let dir = self.working_dir.join(&self.args.dir);
        let tree = for_directory(&dir).ok_or_else(|| {
            anyhow::anyhow!("'{}' is not under version control", dir.display())
        })?;

        let path = self.args.path.as_ref().map(|p| self.working_dir.join(p));
        let report = DetectReport {
            locator: tree.info(path.as_deref())?,
            root: tree.root_path()?,
            shallow: tree.is_shallow()?,
            tool_version: tree.vcs().version().ok(),
        };

        write_json(out, &report)?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn unversioned_directory_fails() {
        let temp = TempDir::new().unwrap();
        let cmd = DetectCommand::new(
            temp.path(),
            DetectArgs {
                dir: PathBuf::from("."),
                path: None,
            },
        );
        let mut out = Vec::new();

        let err = cmd.execute(&mut out).unwrap_err();

        assert!(err.to_string().contains("not under version control"));
        assert!(out.is_empty());
    }
}
