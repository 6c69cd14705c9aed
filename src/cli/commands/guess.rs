//! Guess command implementation.
//!
//! The `srcpin guess` command looks for the tag of a package version among
//! the remote tags of a working tree. An empty `revision` in the report means
//! no tag matched.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::GuessArgs;
use crate::error::Result;
use crate::vcs::for_directory;

use super::dispatcher::{write_json, Command, CommandResult};

#[derive(Debug, Serialize)]
struct GuessReport<'a> {
    project: &'a str,
    version: &'a str,
    revision: String,
}

/// The guess command implementation.
pub struct GuessCommand {
    working_dir: PathBuf,
    args: GuessArgs,
}

impl GuessCommand {
    /// Create a new guess command.
    pub fn new(working_dir: &Path, args: GuessArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            args,
        }
    }
}

impl Command for GuessCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let dir = self.working_dir.join(&self.args.dir);
        let tree = for_directory(&dir).ok_or_else(|| {
            anyhow::anyhow!("'{}' is not under version control", dir.display())
        })?;

        let revision = tree.guess_revision_name(&self.args.project, &self.args.package_version)?;

        write_json(
            out,
            &GuessReport {
                project: &self.args.project,
                version: &self.args.package_version,
                revision,
            },
        )?;
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
        let cmd = GuessCommand::new(
            temp.path(),
            GuessArgs {
                dir: PathBuf::from("."),
                project: "ort".to_string(),
                package_version: "1.0.0".to_string(),
            },
        );
        let mut out = Vec::new();

        assert!(cmd.execute(&mut out).is_err());
        assert!(out.is_empty());
    }
}
