//! Download command implementation.
//!
//! The `srcpin download` command checks out a declared locator and reports
//! the locator of the resulting working tree.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::DownloadArgs;
use crate::config::DownloadConfig;
use crate::download::Downloader;
use crate::error::Result;
use crate::model::{Locator, Package};

use super::dispatcher::{write_json, Command, CommandResult};

/// What `download` reports about the new working tree.
#[derive(Debug, Serialize)]
pub struct DownloadReport {
    #[serde(flatten)]
    pub locator: Locator,

    /// Directory the source code was checked out into.
    pub target: PathBuf,
}

/// The download command implementation.
pub struct DownloadCommand {
    working_dir: PathBuf,
    config: DownloadConfig,
    args: DownloadArgs,
}

impl DownloadCommand {
    /// Create a new download command.
    pub fn new(working_dir: &Path, config: &DownloadConfig, args: DownloadArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config: config.clone(),
            args,
        }
    }

    /// Whether moving revisions are accepted, from the flag or the config.
    pub fn allow_moving_revisions(&self) -> bool {
        self.args.allow_moving_revisions || self.config.allow_moving_revisions
    }

    /// Whether nested repositories are materialized.
    pub fn recursive(&self) -> bool {
        !self.args.no_recursive && self.config.recursive
    }
}

impl Command for DownloadCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let declared = self.args.locator.to_locator();
        let package = Package::new(declared.url.clone(), declared);
        let target = self.working_dir.join(&self.args.target);

        let tree = Downloader::from_config(&self.config).download(
            &package,
            &target,
            self.allow_moving_revisions(),
            self.recursive(),
        )?;

        let mut locator = tree.info(None)?;
        locator.path = package.processed().path.clone();

        write_json(out, &DownloadReport { locator, target })?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::LocatorArgs;
    use crate::error::SrcpinError;
    use tempfile::TempDir;

    fn args(no_recursive: bool, allow_moving_revisions: bool) -> DownloadArgs {
        DownloadArgs {
            locator: LocatorArgs {
                url: "https://example.org/repo.git".to_string(),
                revision: "main".to_string(),
                ..Default::default()
            },
            target: PathBuf::from("out"),
            allow_moving_revisions,
            no_recursive,
        }
    }

    #[test]
    fn flags_override_config() {
        let config = DownloadConfig::default();
        let cmd = DownloadCommand::new(Path::new("/w"), &config, args(true, true));
        assert!(!cmd.recursive());
        assert!(cmd.allow_moving_revisions());

        let cmd = DownloadCommand::new(Path::new("/w"), &config, args(false, false));
        assert!(cmd.recursive());
        assert!(!cmd.allow_moving_revisions());
    }

    #[test]
    fn config_can_allow_moving_revisions() {
        let config = DownloadConfig {
            allow_moving_revisions: true,
            recursive: false,
            ..Default::default()
        };
        let cmd = DownloadCommand::new(Path::new("/w"), &config, args(false, false));
        assert!(cmd.allow_moving_revisions());
        assert!(!cmd.recursive());
    }

    #[test]
    fn moving_revision_is_rejected() {
        let temp = TempDir::new().unwrap();
        let cmd = DownloadCommand::new(temp.path(), &DownloadConfig::default(), args(false, false));
        let mut out = Vec::new();

        let err = cmd.execute(&mut out).unwrap_err();

        assert!(matches!(err, SrcpinError::MovingRevision { .. }));
        assert!(!temp.path().join("out").exists());
    }
}
