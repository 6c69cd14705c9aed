//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::{Cli, Commands};
use crate::config::SrcpinConfig;
use crate::error::Result;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, writing its report to `out`.
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Write `value` to `out` as pretty-printed JSON followed by a newline.
pub fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(anyhow::Error::from)?;
    writeln!(out)?;
    Ok(())
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    working_dir: PathBuf,
    config: SrcpinConfig,
}

impl CommandDispatcher {
    /// Create a new dispatcher resolving relative paths against `working_dir`.
    pub fn new(working_dir: PathBuf, config: SrcpinConfig) -> Self {
        Self {
            working_dir,
            config,
        }
    }

    /// Get the working directory.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &SrcpinConfig {
        &self.config
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, out: &mut dyn Write) -> Result<CommandResult> {
        match &cli.command {
            Commands::Split(args) => {
                let cmd = super::split::SplitCommand::new(args.clone());
                cmd.execute(out)
            }
            Commands::Process(args) => {
                let cmd = super::process::ProcessCommand::new(args.clone());
                cmd.execute(out)
            }
            Commands::Detect(args) => {
                let cmd = super::detect::DetectCommand::new(&self.working_dir, args.clone());
                cmd.execute(out)
            }
            Commands::Download(args) => {
                let cmd = super::download::DownloadCommand::new(
                    &self.working_dir,
                    &self.config.download,
                    args.clone(),
                );
                cmd.execute(out)
            }
            Commands::Guess(args) => {
                let cmd = super::guess::GuessCommand::new(&self.working_dir, args.clone());
                cmd.execute(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/test"), SrcpinConfig::default());
        assert_eq!(dispatcher.working_dir(), Path::new("/test"));
        assert!(dispatcher.config().download.recursive);
    }

    #[test]
    fn dispatches_split() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/test"), SrcpinConfig::default());
        let cli = Cli::parse_from(["srcpin", "split", "https://gitlab.com/group/proj/tree/v2"]);
        let mut out = Vec::new();

        let result = dispatcher.dispatch(&cli, &mut out).unwrap();

        assert!(result.success);
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["type"], "Git");
        assert_eq!(json["url"], "https://gitlab.com/group/proj.git");
    }

    #[test]
    fn write_json_appends_newline() {
        let mut out = Vec::new();
        write_json(&mut out, &serde_json::json!({"a": 1})).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("}\n"));
    }
}
