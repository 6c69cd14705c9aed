//! Process command implementation.
//!
//! The `srcpin process` command shows what a declared locator resolves to.

use std::io::Write;

use crate::cli::args::ProcessArgs;
use crate::error::Result;
use crate::model::Package;

use super::dispatcher::{write_json, Command, CommandResult};

/// The process command implementation.
pub struct ProcessCommand {
    args: ProcessArgs,
}

impl ProcessCommand {
    /// Create a new process command.
    pub fn new(args: ProcessArgs) -> Self {
        Self { args }
    }
}

impl Command for ProcessCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let declared = self.args.locator.to_locator();
        let package = Package::new(declared.url.clone(), declared);

        tracing::debug!("Processed {} into {}", package.declared, package.processed());
        write_json(out, package.processed())?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::LocatorArgs;

    fn run(locator: LocatorArgs) -> serde_json::Value {
        let cmd = ProcessCommand::new(ProcessArgs { locator });
        let mut out = Vec::new();
        cmd.execute(&mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn fills_gaps_from_url() {
        let json = run(LocatorArgs {
            url: "https://github.com/here/ort/tree/1.0.0/docs".to_string(),
            ..Default::default()
        });

        assert_eq!(json["type"], "Git");
        assert_eq!(json["url"], "https://github.com/here/ort.git");
        assert_eq!(json["revision"], "1.0.0");
        assert_eq!(json["path"], "docs");
    }

    #[test]
    fn empty_url_is_empty_locator() {
        let json = run(LocatorArgs {
            vcs_type: "git".to_string(),
            revision: "v1".to_string(),
            ..Default::default()
        });

        assert_eq!(json["type"], "");
        assert_eq!(json["revision"], "");
    }
}
