//! Split command implementation.
//!
//! The `srcpin split` command decomposes a browsing URL into a locator.

use std::io::Write;

use crate::cli::args::SplitArgs;
use crate::error::Result;
use crate::vcs::split_url;

use super::dispatcher::{write_json, Command, CommandResult};

/// The split command implementation.
pub struct SplitCommand {
    args: SplitArgs,
}

impl SplitCommand {
    /// Create a new split command.
    pub fn new(args: SplitArgs) -> Self {
        Self { args }
    }
}

impl Command for SplitCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let locator = split_url(&self.args.url);
        write_json(out, &locator)?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_host_passes_url_through() {
        let cmd = SplitCommand::new(SplitArgs {
            url: "https://example.org/some/project".to_string(),
        });
        let mut out = Vec::new();

        cmd.execute(&mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["type"], "");
        assert_eq!(json["url"], "https://example.org/some/project");
    }
}
