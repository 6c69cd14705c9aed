//! External process execution for VCS tools.

pub mod command;

pub use command::{command_line, execute, run, CommandOptions, CommandOutput};
