//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Reports are JSON
//! written to the output the dispatcher is given; logs go elsewhere.

pub mod detect;
pub mod dispatcher;
pub mod download;
pub mod guess;
pub mod process;
pub mod split;

pub use dispatcher::{write_json, Command, CommandDispatcher, CommandResult};
