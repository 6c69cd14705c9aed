//! Version strings: matching tags against package versions and comparing
//! VCS tool versions.
//!
//! - [`filter_version_names`] - fuzzy match of a package version against tag names
//! - [`parse_tool_version`], [`is_version_at_least`] - tool version checks

pub mod filter;
pub mod tool;

pub use filter::filter_version_names;
pub use tool::{is_version_at_least, parse_tool_version};
