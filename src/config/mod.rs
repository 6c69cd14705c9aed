//! Configuration loading and parsing for srcpin.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use srcpin::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".srcpin.yml"), "download:\n  recursive: false\n").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! assert!(!config.download.recursive);
//! ```
//!
//! # Configuration File Locations
//!
//! 1. The path given with `--config` (must exist)
//! 2. `.srcpin.yml` in the current directory
//! 3. Built-in defaults

pub mod loader;
pub mod schema;

pub use loader::{find_config, load_config, load_config_file, parse_config, CONFIG_FILE_NAME};
pub use schema::{DownloadConfig, SrcpinConfig};
