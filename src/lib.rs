//! srcpin - Deterministic source checkouts from declared package metadata.
//!
//! Package metadata states where source code lives in many loose ways: a
//! browsing URL on a hosting provider, a raw clone URL, sometimes a VCS type,
//! revision or sub-path. srcpin normalizes that into a [`model::Locator`],
//! picks one of five VCS backends and checks out exactly the requested
//! revision, refusing revisions that would not reproduce.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and parsing
//! - [`download`] - Checkout orchestration
//! - [`error`] - Error types and result aliases
//! - [`model`] - Locators and packages
//! - [`process`] - External command execution
//! - [`vcs`] - VCS backends, registry, URL decomposition and working trees
//! - [`versions`] - Fuzzy version-to-tag matching and tool versions
//!
//! # Example
//!
//! ```
//! use srcpin::model::{Locator, Package};
//!
//! let package = Package::new(
//!     "Maven:org.example:lib:1.0.0",
//!     Locator::new("", "https://github.com/example/lib/tree/v1.0.0/core", "", ""),
//! );
//!
//! let processed = package.processed();
//! assert_eq!(processed.vcs_type, "Git");
//! assert_eq!(processed.url, "https://github.com/example/lib.git");
//! assert_eq!(processed.revision, "v1.0.0");
//! assert_eq!(processed.path, "core");
//! ```
//!
//! For checkouts against real repositories, see the integration tests.

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod model;
pub mod process;
pub mod vcs;
pub mod versions;

pub use error::{Result, SrcpinError};
