//! Data model shared with the package-manager layer.
//!
//! - [`Locator`] - immutable `{type, url, revision, path}` source location
//! - [`Package`] - declared and processed locators of one package

pub mod locator;
pub mod package;

pub use locator::{normalize_vcs_url, Locator};
pub use package::Package;
