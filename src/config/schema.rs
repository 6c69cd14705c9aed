//! Configuration schema definitions for srcpin.
//!
//! This module contains the struct definitions that map to the
//! `.srcpin.yml` file format.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure for `.srcpin.yml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SrcpinConfig {
    /// Download defaults
    pub download: DownloadConfig,
}

/// Defaults for downloads, overridable per invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadConfig {
    /// Accept revisions that move over time, like `master`
    #[serde(skip_serializing_if = "is_false")]
    pub allow_moving_revisions: bool,

    /// Materialize nested repositories
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Time budget per external command in seconds, 0 for none
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            allow_moving_revisions: false,
            recursive: default_true(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DownloadConfig {
    /// The per-command time budget, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn is_false(v: &bool) -> bool {
    !v
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    600
}
