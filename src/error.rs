//! Error types for srcpin operations.
//!
//! This module defines [`SrcpinError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Malformed locator strings never surface as errors; the URL decomposer
//!   degrades them into an untyped locator instead
//! - Failures of the external VCS tools always surface, either as
//!   [`SrcpinError::Query`] from working tree queries or as
//!   [`SrcpinError::Download`] from the orchestrator
//! - Use `anyhow::Error` (via `SrcpinError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for srcpin operations.
#[derive(Debug, Error)]
pub enum SrcpinError {
    /// A VCS tool query failed or produced output that could not be parsed.
    #[error("{vcs} query failed: {message}")]
    Query { vcs: String, message: String },

    /// No backend matches the declared type or the URL.
    #[error("Unsupported locator: no VCS for type '{vcs_type}' and url '{url}'")]
    UnsupportedLocator { vcs_type: String, url: String },

    /// The requested revision is a symbolic name whose target moves over time.
    #[error("Revision '{revision}' is a moving {vcs} revision; pass allow_moving_revisions to accept it")]
    MovingRevision { vcs: String, revision: String },

    /// Checkout or clone failed. The target directory is in an unreliable state.
    #[error("Download of '{url}' failed: {message}")]
    Download { url: String, message: String },

    /// External command exited unsuccessfully or could not be started.
    #[error("Command failed with exit code {code:?}: {command}{}", stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// External command exceeded its time budget and was killed.
    #[error("Command timed out after {timeout_secs}s: {command}")]
    CommandTimeout { command: String, timeout_secs: u64 },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{trimmed}")
    }
}

impl SrcpinError {
    /// Wrap any error as a query failure of the given VCS.
    pub fn query(vcs: impl ToString, err: impl ToString) -> Self {
        Self::Query {
            vcs: vcs.to_string(),
            message: err.to_string(),
        }
    }

    /// Wrap any error as a download failure for the given URL.
    ///
    /// Errors that already are download failures pass through unchanged.
    pub fn download(url: &str, err: SrcpinError) -> Self {
        match err {
            download @ Self::Download { .. } => download,
            other => Self::Download {
                url: url.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias for srcpin operations.
pub type Result<T> = std::result::Result<T, SrcpinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_displays_vcs_and_message() {
        let err = SrcpinError::query("Git", "not a working tree");
        let msg = err.to_string();
        assert!(msg.contains("Git"));
        assert!(msg.contains("not a working tree"));
    }

    #[test]
    fn unsupported_locator_displays_type_and_url() {
        let err = SrcpinError::UnsupportedLocator {
            vcs_type: "darcs".into(),
            url: "https://example.com/repo".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("darcs"));
        assert!(msg.contains("https://example.com/repo"));
    }

    #[test]
    fn moving_revision_mentions_override() {
        let err = SrcpinError::MovingRevision {
            vcs: "Git".into(),
            revision: "master".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("master"));
        assert!(msg.contains("allow_moving_revisions"));
    }

    #[test]
    fn command_failed_attaches_stderr() {
        let err = SrcpinError::CommandFailed {
            command: "git rev-parse HEAD".into(),
            code: Some(128),
            stderr: "fatal: not a git repository\n".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("git rev-parse HEAD"));
        assert!(msg.contains("128"));
        assert!(msg.ends_with("fatal: not a git repository"));
    }

    #[test]
    fn command_failed_without_stderr_has_no_trailing_newline() {
        let err = SrcpinError::CommandFailed {
            command: "svn info".into(),
            code: Some(1),
            stderr: "  ".into(),
        };
        assert!(!err.to_string().contains('\n'));
    }

    #[test]
    fn download_wraps_other_errors() {
        let err = SrcpinError::download(
            "https://example.com/repo.git",
            SrcpinError::CommandTimeout {
                command: "git fetch".into(),
                timeout_secs: 5,
            },
        );
        match err {
            SrcpinError::Download { url, message } => {
                assert_eq!(url, "https://example.com/repo.git");
                assert!(message.contains("timed out"));
            }
            other => panic!("Expected Download, got {other:?}"),
        }
    }

    #[test]
    fn download_does_not_double_wrap() {
        let inner = SrcpinError::Download {
            url: "a".into(),
            message: "boom".into(),
        };
        let err = SrcpinError::download("b", inner);
        assert!(matches!(err, SrcpinError::Download { ref url, .. } if url == "a"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: SrcpinError = io_err.into();
        assert!(matches!(err, SrcpinError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(SrcpinError::query("Cvs", "test"))
        }
        assert!(returns_error().is_err());
    }
}
