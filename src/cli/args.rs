//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::Locator;

/// srcpin - Resolve declared source locations and check them out reproducibly.
#[derive(Debug, Parser)]
#[command(name = "srcpin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides .srcpin.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decompose a browsing URL into a locator
    Split(SplitArgs),

    /// Show the processed locator for a declared one
    Process(ProcessArgs),

    /// Identify the VCS governing a directory
    Detect(DetectArgs),

    /// Check out a declared locator
    Download(DownloadArgs),

    /// Guess the tag naming a package version
    Guess(GuessArgs),
}

/// Arguments for the `split` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SplitArgs {
    /// URL to decompose
    pub url: String,
}

/// A declared locator given on the command line.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LocatorArgs {
    /// Clone or browsing URL
    #[arg(long)]
    pub url: String,

    /// VCS type, e.g. git, hg, svn
    #[arg(long = "type", default_value = "")]
    pub vcs_type: String,

    /// Revision to check out
    #[arg(long, default_value = "")]
    pub revision: String,

    /// Sub-path within the repository
    #[arg(long, default_value = "")]
    pub path: String,
}

impl LocatorArgs {
    /// The declared locator these arguments describe.
    pub fn to_locator(&self) -> Locator {
        Locator::new(&self.vcs_type, &self.url, &self.revision, &self.path)
    }
}

/// Arguments for the `process` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ProcessArgs {
    #[command(flatten)]
    pub locator: LocatorArgs,
}

/// Arguments for the `detect` command.
#[derive(Debug, Clone, clap::Args)]
pub struct DetectArgs {
    /// Directory to probe
    pub dir: PathBuf,

    /// Report this path relative to the checkout root (defaults to none)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the `download` command.
#[derive(Debug, Clone, clap::Args)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub locator: LocatorArgs,

    /// Directory to check out into
    #[arg(long)]
    pub target: PathBuf,

    /// Accept revisions that move over time, like `master`
    #[arg(long)]
    pub allow_moving_revisions: bool,

    /// Leave nested repositories as empty placeholders
    #[arg(long)]
    pub no_recursive: bool,
}

/// Arguments for the `guess` command.
#[derive(Debug, Clone, clap::Args)]
pub struct GuessArgs {
    /// Working tree whose remote tags are searched
    pub dir: PathBuf,

    /// Project name, used to break ties
    #[arg(long)]
    pub project: String,

    /// Package version to look for
    #[arg(long = "version")]
    pub package_version: String,
}
