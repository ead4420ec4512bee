// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command-line interface definitions.
//!
//! # Command Structure
//!
//! ```text
//! gitwarden [GLOBAL OPTIONS] <COMMAND>
//!
//! Commands:
//!   clone <ROOT>            Clone every project below ROOT
//!   branch <ROOT> <NAME>    Create branch NAME in every project below ROOT
//!   checkout <ROOT> <NAME>  Check out NAME in every project below ROOT
//!   pull <ROOT>             Pull every project below ROOT
//!   access <ROOT>           Show effective access below ROOT
//!   options                 Show effective configuration
//!   version                 Show version information
//! ```

mod global;

pub use global::GlobalOptions;

use clap::{Parser, Subcommand};

/// Top-level command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "gitwarden",
    version,
    about = "Recursive GitLab group traversal and bulk git operations",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Global options.
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Clone every project below a group or project path.
    Clone(RootArgs),

    /// Create a branch in every project below a group or project path.
    Branch(BranchArgs),

    /// Check out a branch in every project below a group or project path.
    Checkout(BranchArgs),

    /// Pull every project below a group or project path.
    Pull(RootArgs),

    /// Show who can access the nodes below a group or project path.
    Access(AccessArgs),

    /// Show the effective configuration.
    Options,

    /// Show version information.
    Version,
}

/// Arguments for commands that only take a traversal root.
#[derive(Debug, Clone, clap::Args)]
pub struct RootArgs {
    /// Full path of the group or project to start from,
    /// such as 'platform/tools'.
    pub root: String,
}

/// Arguments for commands that take a root and a branch name.
#[derive(Debug, Clone, clap::Args)]
pub struct BranchArgs {
    /// Full path of the group or project to start from.
    pub root: String,

    /// Name of the branch.
    pub name: String,
}

/// Arguments for the access command.
#[derive(Debug, Clone, clap::Args)]
pub struct AccessArgs {
    /// Full path of the group or project to start from.
    pub root: String,

    /// Restrict the report to a single node below the root.
    #[arg(long, value_name = "PATH")]
    pub path: Option<String>,

    /// Emit the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parses the command-line arguments, exiting on error.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses from an explicit iterator, exiting on error.
    #[must_use]
    pub fn parse_args_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(args)
    }
}
