// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Global CLI options available for all commands.
//!
//! # Option Precedence
//!
//! ```text
//! --config FILE     ← Additional config files (can repeat)
//! --dry             ← Report without running git
//! --log-level N     ← Console verbosity (0-5)
//! --file-log-level  ← File verbosity (overrides --log-level)
//! --root DIR        ← paths.root override
//! --url URL         ← gitlab.url override
//! --set KEY=VAL     ← Direct config override
//!
//! Precedence: CLI flags/--set > WARDEN_* env > --config > gitwarden.toml > defaults
//! ```

use clap::Args;
use std::path::PathBuf;

/// Global options available for all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Path to additional TOML configuration file(s).
    /// Can be specified multiple times.
    #[arg(short = 'c', long = "config", value_name = "FILE", action = clap::ArgAction::Append)]
    pub configs: Vec<PathBuf>,

    /// Reports what each git operation would do without running it.
    #[arg(long)]
    pub dry: bool,

    /// Console log level (0=silent, 1=errors, 2=warnings, 3=info, 4=debug, 5=trace).
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL",
          value_parser = clap::value_parser!(u8).range(0..=5))]
    pub log_level: Option<u8>,

    /// File log level, overrides --log-level for the log file.
    #[arg(long = "file-log-level", value_name = "LEVEL",
          value_parser = clap::value_parser!(u8).range(0..=5))]
    pub file_log_level: Option<u8>,

    /// Path to log file.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Root directory under which working copies mirror the remote
    /// namespace layout.
    #[arg(short = 'd', long = "root", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Base URL of the GitLab instance.
    #[arg(long = "url", value_name = "URL")]
    pub url: Option<String>,

    /// Sets an option, such as 'traversal.retry_attempts=5'.
    /// Can be specified multiple times.
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", action = clap::ArgAction::Append)]
    pub options: Vec<String>,
}

impl GlobalOptions {
    /// Converts command-line options to `key=value` configuration
    /// overrides, applied on top of files and environment.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let mut overrides = self.options.clone();

        if let Some(level) = self.log_level {
            overrides.push(format!("global.output_log_level={level}"));
        }

        // file_log_level falls back to log_level if not specified
        if let Some(level) = self.file_log_level.or(self.log_level) {
            overrides.push(format!("global.file_log_level={level}"));
        }

        if let Some(ref path) = self.log_file {
            overrides.push(format!("global.log_file={}", path.display()));
        }

        if self.dry {
            overrides.push("global.dry=true".to_string());
        }

        if let Some(ref root) = self.root {
            overrides.push(format!("paths.root={}", root.display()));
        }

        if let Some(ref url) = self.url {
            overrides.push(format!("gitlab.url={url}"));
        }

        overrides
    }
}
