// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for gitwarden.
//!
//! # Config Structure
//!
//! ```text
//! Config: GlobalConfig, GitlabConfig, TraversalConfig, GitOpsConfig, PathsConfig
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::LogLevel;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Log level for stdout output (0-5).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-5).
    pub file_log_level: LogLevel,
    /// Path to log file. Empty disables file logging.
    pub log_file: PathBuf,
    /// Report what would be done without running git commands.
    pub dry: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: PathBuf::new(),
            dry: false,
        }
    }
}

/// GitLab instance connection options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitlabConfig {
    /// Base URL of the GitLab instance, without trailing slash.
    pub url: String,
    /// Personal access token. Hidden in formatted output.
    pub token: String,
}

impl Default for GitlabConfig {
    fn default() -> Self {
        Self {
            url: "https://gitlab.com".to_string(),
            token: String::new(),
        }
    }
}

/// Traversal tuning options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Maximum concurrent directory requests while expanding siblings.
    pub max_parallel_requests: usize,
    /// Retry attempts for transient directory failures before the
    /// subtree is recorded as enumeration-failed.
    pub retry_attempts: u32,
    /// Base backoff between retries, milliseconds. Doubles per attempt.
    pub retry_backoff_ms: u64,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_parallel_requests: 8,
            retry_attempts: 3,
            retry_backoff_ms: 250,
        }
    }
}

/// Bulk git operation tuning options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitOpsConfig {
    /// Maximum projects operated on concurrently. 0 means one per core.
    pub max_parallel_ops: usize,
    /// Timeout for a single git command, in seconds.
    pub command_timeout_secs: u64,
    /// Override for the git executable. Empty uses PATH lookup.
    pub git_executable: String,
}

impl Default for GitOpsConfig {
    fn default() -> Self {
        Self {
            max_parallel_ops: 4,
            command_timeout_secs: 600,
            git_executable: String::new(),
        }
    }
}

/// Local filesystem layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root directory under which project working copies mirror the
    /// remote namespace layout.
    pub root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}
