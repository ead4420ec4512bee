// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   operate (clone, branch, checkout, pull), access, config
//! ```

pub mod access;
pub mod config;
pub mod operate;

/// Outcome of a command that can partially succeed.
///
/// A run is degraded when any project operation failed or when part of
/// the hierarchy could not be enumerated. The process exit code
/// reflects this even though the run itself completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Clean,
    Degraded,
}
