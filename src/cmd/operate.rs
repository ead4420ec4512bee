// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bulk git operation commands: clone, branch, checkout, pull.

use crate::cmd::RunStatus;
use crate::config::Config;
use crate::error::Result;
use crate::git::{GitOp, ShellInvoker};
use crate::gitlab::GitlabClient;
use crate::hierarchy::{BuildReport, HierarchyBuilder, Tree};
use crate::ops::{OperationDriver, OperationStatus};

/// Main handler for the clone, branch, checkout and pull commands.
///
/// Builds the hierarchy below `root`, then applies `operation` to every
/// project in it. Individual project failures are reported and counted
/// but never stop the remaining projects.
///
/// # Errors
///
/// Returns an error if the root path cannot be resolved, if the token
/// is missing, or if no usable git executable is found. Per-project
/// failures degrade the run status instead.
pub async fn run_operation_command(
    operation: GitOp,
    root: &str,
    branch: Option<String>,
    config: &Config,
) -> Result<RunStatus> {
    config.validate_api_access()?;
    let invoker = ShellInvoker::from_config(config)?;

    let client = GitlabClient::new(config.api_base(), config.gitlab.token.clone());
    let builder = HierarchyBuilder::new(client, config);
    let driver = OperationDriver::new(invoker, config);

    let build_cancel = builder.cancel_token();
    let op_cancel = driver.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl+C, interrupting...");
            build_cancel.cancel();
            op_cancel.cancel();
        }
    });

    let (mut tree, report) = builder.build(root).await?;
    report_build(&report);

    let results = driver.run(&mut tree, operation, branch).await;

    let mut failed = 0usize;
    for result in &results {
        if result.status == OperationStatus::Failed {
            failed += 1;
        }
        println!(
            "{:>7}  {}  {}",
            result.status.as_str(),
            result.node_path,
            result.detail
        );
    }

    print_project_rows(&tree);
    summarize(&tree, results.len(), failed);

    if failed > 0 || report.has_enumeration_failures() {
        Ok(RunStatus::Degraded)
    } else {
        Ok(RunStatus::Clean)
    }
}

/// Prints what the hierarchy build skipped or could not reach.
pub(crate) fn report_build(report: &BuildReport) {
    for record in &report.pruned {
        tracing::info!(
            path = %record.path,
            reason = record.reason.as_str(),
            detail = %record.detail,
            "excluded from tree"
        );
    }
    for warning in &report.warnings {
        tracing::warn!("{warning}");
    }
}

/// One plain row per project: name, path, branch and remote.
fn print_project_rows(tree: &Tree) {
    for node in tree.projects() {
        let Some(attrs) = node.project_attrs() else {
            continue;
        };
        let branch = attrs.branch.as_deref().unwrap_or("-");
        println!(
            "{}  {}  {}  {}",
            node.name(),
            node.full_path(),
            branch,
            attrs.remote_url
        );
    }
}

fn summarize(tree: &Tree, total: usize, failed: usize) {
    if failed > 0 {
        eprintln!(
            "{failed} of {total} operations failed under '{}'",
            tree.root().full_path()
        );
    } else {
        tracing::info!(total, "bulk operation finished");
    }
}
