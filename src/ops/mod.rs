// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Recursive operation driver.
//!
//! ```text
//! OperationDriver::run(&mut Tree, op, branch?)
//!        |
//!        v
//!   every Project node (groups are transparent containers)
//!        |
//!        v  JoinSet, bounded by semaphore
//!   pre-check --> git invocation --> OperationResult
//!     clone: existing valid copy  => Skipped
//!            wrong remote / dirty => Failed
//!     other: no working copy      => Failed
//!        |
//!        v
//!   branch refresh on the tree (gix, post-run)
//! ```
//!
//! A failure on one project never halts the others. Cancellation stops
//! new operations from starting; projects that never started report
//! `Skipped` and results collected so far are kept.

use std::sync::{Arc, OnceLock};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::git::{self, GitInvoker, GitOp, GitRequest};
use crate::hierarchy::Tree;

#[cfg(test)]
mod tests;

/// Outcome class for one project under one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Success,
    Skipped,
    Failed,
}

impl OperationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "ok",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// One per visited project node per invoked operation.
#[derive(Debug, Clone)]
pub struct OperationResult {
    pub node_path: String,
    pub status: OperationStatus,
    pub detail: String,
}

impl OperationResult {
    fn new(node_path: &str, status: OperationStatus, detail: impl Into<String>) -> Self {
        Self {
            node_path: node_path.to_string(),
            status,
            detail: detail.into(),
        }
    }
}

/// Runs one git sub-operation across every project of a tree.
pub struct OperationDriver<G> {
    invoker: Arc<G>,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
    dry: bool,
}

impl<G: GitInvoker + 'static> OperationDriver<G> {
    /// Create a driver. `gitops.max_parallel_ops = 0` falls back to one
    /// operation per core.
    #[must_use]
    pub fn new(invoker: G, config: &Config) -> Self {
        let parallel = if config.gitops.max_parallel_ops == 0 {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(4)
        } else {
            config.gitops.max_parallel_ops
        };
        Self {
            invoker: Arc::new(invoker),
            permits: Arc::new(Semaphore::new(parallel)),
            cancel: CancellationToken::new(),
            dry: config.global.dry,
        }
    }

    /// Token to stop issuing new operations. In-flight git processes
    /// run to completion and their results are kept.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Apply `operation` to every project node. Operations where
    /// [`GitOp::needs_branch`] holds fail every project up front when
    /// no `branch` is given; nothing reaches the invoker.
    ///
    /// Each project owns its `local_path` exclusively for the duration,
    /// so operations run independently in parallel. Results arrive in
    /// completion order.
    pub async fn run(
        &self,
        tree: &mut Tree,
        operation: GitOp,
        branch: Option<String>,
    ) -> Vec<OperationResult> {
        if operation.needs_branch() && branch.is_none() {
            return tree
                .projects()
                .iter()
                .map(|node| {
                    OperationResult::new(
                        node.full_path(),
                        OperationStatus::Failed,
                        format!("{operation} requires a branch name"),
                    )
                })
                .collect();
        }

        let work: Vec<GitRequest> = tree
            .projects()
            .iter()
            .filter_map(|node| {
                node.project_attrs().map(|attrs| GitRequest {
                    operation,
                    local_path: attrs.local_path.clone(),
                    remote_url: attrs.remote_url.clone(),
                    branch: branch.clone(),
                })
            })
            .collect();
        let paths: Vec<String> = tree
            .projects()
            .iter()
            .map(|node| node.full_path().to_string())
            .collect();

        tracing::info!(projects = work.len(), op = %operation, "starting bulk operation");

        let progress = ProgressBar::new(work.len() as u64);
        progress.set_style(bar_style());

        let mut results = Vec::new();
        let mut tasks: JoinSet<OperationResult> = JoinSet::new();
        for (path, request) in paths.into_iter().zip(work) {
            if self.cancel.is_cancelled() {
                // Everything not yet issued is reported, not dropped.
                results.push(OperationResult::new(
                    &path,
                    OperationStatus::Skipped,
                    "cancelled before start",
                ));
                progress.inc(1);
                continue;
            }
            let invoker = Arc::clone(&self.invoker);
            let permits = Arc::clone(&self.permits);
            let cancel = self.cancel.clone();
            let dry = self.dry;
            tasks.spawn(async move {
                let _permit = permits.acquire().await.ok();
                if cancel.is_cancelled() {
                    return OperationResult::new(
                        &path,
                        OperationStatus::Skipped,
                        "cancelled before start",
                    );
                }
                run_one(&*invoker, &path, &request, dry).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            progress.inc(1);
            match joined {
                Ok(result) => {
                    tracing::debug!(
                        path = %result.node_path,
                        status = result.status.as_str(),
                        "operation finished"
                    );
                    results.push(result);
                }
                Err(err) => tracing::warn!(error = %err, "operation task failed"),
            }
        }
        progress.finish_and_clear();

        refresh_branches(tree);
        results
    }
}

/// Pre-check and run one project. Every failure is captured in the
/// result; nothing propagates.
async fn run_one<G: GitInvoker>(
    invoker: &G,
    path: &str,
    request: &GitRequest,
    dry: bool,
) -> OperationResult {
    match request.operation {
        GitOp::Clone => {
            if git::is_clone_of(&request.local_path, &request.remote_url) {
                return OperationResult::new(
                    path,
                    OperationStatus::Skipped,
                    "already cloned",
                );
            }
            if git::is_git_repo(&request.local_path) {
                return OperationResult::new(
                    path,
                    OperationStatus::Failed,
                    format!(
                        "{} exists but is not a clone of {}",
                        request.local_path.display(),
                        request.remote_url
                    ),
                );
            }
        }
        GitOp::Branch | GitOp::Checkout | GitOp::Pull => {
            if !git::is_git_repo(&request.local_path) {
                return OperationResult::new(
                    path,
                    OperationStatus::Failed,
                    format!("missing local copy at {}", request.local_path.display()),
                );
            }
        }
    }

    if dry {
        return OperationResult::new(
            path,
            OperationStatus::Skipped,
            format!("dry run: would {}", request.operation),
        );
    }

    match invoker.run(request).await {
        Ok(outcome) if outcome.success() => {
            OperationResult::new(path, OperationStatus::Success, outcome.stdout)
        }
        Ok(outcome) => OperationResult::new(
            path,
            OperationStatus::Failed,
            format!("exit {}: {}", outcome.exit_code, outcome.stderr),
        ),
        Err(err) => OperationResult::new(path, OperationStatus::Failed, err.to_string()),
    }
}

fn bar_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} projects",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        })
        .clone()
}

/// Populate the lazily-tracked branch of every project that has a
/// working copy on disk.
fn refresh_branches(tree: &mut Tree) {
    tree.for_each_project_mut(|node| {
        let Some(attrs) = node.project_attrs_mut() else {
            return;
        };
        if git::is_git_repo(&attrs.local_path) {
            attrs.branch = git::current_branch(&attrs.local_path).ok().flatten();
        }
    });
}
