// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{OperationDriver, OperationStatus};
use crate::config::Config;
use crate::error::ProcessError;
use crate::git::{GitInvoker, GitOp, GitOutcome, GitRequest};
use crate::hierarchy::{Node, ProjectAttrs, Tree};

/// Invoker that succeeds everywhere except scripted paths, recording
/// every invocation.
struct ScriptedInvoker {
    fail_suffixes: BTreeSet<String>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl ScriptedInvoker {
    fn new(fail_suffixes: &[&str]) -> (Self, Arc<Mutex<Vec<PathBuf>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                fail_suffixes: fail_suffixes.iter().map(ToString::to_string).collect(),
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl GitInvoker for ScriptedInvoker {
    async fn run(&self, request: &GitRequest) -> Result<GitOutcome, ProcessError> {
        self.calls
            .lock()
            .expect("lock")
            .push(request.local_path.clone());
        let failed = self
            .fail_suffixes
            .iter()
            .any(|suffix| request.local_path.ends_with(suffix));
        if failed {
            Ok(GitOutcome {
                exit_code: 128,
                stdout: String::new(),
                stderr: "fatal: remote hung up".to_string(),
            })
        } else {
            Ok(GitOutcome {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }
}

fn project_leaf(root: &Path, full_path: &str) -> Node {
    Node::project(
        full_path.rsplit('/').next().unwrap_or(full_path),
        full_path,
        ProjectAttrs {
            id: 0,
            local_path: root.join(full_path),
            branch: None,
            remote_url: format!("git@example.com:{full_path}.git"),
        },
    )
}

/// A tree of three projects under one group. None of the local paths
/// exist on disk.
fn three_project_tree(root: &Path) -> Tree {
    let mut group = Node::group("Tools", "tools", 1);
    group.push_child(project_leaf(root, "tools/a"));
    group.push_child(project_leaf(root, "tools/b"));
    group.push_child(project_leaf(root, "tools/c"));
    Tree::new(group)
}

fn status_of(results: &[super::OperationResult], path: &str) -> OperationStatus {
    results
        .iter()
        .find(|r| r.node_path == path)
        .unwrap_or_else(|| panic!("no result for {path}"))
        .status
}

#[tokio::test]
async fn test_partial_failure_isolation() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (invoker, _calls) = ScriptedInvoker::new(&["tools/b"]);
    let driver = OperationDriver::new(invoker, &Config::default());
    let mut tree = three_project_tree(dir.path());

    let results = driver.run(&mut tree, GitOp::Clone, None).await;

    assert_eq!(results.len(), 3, "no early termination");
    assert_eq!(status_of(&results, "tools/a"), OperationStatus::Success);
    assert_eq!(status_of(&results, "tools/b"), OperationStatus::Failed);
    assert_eq!(status_of(&results, "tools/c"), OperationStatus::Success);
    let failure = results
        .iter()
        .find(|r| r.node_path == "tools/b")
        .expect("result for b");
    assert!(failure.detail.contains("remote hung up"));
}

#[tokio::test]
async fn test_groups_are_never_operated_on() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (invoker, calls) = ScriptedInvoker::new(&[]);
    let driver = OperationDriver::new(invoker, &Config::default());
    let mut tree = three_project_tree(dir.path());

    let results = driver.run(&mut tree, GitOp::Clone, None).await;

    assert_eq!(results.len(), 3);
    assert!(
        !results.iter().any(|r| r.node_path == "tools"),
        "group nodes yield no results"
    );
    assert_eq!(calls.lock().expect("lock").len(), 3);
}

#[tokio::test]
async fn test_missing_local_copy_fails_without_invocation() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (invoker, calls) = ScriptedInvoker::new(&[]);
    let driver = OperationDriver::new(invoker, &Config::default());
    let mut tree = three_project_tree(dir.path());

    let results = driver.run(&mut tree, GitOp::Pull, None).await;

    assert_eq!(results.len(), 3);
    for result in &results {
        assert_eq!(result.status, OperationStatus::Failed);
        assert!(result.detail.contains("missing local copy"));
    }
    assert!(
        calls.lock().expect("lock").is_empty(),
        "git is never invoked without a working copy"
    );
}

#[tokio::test]
async fn test_dry_run_skips_everything() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (invoker, calls) = ScriptedInvoker::new(&[]);
    let mut config = Config::default();
    config.global.dry = true;
    let driver = OperationDriver::new(invoker, &config);
    let mut tree = three_project_tree(dir.path());

    let results = driver.run(&mut tree, GitOp::Clone, None).await;

    assert_eq!(results.len(), 3);
    for result in &results {
        assert_eq!(result.status, OperationStatus::Skipped);
        assert!(result.detail.starts_with("dry run"));
    }
    assert!(calls.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn test_branch_op_without_name_fails_every_project() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (invoker, calls) = ScriptedInvoker::new(&[]);
    let driver = OperationDriver::new(invoker, &Config::default());
    let mut tree = three_project_tree(dir.path());

    let results = driver.run(&mut tree, GitOp::Checkout, None).await;

    assert_eq!(results.len(), 3);
    assert!(
        results
            .iter()
            .all(|r| r.status == OperationStatus::Failed
                && r.detail == "checkout requires a branch name")
    );
    assert!(calls.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn test_cancelled_driver_starts_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (invoker, calls) = ScriptedInvoker::new(&[]);
    let driver = OperationDriver::new(invoker, &Config::default());
    driver.cancel_token().cancel();
    let mut tree = three_project_tree(dir.path());

    let results = driver.run(&mut tree, GitOp::Clone, None).await;

    assert_eq!(results.len(), 3);
    assert!(
        results
            .iter()
            .all(|r| r.status == OperationStatus::Skipped && r.detail == "cancelled before start")
    );
    assert!(calls.lock().expect("lock").is_empty());
}
