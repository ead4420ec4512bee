// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git invocation layer.
//!
//! ```text
//! queries (read)  --> gix, in-process, no subprocess
//!   is_git_repo  current_branch  remote_url
//!
//! mutations (write) --> ShellInvoker, git CLI via tokio::process
//!   GitRequest { op, local_path, remote_url, branch? }
//!        |
//!        v
//!   GitOutcome { exit_code, stdout, stderr }
//!
//! Every child process runs with GIT_TERMINAL_PROMPT=0 and
//! GCM_INTERACTIVE=never, kill_on_drop, and a configured timeout.
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::error::{GitError, GixError, ProcessError, WardenResult};


/// The porcelain sub-operation to run against one working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitOp {
    /// Clone the remote into `local_path`.
    Clone,
    /// Create a branch without switching to it.
    Branch,
    /// Check out an existing branch.
    Checkout,
    /// Pull the current branch.
    Pull,
}

impl GitOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::Branch => "branch",
            Self::Checkout => "checkout",
            Self::Pull => "pull",
        }
    }

    /// Whether the operation needs a branch name argument.
    #[must_use]
    pub const fn needs_branch(self) -> bool {
        matches!(self, Self::Branch | Self::Checkout)
    }
}

impl std::fmt::Display for GitOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of git work against one working copy.
#[derive(Debug, Clone)]
pub struct GitRequest {
    pub operation: GitOp,
    pub local_path: PathBuf,
    pub remote_url: String,
    pub branch: Option<String>,
}

/// Exit status and captured output of one git invocation.
#[derive(Debug, Clone)]
pub struct GitOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutcome {
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Capability to run one git sub-operation. The operation driver is
/// generic over this so failures can be scripted in tests.
pub trait GitInvoker: Send + Sync {
    /// Run the request to completion and capture its output.
    fn run(
        &self,
        request: &GitRequest,
    ) -> impl Future<Output = Result<GitOutcome, ProcessError>> + Send;
}

/// Runs git as a child process.
#[derive(Debug, Clone)]
pub struct ShellInvoker {
    program: PathBuf,
    timeout: Duration,
}

impl ShellInvoker {
    /// Resolve the git executable and command timeout from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::ExecutableNotFound` when git is neither
    /// configured nor on PATH.
    pub fn from_config(config: &Config) -> Result<Self, ProcessError> {
        let program = if config.gitops.git_executable.is_empty() {
            which::which("git").map_err(|_| ProcessError::ExecutableNotFound {
                name: "git".to_string(),
            })?
        } else {
            PathBuf::from(&config.gitops.git_executable)
        };
        Ok(Self {
            program,
            timeout: Duration::from_secs(config.gitops.command_timeout_secs),
        })
    }

    /// Build the argument list for a request. Clone targets the
    /// destination path explicitly; everything else runs inside the
    /// working copy.
    fn args_for(request: &GitRequest) -> Vec<String> {
        match request.operation {
            GitOp::Clone => vec![
                "clone".to_string(),
                "--quiet".to_string(),
                request.remote_url.clone(),
                request.local_path.display().to_string(),
            ],
            GitOp::Branch => {
                let mut args = vec!["branch".to_string()];
                if let Some(branch) = &request.branch {
                    args.push(branch.clone());
                }
                args
            }
            GitOp::Checkout => {
                let mut args = vec![
                    "-c".to_string(),
                    "advice.detachedHead=false".to_string(),
                    "checkout".to_string(),
                    "-q".to_string(),
                ];
                if let Some(branch) = &request.branch {
                    args.push(branch.clone());
                }
                args
            }
            GitOp::Pull => vec!["pull".to_string(), "--quiet".to_string()],
        }
    }

    async fn run_inner(&self, request: &GitRequest) -> Result<GitOutcome, ProcessError> {
        let args = Self::args_for(request);
        let command_line = format!("git {}", args.join(" "));

        // Clone runs from the destination's parent, which must exist.
        let cwd = if request.operation == GitOp::Clone {
            let parent = request
                .local_path
                .parent()
                .unwrap_or_else(|| Path::new("."));
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ProcessError::SpawnFailed {
                    command: command_line.clone(),
                    source: e,
                })?;
            parent.to_path_buf()
        } else {
            request.local_path.clone()
        };

        tracing::debug!(command = %command_line, cwd = %cwd.display(), "running git");

        let child = tokio::process::Command::new(&self.program)
            .args(&args)
            .current_dir(&cwd)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GCM_INTERACTIVE", "never")
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| ProcessError::Timeout {
                command: command_line.clone(),
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| ProcessError::SpawnFailed {
                command: command_line,
                source: e,
            })?;

        Ok(GitOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl GitInvoker for ShellInvoker {
    async fn run(&self, request: &GitRequest) -> Result<GitOutcome, ProcessError> {
        self.run_inner(request).await
    }
}

// --- Read-only queries, served in-process by gix ---

/// Check if `path` itself holds a git working copy. Deliberately does
/// not walk up to an enclosing repository: the clone root may well live
/// inside one.
#[must_use]
pub fn is_git_repo(path: &Path) -> bool {
    gix::open(path).is_ok()
}

/// Get current branch name (None if HEAD is detached).
///
/// # Errors
///
/// Returns a `GitError` if the repository cannot be opened or head
/// resolution fails.
pub fn current_branch(path: &Path) -> WardenResult<Option<String>> {
    let repo =
        gix::open(path).map_err(|e| Box::new(GitError::Gix(GixError::Open(Box::new(e)))))?;
    let head = repo
        .head_name()
        .map_err(|e| Box::new(GitError::Gix(GixError::Head(e))))?;
    Ok(head.map(|name| name.shorten().to_string()))
}

/// URL of the `origin` remote, read from the repository configuration.
/// `None` when the path is not a repository or has no such remote.
#[must_use]
pub fn remote_url(path: &Path) -> Option<String> {
    let repo = gix::open(path).ok()?;
    let snapshot = repo.config_snapshot();
    snapshot
        .string("remote.origin.url")
        .map(|value| value.to_string())
}

/// Whether `path` holds a working copy whose `origin` matches
/// `expected`. Used for the clone idempotence check.
#[must_use]
pub fn is_clone_of(path: &Path, expected: &str) -> bool {
    remote_url(path).is_some_and(|url| url == expected)
}
