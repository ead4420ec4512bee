// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Recursive hierarchy discovery.
//!
//! ```text
//! build(root)
//!   get_node ----------------- NotFound/Forbidden => fatal
//!      |
//!      v
//!   expand group (recursive)
//!     list_subgroups  --+-- 403/404  => prune (AccessDenied)
//!     list_projects   --+-- retries exhausted => prune (EnumerationFailed)
//!     list_members    ----- failure => keep node, warn
//!      |
//!      v
//!   siblings expand concurrently (JoinSet, bounded by semaphore),
//!   each subtree built privately, attached in API order
//! ```

use futures_util::future::BoxFuture;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::access::AccessGrant;
use crate::config::Config;
use crate::error::{DirectoryError, WardenError, WardenResult, root_not_found};
use crate::gitlab::{DirectoryClient, GroupInfo, NodeMetadata, ProjectInfo};

use super::{BuildReport, Node, ProjectAttrs, PruneReason, PruneRecord, Tree};

/// Builds a [`Tree`] by recursively querying a [`DirectoryClient`].
pub struct HierarchyBuilder<C> {
    inner: Arc<Inner<C>>,
}

struct Inner<C> {
    client: C,
    root_dir: PathBuf,
    retry_attempts: u32,
    retry_backoff: Duration,
    requests: Semaphore,
    cancel: CancellationToken,
    seen: Mutex<BTreeSet<String>>,
    pruned: Mutex<Vec<PruneRecord>>,
    warnings: Mutex<Vec<String>>,
}

impl<C: DirectoryClient + 'static> HierarchyBuilder<C> {
    /// Create a builder with traversal tuning taken from configuration.
    #[must_use]
    pub fn new(client: C, config: &Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                root_dir: config.paths.root.clone(),
                retry_attempts: config.traversal.retry_attempts,
                retry_backoff: Duration::from_millis(config.traversal.retry_backoff_ms),
                requests: Semaphore::new(config.traversal.max_parallel_requests.max(1)),
                cancel: CancellationToken::new(),
                seen: Mutex::new(BTreeSet::new()),
                pruned: Mutex::new(Vec::new()),
                warnings: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Token to cancel the build. Cancelling stops new expansions; the
    /// partially built tree is still returned.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Discover the hierarchy reachable from `root` (a full path or a
    /// numeric id).
    ///
    /// # Errors
    ///
    /// Fails with [`WardenError::RootNotFound`] when the root does not
    /// exist or is not visible to the authenticated identity. Every
    /// other failure is recorded in the [`BuildReport`] instead.
    pub async fn build(&self, root: &str) -> WardenResult<(Tree, BuildReport)> {
        let inner = Arc::clone(&self.inner);

        let meta = inner
            .with_retry(|| inner.client.get_node(root))
            .await
            .map_err(|err| match err {
                DirectoryError::NotFound { .. } | DirectoryError::Forbidden { .. } => {
                    root_not_found(root)
                }
                other => WardenError::Directory(Box::new(other)),
            })?;

        let root_node = match meta {
            NodeMetadata::Group(group) => {
                inner.claim(&group.full_path).await;
                tracing::info!(path = %group.full_path, "expanding root group");
                match Arc::clone(&inner).expand_group(group.clone()).await {
                    Some(node) => node,
                    // Child enumeration of the root failed entirely;
                    // report it as a bare root rather than aborting.
                    None => Node::group(group.name, group.full_path, group.id),
                }
            }
            NodeMetadata::Project(project) => {
                inner.claim(&project.path_with_namespace).await;
                tracing::info!(path = %project.path_with_namespace, "root is a single project");
                inner.expand_project(project).await
            }
        };

        let report = BuildReport {
            pruned: std::mem::take(&mut *inner.pruned.lock().await),
            warnings: std::mem::take(&mut *inner.warnings.lock().await),
        };
        Ok((Tree::new(root_node), report))
    }
}

impl<C: DirectoryClient + 'static> Inner<C> {
    /// Run one directory query under the request semaphore, retrying
    /// transient failures with doubling backoff. The attempt counter is
    /// local to this call, so concurrent sibling expansions cannot
    /// interfere with each other's retry counts.
    async fn with_retry<T, F, Fut>(&self, f: F) -> Result<T, DirectoryError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, DirectoryError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            let _permit = self.requests.acquire().await.ok();
            let result = f().await;
            drop(_permit);

            match result {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.retry_attempts => {
                    attempt += 1;
                    let delay = self.retry_backoff.saturating_mul(2u32.saturating_pow(attempt - 1));
                    tracing::debug!(attempt, ?delay, error = %err, "transient directory failure, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Claim a `full_path`, returning false if it was already present
    /// anywhere in the tree.
    async fn claim(&self, full_path: &str) -> bool {
        self.seen.lock().await.insert(full_path.to_string())
    }

    async fn record_prune(&self, path: &str, reason: PruneReason, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::warn!(path, ?reason, %detail, "subtree excluded");
        self.pruned.lock().await.push(PruneRecord {
            path: path.to_string(),
            reason,
            detail,
        });
    }

    /// Fetch direct members for one node. A failed member listing keeps
    /// the node with an empty grant set and records a warning.
    async fn fetch_members(
        &self,
        id: u64,
        project: bool,
        full_path: &str,
    ) -> BTreeMap<u64, AccessGrant> {
        match self.with_retry(|| self.client.list_members(id, project)).await {
            Ok(members) => members
                .iter()
                .filter_map(|member| AccessGrant::from_member(member, full_path))
                .map(|grant| (grant.identity.id, grant))
                .collect(),
            Err(err) => {
                let warning = format!("{full_path}: member listing failed: {err}");
                tracing::warn!(path = full_path, error = %err, "member listing failed, node kept");
                self.warnings.lock().await.push(warning);
                BTreeMap::new()
            }
        }
    }

    /// Expand one group into a subtree. Returns `None` when the group
    /// must be excluded (no access, or enumeration kept failing).
    ///
    /// The subtree is built into a private local structure and only
    /// attached to the parent by the caller after completion.
    fn expand_group(self: Arc<Self>, group: GroupInfo) -> BoxFuture<'static, Option<Node>> {
        Box::pin(async move {
            let this = &*self;
            let mut node = Node::group(group.name.clone(), group.full_path.clone(), group.id);

            if this.cancel.is_cancelled() {
                return Some(node);
            }

            let subgroups = match this
                .with_retry(|| this.client.list_subgroups(group.id))
                .await
            {
                Ok(subgroups) => subgroups,
                Err(err) => {
                    this.exclude(&group.full_path, &err, "listing sub-groups").await;
                    return None;
                }
            };
            let projects = match this.with_retry(|| this.client.list_projects(group.id)).await {
                Ok(projects) => projects,
                Err(err) => {
                    this.exclude(&group.full_path, &err, "listing projects").await;
                    return None;
                }
            };

            node.set_members(this.fetch_members(group.id, false, &group.full_path).await);

            // Sub-groups expand concurrently; indices restore API order
            // before the children are attached.
            let mut tasks: JoinSet<(usize, Option<Node>)> = JoinSet::new();
            for (idx, sub) in subgroups.into_iter().enumerate() {
                if this.cancel.is_cancelled() {
                    break;
                }
                if !this.claim(&sub.full_path).await {
                    this.record_prune(&sub.full_path, PruneReason::Duplicate, "already in tree")
                        .await;
                    continue;
                }
                let inner = Arc::clone(&self);
                tasks.spawn(async move { (idx, inner.expand_group(sub).await) });
            }

            let mut expanded: Vec<(usize, Node)> = Vec::new();
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((idx, Some(child))) => expanded.push((idx, child)),
                    Ok((_, None)) => {}
                    Err(err) => tracing::warn!(error = %err, "subtree expansion task failed"),
                }
            }
            expanded.sort_by_key(|(idx, _)| *idx);
            for (_, child) in expanded {
                node.push_child(child);
            }

            for project in projects {
                if this.cancel.is_cancelled() {
                    break;
                }
                if !this.claim(&project.path_with_namespace).await {
                    this.record_prune(
                        &project.path_with_namespace,
                        PruneReason::Duplicate,
                        "already in tree",
                    )
                    .await;
                    continue;
                }
                node.push_child(this.expand_project(project).await);
            }

            tracing::debug!(
                path = %node.full_path(),
                children = node.children().len(),
                "group expanded"
            );
            Some(node)
        })
    }

    /// Record the exclusion of one subtree, distinguishing "no access"
    /// from "could not tell".
    async fn exclude(&self, path: &str, err: &DirectoryError, while_doing: &str) {
        if err.is_access_denied() {
            self.record_prune(path, PruneReason::AccessDenied, format!("{while_doing}: {err}"))
                .await;
        } else {
            self.record_prune(
                path,
                PruneReason::EnumerationFailed,
                format!("{while_doing}: {err}"),
            )
            .await;
        }
    }

    /// Build a project leaf. Projects have no children, so the only
    /// per-node query is the member listing.
    async fn expand_project(&self, project: ProjectInfo) -> Node {
        let full_path = project.path_with_namespace.clone();
        let attrs = ProjectAttrs {
            id: project.id,
            local_path: local_path_for(&self.root_dir, &full_path),
            branch: None,
            remote_url: project.ssh_url_to_repo,
        };
        let mut node = Node::project(project.name, full_path.clone(), attrs);
        node.set_members(self.fetch_members(project.id, true, &full_path).await);
        node
    }
}

/// Derive the working-copy location for a project: one directory per
/// project at `<root>/<full_path>`.
#[must_use]
pub fn local_path_for(root: &Path, full_path: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in full_path.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}
