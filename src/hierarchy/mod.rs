// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory model of the discovered group/project hierarchy.
//!
//! # Architecture
//!
//! ```text
//! HierarchyBuilder::build(root)
//!        |
//!        v
//!      Tree ---- root Node
//!                 |-- Node (Group)
//!                 |     |-- Node (Project, leaf)
//!                 |-- Node (Project, leaf)
//!        +
//!      BuildReport: prune records, warnings
//! ```
//!
//! The tree is a strict forest rooted at one node. Parents own their
//! children exclusively; there are no back-edges. Ancestor lookups go
//! through `full_path` prefixes instead of stored pointers.

pub mod builder;


use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::access::AccessGrant;

pub use builder::HierarchyBuilder;

/// Attributes carried only by project nodes.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectAttrs {
    pub id: u64,
    /// Where the working copy lives, derived from `full_path` under the
    /// configured root directory.
    pub local_path: PathBuf,
    /// Currently checked-out branch. Lazily populated after local
    /// inspection; `None` until then.
    pub branch: Option<String>,
    /// Clone URL for the repository.
    pub remote_url: String,
}

/// Group or project. The set is closed; traversal and operation logic
/// branch on it exhaustively.
#[derive(Debug, Clone, Serialize)]
pub enum NodeKind {
    Group { id: u64 },
    Project(ProjectAttrs),
}

/// One node of the hierarchy.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    name: String,
    full_path: String,
    kind: NodeKind,
    children: Vec<Node>,
    direct_members: BTreeMap<u64, AccessGrant>,
}

impl Node {
    /// Create a group node with no children yet.
    #[must_use]
    pub fn group(name: impl Into<String>, full_path: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            kind: NodeKind::Group { id },
            children: Vec::new(),
            direct_members: BTreeMap::new(),
        }
    }

    /// Create a project leaf node.
    #[must_use]
    pub fn project(
        name: impl Into<String>,
        full_path: impl Into<String>,
        attrs: ProjectAttrs,
    ) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            kind: NodeKind::Project(attrs),
            children: Vec::new(),
            direct_members: BTreeMap::new(),
        }
    }

    /// Display name, unique only within the parent.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slash-joined path from the root; globally unique.
    #[must_use]
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub const fn is_project(&self) -> bool {
        matches!(self.kind, NodeKind::Project(_))
    }

    /// Ordered children, insertion order as discovered, never re-sorted.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Grants defined directly on this node, keyed by identity id.
    #[must_use]
    pub const fn direct_members(&self) -> &BTreeMap<u64, AccessGrant> {
        &self.direct_members
    }

    #[must_use]
    pub const fn project_attrs(&self) -> Option<&ProjectAttrs> {
        match &self.kind {
            NodeKind::Project(attrs) => Some(attrs),
            NodeKind::Group { .. } => None,
        }
    }

    pub const fn project_attrs_mut(&mut self) -> Option<&mut ProjectAttrs> {
        match &mut self.kind {
            NodeKind::Project(attrs) => Some(attrs),
            NodeKind::Group { .. } => None,
        }
    }

    /// Attach a fully-built child. Project nodes never take children.
    pub fn push_child(&mut self, child: Node) {
        debug_assert!(!self.is_project(), "project nodes are leaves");
        self.children.push(child);
    }

    /// Replace the direct member grants of this node.
    pub fn set_members(&mut self, members: BTreeMap<u64, AccessGrant>) {
        self.direct_members = members;
    }
}

/// A built hierarchy rooted at one node.
#[derive(Debug, Clone, Serialize)]
pub struct Tree {
    root: Node,
}

impl Tree {
    #[must_use]
    pub const fn new(root: Node) -> Self {
        Self { root }
    }

    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    /// All project nodes in depth-first order.
    #[must_use]
    pub fn projects(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        collect_projects(&self.root, &mut out);
        out
    }

    /// Visit every project node mutably, depth-first.
    pub fn for_each_project_mut<F: FnMut(&mut Node)>(&mut self, mut f: F) {
        visit_projects_mut(&mut self.root, &mut f);
    }

    /// Find a node by its `full_path`.
    #[must_use]
    pub fn find(&self, full_path: &str) -> Option<&Node> {
        find_node(&self.root, full_path)
    }

    /// Total number of nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        count_nodes(&self.root)
    }

    #[must_use]
    pub fn project_count(&self) -> usize {
        self.projects().len()
    }
}

fn collect_projects<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    if node.is_project() {
        out.push(node);
    }
    for child in &node.children {
        collect_projects(child, out);
    }
}

fn visit_projects_mut<F: FnMut(&mut Node)>(node: &mut Node, f: &mut F) {
    if node.is_project() {
        f(node);
    }
    for child in &mut node.children {
        visit_projects_mut(child, f);
    }
}

fn find_node<'a>(node: &'a Node, full_path: &str) -> Option<&'a Node> {
    if node.full_path == full_path {
        return Some(node);
    }
    node.children
        .iter()
        .find_map(|child| find_node(child, full_path))
}

fn count_nodes(node: &Node) -> usize {
    1 + node.children.iter().map(count_nodes).sum::<usize>()
}

/// Why a discovered node was excluded from the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PruneReason {
    /// The platform reported no access. Expected, not an error.
    AccessDenied,
    /// Enumeration kept failing after retries; access is unknown.
    EnumerationFailed,
    /// The `full_path` was already present elsewhere in the tree.
    Duplicate,
}

impl PruneReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessDenied => "access denied",
            Self::EnumerationFailed => "enumeration failed",
            Self::Duplicate => "duplicate path",
        }
    }
}

/// One node excluded during the build.
#[derive(Debug, Clone, Serialize)]
pub struct PruneRecord {
    pub path: String,
    pub reason: PruneReason,
    pub detail: String,
}

/// What the build skipped or could not enumerate.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Nodes excluded from the tree.
    pub pruned: Vec<PruneRecord>,
    /// Nodes retained despite a failed member listing.
    pub warnings: Vec<String>,
}

impl BuildReport {
    /// Whether any subtree was excluded because enumeration kept
    /// failing, as opposed to a plain access prune.
    #[must_use]
    pub fn has_enumeration_failures(&self) -> bool {
        self.pruned
            .iter()
            .any(|record| record.reason == PruneReason::EnumerationFailed)
    }
}
