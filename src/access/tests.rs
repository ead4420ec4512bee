// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{AccessGrant, AccessLevel, Identity, resolve};
use crate::hierarchy::{Node, ProjectAttrs, Tree};

fn grant(id: u64, name: &str, level: AccessLevel, source_path: &str) -> AccessGrant {
    AccessGrant {
        identity: Identity {
            id,
            username: name.to_lowercase(),
            name: name.to_string(),
            public_email: None,
        },
        level,
        expires_at: None,
        source_path: source_path.to_string(),
    }
}

fn with_members(mut node: Node, grants: Vec<AccessGrant>) -> Node {
    let members: BTreeMap<u64, AccessGrant> = grants
        .into_iter()
        .map(|g| (g.identity.id, g))
        .collect();
    node.set_members(members);
    node
}

fn leaf(name: &str, full_path: &str) -> Node {
    Node::project(
        name,
        full_path,
        ProjectAttrs {
            id: 0,
            local_path: PathBuf::from("/repos").join(full_path),
            branch: None,
            remote_url: format!("git@example.com:{full_path}.git"),
        },
    )
}

#[test]
fn test_level_decoding() {
    assert_eq!(AccessLevel::from_code(10), Some(AccessLevel::Guest));
    assert_eq!(AccessLevel::from_code(30), Some(AccessLevel::Developer));
    assert_eq!(AccessLevel::from_code(50), Some(AccessLevel::Owner));
    // Unknown intermediate codes floor to the next lower known level.
    assert_eq!(AccessLevel::from_code(35), Some(AccessLevel::Developer));
    assert_eq!(AccessLevel::from_code(60), Some(AccessLevel::Owner));
    // Minimal access (5) carries no repository access.
    assert_eq!(AccessLevel::from_code(5), None);
    assert_eq!(AccessLevel::from_code(0), None);
}

#[test]
fn test_level_ordering() {
    assert!(AccessLevel::Guest < AccessLevel::Reporter);
    assert!(AccessLevel::Maintainer < AccessLevel::Owner);
    assert_eq!(AccessLevel::Developer.as_code(), 30);
    assert_eq!(AccessLevel::Owner.to_string(), "Owner");
}

#[test]
fn test_root_resolution_is_direct_members() {
    let root = with_members(
        Node::group("Tools", "tools", 1),
        vec![grant(1, "Alice", AccessLevel::Owner, "tools")],
    );
    let map = resolve(&Tree::new(root));

    let effective = map.get("tools").expect("root resolved");
    assert_eq!(effective.len(), 1);
    assert_eq!(effective[&1].level, AccessLevel::Owner);
}

#[test]
fn test_inherited_grants_flow_down() {
    let mut root = with_members(
        Node::group("Tools", "tools", 1),
        vec![grant(1, "Alice", AccessLevel::Owner, "tools")],
    );
    let mut mid = Node::group("CI", "tools/ci", 2);
    mid.push_child(leaf("runner", "tools/ci/runner"));
    root.push_child(mid);

    let map = resolve(&Tree::new(root));
    let effective = map.get("tools/ci/runner").expect("leaf resolved");
    assert_eq!(effective[&1].level, AccessLevel::Owner);
    // An inherited grant keeps the path of the node that defined it,
    // which is a strict ancestor here.
    assert_eq!(effective[&1].source_path, "tools");
}

#[test]
fn test_most_specific_wins() {
    // Root grants Owner; the child grants Guest directly. The direct
    // grant wins even though it is the lower level.
    let mut root = with_members(
        Node::group("Tools", "tools", 1),
        vec![grant(1, "Alice", AccessLevel::Owner, "tools")],
    );
    let child = with_members(
        leaf("app", "tools/app"),
        vec![grant(1, "Alice", AccessLevel::Guest, "tools/app")],
    );
    root.push_child(child);

    let map = resolve(&Tree::new(root));
    let effective = map.get("tools/app").expect("child resolved");
    assert_eq!(effective[&1].level, AccessLevel::Guest);
    assert_eq!(effective[&1].source_path, "tools/app");

    // The root itself is unaffected by the child's override.
    assert_eq!(map.get("tools").expect("root")[&1].level, AccessLevel::Owner);
}

#[test]
fn test_override_persists_below_the_overriding_node() {
    let mut root = with_members(
        Node::group("Tools", "tools", 1),
        vec![grant(1, "Alice", AccessLevel::Owner, "tools")],
    );
    let mut mid = with_members(
        Node::group("CI", "tools/ci", 2),
        vec![grant(1, "Alice", AccessLevel::Guest, "tools/ci")],
    );
    mid.push_child(leaf("runner", "tools/ci/runner"));
    root.push_child(mid);

    let map = resolve(&Tree::new(root));
    let effective = map.get("tools/ci/runner").expect("leaf resolved");
    assert_eq!(effective[&1].level, AccessLevel::Guest);
    assert_eq!(effective[&1].source_path, "tools/ci");
}

#[test]
fn test_effective_access_is_superset_of_direct_grants() {
    let mut root = with_members(
        Node::group("Tools", "tools", 1),
        vec![grant(1, "Alice", AccessLevel::Owner, "tools")],
    );
    let child = with_members(
        leaf("app", "tools/app"),
        vec![grant(2, "Bob", AccessLevel::Developer, "tools/app")],
    );
    root.push_child(child);

    let map = resolve(&Tree::new(root));
    let effective = map.get("tools/app").expect("child resolved");
    // Direct grant present verbatim, inherited grant added.
    assert_eq!(effective.len(), 2);
    assert_eq!(effective[&2].level, AccessLevel::Developer);
    assert_eq!(effective[&2].source_path, "tools/app");
    assert_eq!(effective[&1].source_path, "tools");
}

#[test]
fn test_no_grants_resolve_to_empty_mapping() {
    let mut root = Node::group("Tools", "tools", 1);
    root.push_child(leaf("app", "tools/app"));

    let map = resolve(&Tree::new(root));
    assert!(map.get("tools/app").expect("resolved").is_empty());
    assert!(map.who_can_access("tools/app").is_empty());
}

#[test]
fn test_who_can_access_ordering() {
    let root = with_members(
        Node::group("Tools", "tools", 1),
        vec![
            grant(1, "Zoe", AccessLevel::Developer, "tools"),
            grant(2, "Alice", AccessLevel::Owner, "tools"),
            grant(3, "Bob", AccessLevel::Developer, "tools"),
        ],
    );
    let map = resolve(&Tree::new(root));

    let listed: Vec<(&str, AccessLevel)> = map
        .who_can_access("tools")
        .into_iter()
        .map(|g| (g.identity.name.as_str(), g.level))
        .collect();
    // Descending level, ties broken by name.
    assert_eq!(
        listed,
        vec![
            ("Alice", AccessLevel::Owner),
            ("Bob", AccessLevel::Developer),
            ("Zoe", AccessLevel::Developer),
        ]
    );
}

#[test]
fn test_who_can_access_unknown_path() {
    let map = resolve(&Tree::new(Node::group("Tools", "tools", 1)));
    assert!(map.who_can_access("tools/missing").is_empty());
}
