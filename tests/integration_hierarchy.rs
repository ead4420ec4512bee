// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the hierarchy builder over HTTP.
//!
//! Runs the real GitLab client against a local mock API and checks the
//! built tree and the access resolution on top of it.

use gitwarden::access;
use gitwarden::config::Config;
use gitwarden::gitlab::GitlabClient;
use gitwarden::hierarchy::HierarchyBuilder;
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(url: &str) -> Config {
    let mut config = Config::default();
    config.gitlab.url = url.to_string();
    config.gitlab.token = "glpat-test".to_string();
    config.traversal.retry_backoff_ms = 0;
    config.paths.root = "/repos".into();
    config
}

fn client(config: &Config) -> GitlabClient {
    GitlabClient::new(config.api_base(), config.gitlab.token.clone())
}

async fn mount_json(server: &MockServer, url_path: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .and(header("PRIVATE-TOKEN", "glpat-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// platform
///   platform/app           (project, direct Maintainer)
///   platform/tools
///     platform/tools/cli   (project)
async fn mount_platform_group(server: &MockServer) {
    mount_json(
        server,
        "/api/v4/groups/platform",
        json!({"id": 1, "name": "platform", "full_path": "platform"}),
    )
    .await;
    mount_json(
        server,
        "/api/v4/groups/1/subgroups",
        json!([{"id": 2, "name": "tools", "full_path": "platform/tools"}]),
    )
    .await;
    mount_json(
        server,
        "/api/v4/groups/1/projects",
        json!([{
            "id": 10,
            "name": "app",
            "path_with_namespace": "platform/app",
            "ssh_url_to_repo": "git@example.com:platform/app.git",
            "default_branch": "main"
        }]),
    )
    .await;
    mount_json(server, "/api/v4/groups/2/subgroups", json!([])).await;
    mount_json(
        server,
        "/api/v4/groups/2/projects",
        json!([{
            "id": 11,
            "name": "cli",
            "path_with_namespace": "platform/tools/cli",
            "ssh_url_to_repo": "git@example.com:platform/tools/cli.git",
            "default_branch": "main"
        }]),
    )
    .await;

    mount_json(
        server,
        "/api/v4/groups/1/members",
        json!([{"id": 100, "username": "owner", "name": "Olive Owner",
                "access_level": 50, "expires_at": null}]),
    )
    .await;
    mount_json(server, "/api/v4/groups/2/members", json!([])).await;
    mount_json(
        server,
        "/api/v4/projects/10/members",
        json!([{"id": 101, "username": "maud", "name": "Maud Maintainer",
                "access_level": 40, "expires_at": "2027-01-01"}]),
    )
    .await;
    mount_json(server, "/api/v4/projects/11/members", json!([])).await;
}

#[tokio::test]
async fn builds_nested_tree_over_http() {
    let server = MockServer::start().await;
    mount_platform_group(&server).await;

    let config = test_config(&server.uri());
    let builder = HierarchyBuilder::new(client(&config), &config);
    let (tree, report) = builder.build("platform").await.unwrap();

    assert!(report.pruned.is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(tree.node_count(), 4);
    assert_eq!(tree.project_count(), 2);

    let cli = tree.find("platform/tools/cli").unwrap();
    let attrs = cli.project_attrs().unwrap();
    assert_eq!(attrs.id, 11);
    assert_eq!(attrs.local_path, Path::new("/repos/platform/tools/cli"));
    assert_eq!(attrs.remote_url, "git@example.com:platform/tools/cli.git");
    assert_eq!(attrs.branch, None);
}

#[tokio::test]
async fn resolves_inherited_access_over_http() {
    let server = MockServer::start().await;
    mount_platform_group(&server).await;

    let config = test_config(&server.uri());
    let builder = HierarchyBuilder::new(client(&config), &config);
    let (tree, _report) = builder.build("platform").await.unwrap();

    let map = access::resolve(&tree);

    // The group owner flows down to the leaf project.
    let grants = map.who_can_access("platform/tools/cli");
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].identity.username, "owner");
    assert_eq!(grants[0].source_path, "platform");

    // The direct maintainer joins the inherited owner, sorted by level.
    let grants = map.who_can_access("platform/app");
    let usernames: Vec<&str> = grants
        .iter()
        .map(|grant| grant.identity.username.as_str())
        .collect();
    assert_eq!(usernames, ["owner", "maud"]);
    assert_eq!(grants[1].source_path, "platform/app");
    assert_eq!(grants[1].expires_at.as_deref(), Some("2027-01-01"));
}

#[tokio::test]
async fn project_root_builds_single_node_tree() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/groups/platform%2Fapp"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_json(
        &server,
        "/api/v4/projects/platform%2Fapp",
        json!({
            "id": 10,
            "name": "app",
            "path_with_namespace": "platform/app",
            "ssh_url_to_repo": "git@example.com:platform/app.git",
            "default_branch": "main"
        }),
    )
    .await;
    mount_json(&server, "/api/v4/projects/10/members", json!([])).await;

    let config = test_config(&server.uri());
    let builder = HierarchyBuilder::new(client(&config), &config);
    let (tree, report) = builder.build("platform/app").await.unwrap();

    assert!(report.pruned.is_empty());
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.project_count(), 1);
    assert!(tree.root().is_project());
}

#[tokio::test]
async fn persistent_server_errors_degrade_but_do_not_abort() {
    let server = MockServer::start().await;

    // Mounted first, so it shadows the healthy listing below.
    Mock::given(method("GET"))
        .and(path("/api/v4/groups/2/subgroups"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_platform_group(&server).await;

    let config = test_config(&server.uri());
    let builder = HierarchyBuilder::new(client(&config), &config);
    let (tree, report) = builder.build("platform").await.unwrap();

    // The rest of the hierarchy is still there.
    assert!(tree.find("platform/app").is_some());
    assert!(report.has_enumeration_failures());
}
