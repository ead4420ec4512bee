// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Effective access report command.

use crate::access::{self, AccessGrant};
use crate::cli::AccessArgs;
use crate::cmd::RunStatus;
use crate::config::Config;
use crate::error::Result;
use crate::gitlab::GitlabClient;
use crate::hierarchy::HierarchyBuilder;
use anyhow::anyhow;

/// Main handler for the access command.
///
/// Builds the hierarchy below the given root, resolves inherited
/// membership top-down and prints who can reach each node. With
/// `--path` the report is restricted to that single node.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved, the token is
/// missing, or `--path` names a node that is not in the tree.
pub async fn run_access_command(args: &AccessArgs, config: &Config) -> Result<RunStatus> {
    config.validate_api_access()?;

    let client = GitlabClient::new(config.api_base(), config.gitlab.token.clone());
    let builder = HierarchyBuilder::new(client, config);

    let build_cancel = builder.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl+C, interrupting...");
            build_cancel.cancel();
        }
    });

    let (tree, report) = builder.build(&args.root).await?;
    super::operate::report_build(&report);

    let map = access::resolve(&tree);

    if let Some(ref path) = args.path {
        let Some(effective) = map.get(path) else {
            return Err(anyhow!("'{path}' is not part of the tree below '{}'", args.root));
        };
        if args.json {
            println!("{}", serde_json::to_string_pretty(effective)?);
        } else {
            print_node(path, &map.who_can_access(path));
        }
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        for (path, _) in map.iter() {
            print_node(path, &map.who_can_access(path));
        }
    }

    if report.has_enumeration_failures() {
        Ok(RunStatus::Degraded)
    } else {
        Ok(RunStatus::Clean)
    }
}

fn print_node(path: &str, grants: &[&AccessGrant]) {
    println!("{path}");
    if grants.is_empty() {
        println!("  (no members)");
    }
    for grant in grants {
        let expiry = grant
            .expires_at
            .as_deref()
            .map(|date| format!(" until {date}"))
            .unwrap_or_default();
        println!(
            "  {:<10} {} ({}){expiry}  via {}",
            grant.level.as_str(),
            grant.identity.name,
            grant.identity.username,
            grant.source_path
        );
    }
}
