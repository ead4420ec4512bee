// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote directory client for the GitLab REST API (v4).
//!
//! ```text
//! DirectoryClient (trait)
//!        |
//!        v
//!   GitlabClient ---- GET /api/v4/groups/:id
//!        |             GET /api/v4/groups/:id/subgroups
//!        |             GET /api/v4/groups/:id/projects
//!        |             GET /api/v4/groups/:id/members
//!        v
//!   status classification
//!     404        -> NotFound
//!     401/403    -> Forbidden
//!     408/429/5xx-> Transient (retryable)
//!     other      -> Http
//!
//! Global client: OnceLock, connection pool, keep-alive
//! Pagination:    per_page=100, follow `page` until a short page
//! ```

use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::DirectoryError;


/// Page size for list endpoints. GitLab caps `per_page` at 100.
const PER_PAGE: usize = 100;

/// Upper bound for a single API request, connection setup included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Metadata for a group node.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    pub id: u64,
    pub name: String,
    pub full_path: String,
}

/// Metadata for a project node.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    pub id: u64,
    pub name: String,
    pub path_with_namespace: String,
    pub ssh_url_to_repo: String,
    #[serde(default)]
    pub http_url_to_repo: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// One membership entry as returned by the members endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberInfo {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub access_level: u8,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub public_email: Option<String>,
}

/// What a root identifier resolved to.
#[derive(Debug, Clone)]
pub enum NodeMetadata {
    Group(GroupInfo),
    Project(ProjectInfo),
}

/// Read-only view of the remote group/project directory.
///
/// Methods return futures that are `Send` so expansion of sibling
/// subtrees can run on separate tasks.
pub trait DirectoryClient: Send + Sync {
    /// Resolve a root identifier (full path or numeric id) to its metadata.
    fn get_node(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<NodeMetadata, DirectoryError>> + Send;

    /// List the immediate sub-groups of a group.
    fn list_subgroups(
        &self,
        group_id: u64,
    ) -> impl Future<Output = Result<Vec<GroupInfo>, DirectoryError>> + Send;

    /// List the projects directly contained in a group.
    fn list_projects(
        &self,
        group_id: u64,
    ) -> impl Future<Output = Result<Vec<ProjectInfo>, DirectoryError>> + Send;

    /// List the direct members of a group or project. Inherited
    /// memberships are resolved locally, so the collapsed `/members/all`
    /// view is deliberately not used here.
    /// `project` selects the project members endpoint.
    fn list_members(
        &self,
        id: u64,
        project: bool,
    ) -> impl Future<Output = Result<Vec<MemberInfo>, DirectoryError>> + Send;
}

/// Global HTTP client - initialized once, reused across all requests.
/// Falls back to a basic client if custom configuration fails.
fn global_client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        Client::builder()
            .user_agent(format!("gitwarden/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

/// Percent-encode a namespace path for use as a single URL segment.
/// GitLab accepts a url-encoded full path wherever it accepts an id.
fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                out.push(byte as char);
            }
            _ => {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}

/// GitLab REST API client, authenticated with a single bearer token.
#[derive(Debug, Clone)]
pub struct GitlabClient {
    client: Client,
    base: String,
    token: String,
}

impl GitlabClient {
    /// Create a client for `base` (e.g. `https://gitlab.com`), without a
    /// trailing slash, using the given personal access token.
    #[must_use]
    pub fn new(base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: global_client().clone(),
            base: base.into(),
            token: token.into(),
        }
    }

    /// Classify a response status, consuming the response on the error path.
    fn classify_status(status: reqwest::StatusCode, url: &str) -> DirectoryError {
        match status.as_u16() {
            404 => DirectoryError::NotFound {
                path: url.to_string(),
            },
            401 | 403 => DirectoryError::Forbidden {
                path: url.to_string(),
            },
            408 | 429 | 500..=599 => DirectoryError::Transient {
                url: url.to_string(),
                message: format!("http status {status}"),
            },
            code => DirectoryError::Http {
                status: code,
                url: url.to_string(),
            },
        }
    }

    /// Map a transport-level reqwest error. Connection and timeout
    /// failures are retryable; everything else is not.
    fn classify_transport(err: reqwest::Error, url: &str) -> DirectoryError {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            DirectoryError::Transient {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            DirectoryError::Reqwest(err)
        }
    }

    /// GET one URL and decode the JSON body.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, DirectoryError> {
        let response = self
            .client
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| Self::classify_transport(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::classify_status(status, url));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DirectoryError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    /// GET a list endpoint, following pagination until a short page.
    async fn get_paged<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Vec<T>, DirectoryError> {
        let mut all = Vec::new();
        let mut page = 1usize;
        loop {
            let url = format!("{endpoint}?per_page={PER_PAGE}&page={page}");
            let batch: Vec<T> = self.get_json(&url).await?;
            let len = batch.len();
            all.extend(batch);
            if len < PER_PAGE {
                return Ok(all);
            }
            page += 1;
        }
    }
}

impl DirectoryClient for GitlabClient {
    /// Try the group endpoint first; on 404 fall back to the project
    /// endpoint so a root identifier may name either kind of node.
    async fn get_node(&self, path: &str) -> Result<NodeMetadata, DirectoryError> {
        let encoded = encode_path(path);
        let group_url = format!("{}/api/v4/groups/{encoded}", self.base);
        match self.get_json::<GroupInfo>(&group_url).await {
            Ok(group) => Ok(NodeMetadata::Group(group)),
            Err(DirectoryError::NotFound { .. }) => {
                let project_url = format!("{}/api/v4/projects/{encoded}", self.base);
                let project = self.get_json::<ProjectInfo>(&project_url).await?;
                Ok(NodeMetadata::Project(project))
            }
            Err(err) => Err(err),
        }
    }

    async fn list_subgroups(&self, group_id: u64) -> Result<Vec<GroupInfo>, DirectoryError> {
        let endpoint = format!("{}/api/v4/groups/{group_id}/subgroups", self.base);
        self.get_paged(&endpoint).await
    }

    async fn list_projects(&self, group_id: u64) -> Result<Vec<ProjectInfo>, DirectoryError> {
        let endpoint = format!("{}/api/v4/groups/{group_id}/projects", self.base);
        self.get_paged(&endpoint).await
    }

    async fn list_members(&self, id: u64, project: bool) -> Result<Vec<MemberInfo>, DirectoryError> {
        let scope = if project { "projects" } else { "groups" };
        let endpoint = format!("{}/api/v4/{scope}/{id}/members", self.base);
        self.get_paged(&endpoint).await
    }
}
