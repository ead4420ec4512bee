// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for gitwarden.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. user gitwarden.toml (cwd)
//! 3. --config
//! 4. WARDEN_* env vars
//! 5. CLI overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! WARDEN_GITLAB_TOKEN=glpat-...     → gitlab.token = "glpat-..."
//! WARDEN_GITLAB_URL=https://...     → gitlab.url = "https://..."
//! WARDEN_PATHS_ROOT=/srv/mirror     → paths.root = "/srv/mirror"
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use types::{GitOpsConfig, GitlabConfig, GlobalConfig, PathsConfig, TraversalConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// GitLab instance connection options.
    pub gitlab: GitlabConfig,
    /// Traversal tuning.
    pub traversal: TraversalConfig,
    /// Bulk git operation tuning.
    pub gitops: GitOpsConfig,
    /// Local filesystem layout.
    pub paths: PathsConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gitwarden::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("gitwarden.toml")
    ///     .with_env_prefix("WARDEN")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file (simple API).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match
    /// the `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Check that settings required for API access are present.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::MissingKey` when `gitlab.token` is empty,
    /// or `ConfigError::InvalidValue` when `gitlab.url` is malformed.
    pub fn validate_api_access(&self) -> std::result::Result<(), ConfigError> {
        if self.gitlab.token.is_empty() {
            return Err(ConfigError::MissingKey {
                section: "gitlab".to_string(),
                key: "token".to_string(),
            });
        }
        if !self.gitlab.url.starts_with("http://") && !self.gitlab.url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                section: "gitlab".to_string(),
                key: "url".to_string(),
                message: format!("expected an http(s) URL, got '{}'", self.gitlab.url),
            });
        }
        Ok(())
    }

    /// Base API URL with any trailing slash removed.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.gitlab.url.trim_end_matches('/')
    }

    /// Format configuration options for display.
    ///
    /// Returns a vector of formatted strings representing all configuration
    /// options. The access token is hidden with a `[hidden]` marker.
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_gitlab_options(&mut options);
        self.format_traversal_options(&mut options);
        self.format_gitops_options(&mut options);
        self.format_paths_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global.log_file.display().to_string(),
        );
        options.insert("global.dry".into(), self.global.dry.to_string());
    }

    fn format_gitlab_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("gitlab.url".into(), self.gitlab.url.clone());
        if !self.gitlab.token.is_empty() {
            options.insert("gitlab.token".into(), "[hidden]".into());
        }
    }

    fn format_traversal_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "traversal.max_parallel_requests".into(),
            self.traversal.max_parallel_requests.to_string(),
        );
        options.insert(
            "traversal.retry_attempts".into(),
            self.traversal.retry_attempts.to_string(),
        );
        options.insert(
            "traversal.retry_backoff_ms".into(),
            self.traversal.retry_backoff_ms.to_string(),
        );
    }

    fn format_gitops_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "gitops.max_parallel_ops".into(),
            self.gitops.max_parallel_ops.to_string(),
        );
        options.insert(
            "gitops.command_timeout_secs".into(),
            self.gitops.command_timeout_secs.to_string(),
        );
        if !self.gitops.git_executable.is_empty() {
            options.insert(
                "gitops.git_executable".into(),
                self.gitops.git_executable.clone(),
            );
        }
    }

    fn format_paths_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("paths.root".into(), self.paths.root.display().to_string());
    }
}
