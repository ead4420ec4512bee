// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!            WardenError (~16 bytes)
//!                   |
//!     +--------+----+----+--------+
//!     |        |         |        |
//!     v        v         v        v
//! RootNotFound Directory Git   Config/Process/Io
//!              Box       Box   Box
//!
//! Sub-errors (unboxed internally):
//!   Directory NotFound, Forbidden, Transient, Http, Decode
//!   Git       CommandFailed, CloneFailed, MissingLocalCopy, Gix
//!   Process   ExecutableNotFound, SpawnFailed, Timeout
//!   Config    ReadError, ParseError, InvalidValue
//!
//! Only RootNotFound aborts a run. Every other failure is
//! recovered locally into a prune record or operation result.
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`WardenError`].
pub type WardenResult<T> = std::result::Result<T, WardenError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum small on the stack.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Traversal root does not exist or is not visible. Fatal.
    #[error("root not found: {0}")]
    RootNotFound(Box<str>),

    /// Remote directory query failed.
    #[error("directory error: {0}")]
    Directory(#[from] Box<DirectoryError>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

/// Create a fatal [`WardenError::RootNotFound`].
pub fn root_not_found(path: impl Into<String>) -> WardenError {
    WardenError::RootNotFound(path.into().into_boxed_str())
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for WardenError {
                fn from(err: $error) -> Self {
                    WardenError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    DirectoryError => Directory,
    GitError => Git,
    ConfigError => Config,
    ProcessError => Process,
    std::io::Error => Io,
}

// --- Directory Errors ---

/// Remote directory (hosting platform API) errors.
///
/// The hierarchy builder dispatches on these: `NotFound`/`Forbidden` on a
/// child query prune the child, `Transient` is retried up to the
/// configured cap, everything else escalates to an enumeration failure.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Node does not exist (404).
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Authenticated identity cannot see the node (401/403).
    #[error("forbidden: {path}")]
    Forbidden { path: String },

    /// Network failure or a retryable server response (408/429/5xx).
    #[error("transient error for {url}: {message}")]
    Transient { url: String, message: String },

    /// Non-success, non-retryable HTTP response.
    #[error("http error {status}: {url}")]
    Http { status: u16, url: String },

    /// Response body could not be decoded.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Error from the reqwest library outside request dispatch.
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl DirectoryError {
    /// Whether the error is worth retrying.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Whether the error means "the identity cannot see this node".
    #[must_use]
    pub const fn is_access_denied(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Forbidden { .. })
    }
}

// --- Gix Errors ---

/// Wrapper for gix-specific errors.
///
/// Large gix error types are boxed to keep the enum size manageable.
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to open a repository at a path.
    #[error("failed to open repository: {0}")]
    Open(#[from] Box<gix::open::Error>),

    /// Failed to get HEAD reference.
    #[error("failed to get head reference: {0}")]
    Head(#[from] gix::reference::find::existing::Error),
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git command execution failed.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// Clone operation failed.
    #[error("failed to clone {url}: {message}")]
    CloneFailed { url: String, message: String },

    /// Operation requires an existing working copy that is not there.
    #[error("missing local copy at {path}")]
    MissingLocalCopy { path: String },

    /// Destination exists but is not a working copy of the expected remote.
    #[error("path {path} exists but is not a clone of {expected}")]
    WrongRemote { path: String, expected: String },

    /// Error from the gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process timed out.
    #[error("process '{command}' timed out after {timeout_secs} seconds")]
    Timeout { command: String, timeout_secs: u64 },

    /// Failed to read process output.
    #[error("failed to read output from process '{command}': {message}")]
    OutputError { command: String, message: String },
}

#[cfg(test)]
mod tests;
