// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |         clone / branch / access
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML, layered settings  |
//!              '-----+-------------+-------'
//!                    |             |
//!                    v             v
//!                 gitlab       hierarchy
//!               HTTP client   tree builder
//!                    |             |
//!                    |      +------+------+
//!                    |      v             v
//!                    |   access          ops
//!                    |  inheritance   bulk driver
//!                    |                    |
//!                    |                    v
//!                    |                   git
//!                    |              gix / git CLI
//!
//!   +-----------------------------------------+
//!   |       foundation   error, logging       |
//!   +-----------------------------------------+
//! ```

pub mod access;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod git;
pub mod gitlab;
pub mod hierarchy;
pub mod logging;
pub mod ops;
