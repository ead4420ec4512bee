// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Effective access resolution over a built hierarchy.
//!
//! ```text
//! resolve(&Tree)
//!      |
//!      v  top-down, root before children
//! AccessMap: full_path -> EffectiveAccess (identity id -> AccessGrant)
//!
//! Layered override per node:
//!   effective = parent effective
//!   direct grants overwrite inherited entries, regardless of level
//!
//! who_can_access(path): descending level, then identity name
//! ```
//!
//! The override rule is adjacency-based, not magnitude-based: an identity
//! holding Owner inherited from a grandparent and Guest granted directly
//! at a node ends up with Guest at that node and below, until another
//! direct grant replaces it again.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::gitlab::MemberInfo;
use crate::hierarchy::{Node, Tree};

#[cfg(test)]
mod tests;

/// Access level, ordered from least to most privileged.
///
/// Wire codes: Guest=10, Reporter=20, Developer=30, Maintainer=40,
/// Owner=50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    Guest,
    Reporter,
    Developer,
    Maintainer,
    Owner,
}

impl AccessLevel {
    /// Decode a wire code, flooring unknown intermediate values to the
    /// next lower known level. Codes below Guest (e.g. Minimal=5) do
    /// not grant repository access and decode to `None`.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0..=9 => None,
            10..=19 => Some(Self::Guest),
            20..=29 => Some(Self::Reporter),
            30..=39 => Some(Self::Developer),
            40..=49 => Some(Self::Maintainer),
            _ => Some(Self::Owner),
        }
    }

    /// The canonical wire code for this level.
    #[must_use]
    pub const fn as_code(self) -> u8 {
        match self {
            Self::Guest => 10,
            Self::Reporter => 20,
            Self::Developer => 30,
            Self::Maintainer => 40,
            Self::Owner => 50,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "Guest",
            Self::Reporter => "Reporter",
            Self::Developer => "Developer",
            Self::Maintainer => "Maintainer",
            Self::Owner => "Owner",
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An identity known to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    pub username: String,
    pub name: String,
    /// Public e-mail address, when the identity exposes one.
    pub public_email: Option<String>,
}

/// One grant of access, tied to the node where it was defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub identity: Identity,
    pub level: AccessLevel,
    /// Expiry date as reported by the platform, if any.
    pub expires_at: Option<String>,
    /// `full_path` of the node where this grant was defined.
    pub source_path: String,
}

impl AccessGrant {
    /// Build a grant from a membership entry defined at `source_path`.
    ///
    /// Returns `None` for levels below Guest, which carry no repository
    /// access.
    #[must_use]
    pub fn from_member(member: &MemberInfo, source_path: &str) -> Option<Self> {
        let level = AccessLevel::from_code(member.access_level)?;
        Some(Self {
            identity: Identity {
                id: member.id,
                username: member.username.clone(),
                name: member.name.clone(),
                public_email: member.public_email.clone(),
            },
            level,
            expires_at: member.expires_at.clone(),
            source_path: source_path.to_string(),
        })
    }
}

/// The grants that apply at one node after inheritance, keyed by
/// identity id.
pub type EffectiveAccess = BTreeMap<u64, AccessGrant>;

/// Resolved access for every node of a tree.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct AccessMap {
    by_path: BTreeMap<String, EffectiveAccess>,
}

impl AccessMap {
    /// Effective access at one node, if the path exists in the tree.
    #[must_use]
    pub fn get(&self, full_path: &str) -> Option<&EffectiveAccess> {
        self.by_path.get(full_path)
    }

    /// Iterate `(full_path, effective access)` in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EffectiveAccess)> {
        self.by_path.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Everyone with access at a node, sorted by descending level and
    /// then identity name. Unknown paths yield an empty sequence.
    #[must_use]
    pub fn who_can_access(&self, full_path: &str) -> Vec<&AccessGrant> {
        let Some(effective) = self.by_path.get(full_path) else {
            return Vec::new();
        };
        let mut grants: Vec<&AccessGrant> = effective.values().collect();
        grants.sort_by(|a, b| {
            b.level
                .cmp(&a.level)
                .then_with(|| a.identity.name.cmp(&b.identity.name))
        });
        grants
    }
}

/// Resolve effective access for every node in the tree.
///
/// Root before children: a child's resolution starts from its parent's
/// already-resolved mapping. A node with no direct grants and no
/// ancestor grants resolves to an empty mapping, never an error.
#[must_use]
pub fn resolve(tree: &Tree) -> AccessMap {
    let mut map = AccessMap::default();
    walk(tree.root(), &EffectiveAccess::new(), &mut map);
    map
}

fn walk(node: &Node, inherited: &EffectiveAccess, map: &mut AccessMap) {
    let mut effective = inherited.clone();
    for grant in node.direct_members().values() {
        effective.insert(grant.identity.id, grant.clone());
    }
    for child in node.children() {
        walk(child, &effective, map);
    }
    map.by_path.insert(node.full_path().to_string(), effective);
}
