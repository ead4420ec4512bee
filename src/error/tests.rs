// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ConfigError, DirectoryError, WardenError, WardenResult, root_not_found};

#[test]
fn test_config_error_display() {
    let err = ConfigError::MissingKey {
        section: "gitlab".to_string(),
        key: "token".to_string(),
    };
    insta::assert_snapshot!(err.to_string());
}

#[test]
fn test_warden_error_size() {
    // Box<str> variants (RootNotFound, Other) are 16 bytes (fat pointer),
    // discriminant + alignment brings the enum to 24.
    let size = std::mem::size_of::<WardenError>();
    assert!(size <= 24, "WardenError is {size} bytes, expected <= 24");
}

#[test]
fn test_warden_result_size() {
    let size = std::mem::size_of::<WardenResult<()>>();
    assert!(size <= 24, "WardenResult<()> is {size} bytes, expected <= 24");
}

#[test]
fn test_root_not_found_is_fatal_variant() {
    let err = root_not_found("tools/missing");
    assert!(matches!(err, WardenError::RootNotFound(_)));
    assert_eq!(err.to_string(), "root not found: tools/missing");
}

#[test]
fn test_directory_error_classification() {
    let forbidden = DirectoryError::Forbidden {
        path: "tools/private".to_string(),
    };
    let not_found = DirectoryError::NotFound {
        path: "tools/gone".to_string(),
    };
    let transient = DirectoryError::Transient {
        url: "https://gitlab.example/api/v4/groups/1".to_string(),
        message: "connection reset".to_string(),
    };
    let http = DirectoryError::Http {
        status: 418,
        url: "https://gitlab.example/api/v4/groups/1".to_string(),
    };

    assert!(forbidden.is_access_denied());
    assert!(not_found.is_access_denied());
    assert!(!transient.is_access_denied());

    assert!(transient.is_transient());
    assert!(!forbidden.is_transient());
    assert!(!http.is_transient());
}
