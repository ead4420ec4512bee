// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{LogConfig, LogLevel};

#[test]
fn test_log_level_conversion() {
    let conversions = vec![
        ("from_int(0)", LogLevel::from_int(0)),
        ("from_int(3)", LogLevel::from_int(3)),
        ("from_int(5)", LogLevel::from_int(5)),
        ("from_int(100)", LogLevel::from_int(100)),
    ];
    insta::assert_debug_snapshot!(conversions);
}

#[test]
fn test_log_level_rejects_out_of_range() {
    assert!(LogLevel::new(5).is_ok());
    assert!(LogLevel::new(6).is_err());
    assert_eq!(LogLevel::from_int(100), LogLevel::TRACE);
}

#[test]
fn test_log_level_filter_strings() {
    assert_eq!(LogLevel::SILENT.to_filter_string(), "off");
    assert_eq!(LogLevel::INFO.to_filter_string(), "info");
    assert_eq!(LogLevel::TRACE.to_filter_string(), "trace");
}

#[test]
fn test_log_config_defaults() {
    let config = LogConfig::default();
    assert_eq!(config.console_level(), LogLevel::INFO);
    assert_eq!(config.file_level(), LogLevel::TRACE);
    assert!(config.log_file().is_none());
    assert!(!config.show_target());
}
