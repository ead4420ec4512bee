// gitwarden: recursive GitLab group traversal and bulk git operations
//
// SPDX-FileCopyrightText: 2026 gitwarden contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Clone | Branch | Checkout | Pull | Access | Options | Version
//! ```

use std::process::ExitCode;

use gitwarden::cli::{Cli, Command, GlobalOptions};
use gitwarden::cmd::RunStatus;
use gitwarden::cmd::access::run_access_command;
use gitwarden::cmd::config::{run_options_command, run_version_command};
use gitwarden::cmd::operate::run_operation_command;
use gitwarden::config::Config;
use gitwarden::config::loader::ConfigLoader;
use gitwarden::config::types::GlobalConfig;
use gitwarden::error::Result;
use gitwarden::git::GitOp;
use gitwarden::logging::{LogConfig, init_logging};

use anyhow::anyhow;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&config.global);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &config).await
}

fn build_log_config(global: &GlobalConfig) -> LogConfig {
    let log_file = if global.log_file.as_os_str().is_empty() {
        None
    } else {
        Some(global.log_file.display().to_string())
    };

    LogConfig::builder()
        .with_console_level(global.output_log_level)
        .with_file_level(global.file_log_level)
        .maybe_with_log_file(log_file)
        .build()
}

async fn dispatch_command(cli: &Cli, config: &Config) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            run_version_command();
            Ok(RunStatus::Clean)
        }
        Some(Command::Options) => {
            run_options_command(config);
            Ok(RunStatus::Clean)
        }
        Some(Command::Clone(args)) => {
            run_operation_command(GitOp::Clone, &args.root, None, config).await
        }
        Some(Command::Branch(args)) => {
            run_operation_command(GitOp::Branch, &args.root, Some(args.name.clone()), config).await
        }
        Some(Command::Checkout(args)) => {
            run_operation_command(GitOp::Checkout, &args.root, Some(args.name.clone()), config)
                .await
        }
        Some(Command::Pull(args)) => {
            run_operation_command(GitOp::Pull, &args.root, None, config).await
        }
        Some(Command::Access(args)) => run_access_command(args, config).await,
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow!("No command specified"))
        }
    };

    match result {
        Ok(RunStatus::Clean) => ExitCode::SUCCESS,
        Ok(RunStatus::Degraded) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn build_config_loader(global: &GlobalOptions) -> Result<ConfigLoader> {
    // Later sources win, so the implicit cwd file goes in first.
    let mut loader = ConfigLoader::new().add_toml_file_optional("gitwarden.toml");
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader = loader.with_env_prefix("WARDEN");

    for entry in global.to_config_overrides() {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid option '{entry}', expected KEY=VALUE"))?;
        loader = loader.set(key, value)?;
    }
    Ok(loader)
}

fn load_config(global: &GlobalOptions) -> Result<Config> {
    build_config_loader(global)?.build()
}
