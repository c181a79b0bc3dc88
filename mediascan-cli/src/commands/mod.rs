//! Command implementations for the CLI.
//!
//! Each submodule implements one subcommand and returns the process exit
//! code on success.

pub mod info;
pub mod music;
pub mod probe;

use anyhow::{Context, Result};
use mediascan_core::config::DEFAULT_TOOL_NAME;
use mediascan_core::{CoreConfig, CoreConfigBuilder, resolve_tool};
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::{Cli, Commands};

/// Builds the core configuration from the global flags.
pub fn build_config(cli: &Cli) -> Result<CoreConfig> {
    let mut builder = CoreConfigBuilder::new();
    if let Some(path) = &cli.ffmpeg {
        builder = builder.ffmpeg_path(path.clone());
    }
    if let Some(secs) = cli.timeout {
        builder = builder.tool_timeout(Duration::from_secs(secs));
    }
    if let Commands::Probe(args) = &cli.command {
        if let Some(ms) = args.retry_delay_ms {
            builder = builder.retry_delay(Duration::from_millis(ms));
        }
    }

    let config = builder.build();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Resolves ffmpeg for the readers, which need it up front.
pub(crate) fn resolve_ffmpeg(config: &CoreConfig) -> Result<PathBuf> {
    let path = resolve_tool(config.ffmpeg_path.as_deref(), DEFAULT_TOOL_NAME)
        .context("Cannot locate ffmpeg (use --ffmpeg or MEDIASCAN_FFMPEG)")?;
    log::debug!("Using ffmpeg at {}", path.display());
    Ok(path)
}

/// Dispatches to the selected subcommand.
pub fn run(cli: Cli) -> Result<i32> {
    let config = build_config(&cli)?;
    match cli.command {
        Commands::Info(args) => info::run_info(&config, args),
        Commands::Music(args) => music::run_music(&config, args),
        Commands::Probe(args) => probe::run_probe(config, args),
    }
}
