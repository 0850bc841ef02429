//! Init command - writes a default ezenum.toml.

use crate::cli::{Cli, InitArgs};
use ezenum_core::config::{CONFIG_FILE_NAME, DEFAULT_CONFIG_TEMPLATE};
use ezenum_core::{EzenumError, Result};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Runs the init command. Writes to `--config` when given, otherwise to
/// `ezenum.toml` in the current directory.
pub fn run(cli: &Cli, args: &InitArgs) -> Result<ExitCode> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    if config_path.exists() && !args.force {
        return Err(EzenumError::config(format!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        )));
    }

    fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE).map_err(|source| EzenumError::Write {
        path: config_path.clone(),
        source,
    })?;
    info!("Created {}", config_path.display());

    info!("Next steps:");
    info!("  1. Tag a Go type with a trailing `// EZENUM` comment");
    info!("  2. Run 'ezenum generate' to write the companion files");

    Ok(ExitCode::SUCCESS)
}
