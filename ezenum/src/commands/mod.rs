//! Command handlers for the ezenum CLI.

pub mod generate;
pub mod init;
pub mod list;

use crate::cli::{Cli, ScanArgs};
use ezenum_core::{EzenumConfig, EzenumConfigBuilder, GenerationReport, Result};
use std::process::ExitCode;
use tracing::{debug, error};

/// Loads the configuration file and applies the scan flags on top.
fn configure(cli: &Cli, scan: &ScanArgs) -> Result<EzenumConfigBuilder> {
    let config = EzenumConfig::load(cli.config.as_deref())?;
    let mut builder = EzenumConfigBuilder::from_config(config);

    if let Some(root) = &scan.root {
        debug!("Root overridden from command line: {:?}", root);
        builder = builder.root(root);
    }
    if let Some(marker) = &scan.marker {
        builder = builder.marker(marker.as_str());
    }

    Ok(builder)
}

/// Logs every per-file failure and maps the report to an exit status.
fn finish(report: &GenerationReport) -> ExitCode {
    if report.is_success() {
        return ExitCode::SUCCESS;
    }

    error!("{} file(s) could not be processed:", report.failures.len());
    for failure in &report.failures {
        error!("  {}: {}", failure.path.display(), failure.error);
    }
    ExitCode::FAILURE
}
