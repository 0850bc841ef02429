//! Generate command - writes the companion files for every marked type.

use super::{configure, finish};
use crate::cli::{Cli, GenerateArgs};
use ezenum_core::{EnumGenerator, Result};
use std::process::ExitCode;
use tracing::info;

/// Runs the generate command.
pub fn run(cli: &Cli, args: &GenerateArgs) -> Result<ExitCode> {
    let mut builder = configure(cli, &args.scan)?;
    if let Some(suffix) = &args.suffix {
        builder = builder.suffix(suffix.as_str());
    }
    if args.parallel {
        builder = builder.parallel(true);
    }

    let report = EnumGenerator::new(builder.build())
        .dry_run(args.dry_run)
        .generate_all()?;

    if args.dry_run {
        for file in &report.files {
            println!("{} ({} bytes)", file.path.display(), file.bytes);
        }
    }

    info!(
        "{} {} types in {} of {} scanned files",
        if args.dry_run { "Would generate" } else { "Generated" },
        report.types_generated,
        report.files.len(),
        report.files_scanned
    );

    Ok(finish(&report))
}
