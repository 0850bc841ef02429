//! List command - shows what generation would produce without writing.

use super::{configure, finish};
use crate::cli::{Cli, ListArgs, ListFormat};
use ezenum_core::{EnumGenerator, GenerationReport, Result};
use serde_json::json;
use std::process::ExitCode;

/// Runs the list command.
pub fn run(cli: &Cli, args: &ListArgs) -> Result<ExitCode> {
    let config = configure(cli, &args.scan)?.build();
    let report = EnumGenerator::new(config).dry_run(true).generate_all()?;

    match args.format {
        ListFormat::Pretty => print_pretty(&report),
        ListFormat::Json => print_json(&report)?,
    }

    Ok(finish(&report))
}

fn print_pretty(report: &GenerationReport) {
    if report.files.is_empty() {
        println!("No marked types found ({} files scanned)", report.files_scanned);
        return;
    }

    for file in &report.files {
        println!("{} -> {}", file.source.display(), file.path.display());
        for extraction in &file.extractions {
            println!(
                "  {} ({} constants)",
                extraction.marked.name,
                extraction.constants.len()
            );
            for constant in &extraction.constants {
                if constant.description.is_empty() {
                    println!("    - {}", constant.identifier);
                } else {
                    println!("    - {}: {}", constant.identifier, constant.description);
                }
            }
        }
    }
}

fn print_json(report: &GenerationReport) -> Result<()> {
    let failures: Vec<_> = report
        .failures
        .iter()
        .map(|failure| {
            json!({
                "path": failure.path.display().to_string(),
                "error": failure.error.to_string(),
            })
        })
        .collect();

    let output = json!({
        "files_scanned": report.files_scanned,
        "types": report.types_generated,
        "files": serde_json::to_value(&report.files)?,
        "failures": failures,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
