//! Whole-tree generation: scan, extract, render and write each file.

use crate::config::EzenumConfig;
use crate::error::{EzenumError, Result};
use crate::extractor::{Extraction, Extractor};
use crate::generator::GeneratedFile;
use crate::scanner::SourceScanner;
use crate::writer;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A source file that produced generated output.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFileInfo {
    /// The scanned Go file.
    pub source: PathBuf,
    /// Where the generated file was (or, in a dry run, would be) written.
    pub path: PathBuf,
    /// Marked types with their constants, in declaration order.
    pub extractions: Vec<Extraction>,
    /// Size of the rendered file.
    pub bytes: usize,
    /// False for dry runs.
    pub written: bool,
}

/// A file or directory that could not be processed.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: EzenumError,
}

/// Outcome of a generation run.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Number of Go source files visited.
    pub files_scanned: usize,
    /// Number of marked types rendered.
    pub types_generated: usize,
    /// Files that produced output.
    pub files: Vec<GeneratedFileInfo>,
    /// Per-file failures, in scan order.
    pub failures: Vec<FileFailure>,
}

impl GenerationReport {
    fn new() -> Self {
        Self::default()
    }

    fn add_file(&mut self, file: GeneratedFileInfo) {
        self.types_generated += file.extractions.len();
        self.files.push(file);
    }

    fn add_failure(&mut self, path: PathBuf, error: EzenumError) {
        self.failures.push(FileFailure { path, error });
    }

    /// True when every scanned file was processed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

enum FileOutcome {
    Unreachable(EzenumError),
    NothingMarked,
    Generated(GeneratedFileInfo),
    Failed(PathBuf, EzenumError),
}

/// Generates enum helpers for a whole source tree.
pub struct EnumGenerator {
    config: EzenumConfig,
    extractor: Extractor,
    dry_run: bool,
}

impl EnumGenerator {
    pub fn new(config: EzenumConfig) -> Self {
        let extractor = Extractor::new(
            config.general.marker.as_str(),
            config.scan.literal_inference,
        );
        Self {
            config,
            extractor,
            dry_run: false,
        }
    }

    /// Render without writing anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &EzenumConfig {
        &self.config
    }

    /// Processes every Go file under the configured root.
    ///
    /// Fails only when the run cannot start: an invalid configuration or a
    /// missing root. Problems with individual files end up in
    /// [`GenerationReport::failures`] after all other files were handled.
    pub fn generate_all(&self) -> Result<GenerationReport> {
        self.config.validate()?;

        let root = self.config.root_path();
        info!("Starting enum generation in {:?}", root);

        let scanner = SourceScanner::new(&root)
            .with_exclude(self.config.scan.exclude.clone())
            .skip_generated(self.config.output.suffix.as_str());
        let entries: Vec<Result<PathBuf>> = scanner.scan()?.collect();
        debug!("Scan found {} entries", entries.len());

        let outcomes: Vec<FileOutcome> = if self.config.scan.parallel {
            debug!("Processing files in parallel");
            entries
                .into_par_iter()
                .map(|entry| self.process_entry(entry))
                .collect()
        } else {
            entries
                .into_iter()
                .map(|entry| self.process_entry(entry))
                .collect()
        };

        let mut report = GenerationReport::new();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Unreachable(error) => {
                    let path = error.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                    report.add_failure(path, error);
                }
                FileOutcome::NothingMarked => report.files_scanned += 1,
                FileOutcome::Generated(file) => {
                    report.files_scanned += 1;
                    report.add_file(file);
                }
                FileOutcome::Failed(path, error) => {
                    report.files_scanned += 1;
                    report.add_failure(path, error);
                }
            }
        }

        info!(
            "Generation complete. Scanned {} files, generated {} types in {} files, {} failures",
            report.files_scanned,
            report.types_generated,
            report.files.len(),
            report.failures.len()
        );

        Ok(report)
    }

    fn process_entry(&self, entry: Result<PathBuf>) -> FileOutcome {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!(path = ?err.path(), error = %err, "Skipping unreadable entry");
                return FileOutcome::Unreachable(err);
            }
        };

        match self.process_file(&path) {
            Ok(Some(file)) => FileOutcome::Generated(file),
            Ok(None) => FileOutcome::NothingMarked,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Failed to generate");
                FileOutcome::Failed(path, err)
            }
        }
    }

    /// Extracts, renders and (unless dry-running) writes one file.
    /// `Ok(None)` when the file has no marked types.
    pub fn process_file(&self, source: &Path) -> Result<Option<GeneratedFileInfo>> {
        let extractions = self.extractor.extract_file(source)?;
        let Some(generated) = GeneratedFile::from_extractions(&extractions) else {
            return Ok(None);
        };

        let text = generated.render();
        let path = writer::generated_path(source, &self.config.output.suffix);

        let bytes = if self.dry_run {
            debug!("Dry run, not writing {:?}", path);
            text.len()
        } else {
            let bytes = writer::write(&path, &text)?;
            info!(
                "Generated {} for {}",
                path.display(),
                generated.type_names().collect::<Vec<_>>().join(", ")
            );
            bytes
        };

        Ok(Some(GeneratedFileInfo {
            source: source.to_path_buf(),
            path,
            extractions,
            bytes,
            written: !self.dry_run,
        }))
    }
}
