// ezenum - accessor and validator generation for Go enum-like constant types

// Go front end
pub mod golang;

// Generation stages
pub mod extractor;
pub mod generator;
pub mod pipeline;
pub mod scanner;
pub mod writer;

// Common modules
pub mod config;
pub mod error;

// Re-export commonly used items for convenience
pub use config::{EzenumConfig, EzenumConfigBuilder, LiteralInference};
pub use error::{EzenumError, Result};
pub use extractor::{ConstantEntry, ConstantSet, Extraction, Extractor, MarkedType};
pub use generator::{GeneratedFile, GeneratedUnit, UNKNOWN_DESCRIPTION, render, render_unit};
pub use pipeline::{EnumGenerator, FileFailure, GeneratedFileInfo, GenerationReport};
pub use scanner::SourceScanner;

/// Generates enum helpers using configuration from `ezenum.toml`, searched
/// from the current directory upward.
///
/// # Errors
///
/// Returns `EzenumError` if the configuration cannot be loaded or the scan
/// root does not exist. Failures of individual files are listed in the
/// returned report instead.
pub fn generate() -> Result<GenerationReport> {
    let config = EzenumConfig::load(None)?;
    EnumGenerator::new(config).generate_all()
}

/// Generates enum helpers with a custom configuration.
pub fn generate_with_config(config: EzenumConfig) -> Result<GenerationReport> {
    EnumGenerator::new(config).generate_all()
}
