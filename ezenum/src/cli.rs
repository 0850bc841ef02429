//! Command-line interface definitions for ezenum.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ezenum - accessor and validator generation for Go enum-like constant types
#[derive(Parser, Debug)]
#[command(name = "ezenum")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to ezenum.toml configuration file
    #[arg(short, long, global = true, env = "EZENUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (-v, -vv for increasing verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Arguments of the default `generate` command
    #[command(flatten)]
    pub generate: GenerateArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate companion files for every marked type (default)
    Generate(GenerateArgs),

    /// Show the marked types and constants that would be generated
    List(ListArgs),

    /// Initialize a new ezenum.toml configuration file
    Init(InitArgs),
}

/// Settings shared by commands that scan a tree.
#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Directory to scan (overrides config file)
    pub root: Option<PathBuf>,

    /// Marker token that tags a type for generation
    #[arg(long)]
    pub marker: Option<String>,
}

// ============================================================================
// Generate Arguments
// ============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// File name suffix of generated files, e.g. "_ezenum_gen.go"
    #[arg(long)]
    pub suffix: Option<String>,

    /// Process files in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Render everything but write nothing
    #[arg(long)]
    pub dry_run: bool,
}

// ============================================================================
// List Arguments
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "pretty")]
    pub format: ListFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Pretty,
    Json,
}

// ============================================================================
// Init Arguments
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_root_runs_default_generate() {
        let cli = Cli::parse_from(["ezenum", "pkg", "--dry-run"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.generate.scan.root, Some(PathBuf::from("pkg")));
        assert!(cli.generate.dry_run);
    }

    #[test]
    fn test_subcommands_with_global_flags() {
        let cli = Cli::parse_from(["ezenum", "-vv", "list", "src", "--format", "json"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::List(args)) => {
                assert_eq!(args.format, ListFormat::Json);
                assert_eq!(args.scan.root, Some(PathBuf::from("src")));
            }
            other => panic!("expected list, got {other:?}"),
        }

        let cli = Cli::parse_from(["ezenum", "init", "--force", "-c", "custom.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Some(Commands::Init(InitArgs { force: true }))));
    }

    #[test]
    fn test_generate_overrides() {
        let cli = Cli::parse_from([
            "ezenum",
            "generate",
            "--marker",
            "+enum",
            "--suffix",
            "_enum.go",
            "--parallel",
        ]);
        match cli.command {
            Some(Commands::Generate(args)) => {
                assert_eq!(args.scan.marker.as_deref(), Some("+enum"));
                assert_eq!(args.suffix.as_deref(), Some("_enum.go"));
                assert!(args.parallel);
                assert!(args.scan.root.is_none());
            }
            other => panic!("expected generate, got {other:?}"),
        }
    }
}
