//! Command-line interface definitions

use crate::config::CliOverrides;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    /// Also used by clap for argument errors
    pub const INVALID_ARGS: i32 = 2;
    pub const INPUT_NOT_FOUND: i32 = 3;
    pub const CONFIG_ERROR: i32 = 4;
    /// `--fail-on-error` and an error-severity issue was reported
    pub const VALIDATION_FAILED: i32 = 5;
}

/// Order scanned manuscript pages by filename
#[derive(Parser, Debug)]
#[command(name = "page-sequencer", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress logs and the summary line
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse, sort and validate a listing; write the manifest as JSON
    Order(OrderArgs),
    /// Print the parse result for each filename
    Parse(ParseArgs),
    /// Print the active pattern table
    Patterns(PatternsArgs),
}

/// Arguments for `order`
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// JSON listing file, or a directory of page images
    pub input: PathBuf,

    /// Write the manifest here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (default: ./page-sequencer.toml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Largest page jump reported as missing pages rather than an error
    #[arg(long)]
    pub max_gap: Option<u32>,

    /// Pages per baron group
    #[arg(long)]
    pub page_span: Option<u32>,

    /// Flag parses below this confidence
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Only order image files
    #[arg(long)]
    pub images_only: bool,

    /// Exit with a non-zero status when an error-severity issue is reported
    #[arg(long)]
    pub fail_on_error: bool,
}

impl OrderArgs {
    /// Values explicitly set on the command line
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            baron_page_span: self.page_span,
            max_gap: self.max_gap,
            low_confidence_threshold: self.min_confidence,
            // Flag only turns the filter on; absent leaves the config value.
            images_only: self.images_only.then_some(true),
        }
    }
}

/// Arguments for `parse`
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Filenames to parse
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Pages per baron group
    #[arg(long)]
    pub page_span: Option<u32>,
}

impl ParseArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            baron_page_span: self.page_span,
            ..Default::default()
        }
    }
}

/// Arguments for `patterns`
#[derive(Args, Debug)]
pub struct PatternsArgs {
    /// Config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
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
    fn test_order_args_overrides() {
        let cli = Cli::parse_from([
            "page-sequencer",
            "order",
            "listing.json",
            "--max-gap",
            "4",
            "--page-span",
            "20",
            "--images-only",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Order(args) = cli.command else {
            panic!("expected order command");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.max_gap, Some(4));
        assert_eq!(overrides.baron_page_span, Some(20));
        assert_eq!(overrides.images_only, Some(true));
        assert_eq!(overrides.low_confidence_threshold, None);
    }

    #[test]
    fn test_images_only_absent_keeps_config_value() {
        let cli = Cli::parse_from(["page-sequencer", "order", "dir"]);
        let Commands::Order(args) = cli.command else {
            panic!("expected order command");
        };
        assert_eq!(args.overrides().images_only, None);
    }

    #[test]
    fn test_parse_requires_names() {
        assert!(Cli::try_parse_from(["page-sequencer", "parse"]).is_err());
    }
}
