//! page-sequencer - filename-based page ordering for scanned manuscripts
//!
//! CLI entry point

use anyhow::Context;
use clap::Parser;
use page_sequencer::{
    exit_codes, listing, Cli, CliOverrides, Commands, Config, ListingError, OrderArgs,
    OrderingReport, PageSequencer, ParseArgs, PatternsArgs, SequencerConfig, Severity,
};
use std::io::Write;
use std::path::Path;
use tracing::Level;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Order(args) => run_order(args, cli.quiet),
        Commands::Parse(args) => run_parse(args),
        Commands::Patterns(args) => run_patterns(args),
    };

    std::process::exit(match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::GENERAL_ERROR
        }
    });
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ============ Config Resolution ============

/// Load the config file and merge CLI overrides; `Err` carries the exit code
fn resolve_config(path: Option<&Path>, overrides: &CliOverrides) -> Result<SequencerConfig, i32> {
    let file_config = match path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };

    file_config
        .and_then(|config| config.merge_with_cli(overrides))
        .map_err(|e| {
            eprintln!("Error: {}", e);
            exit_codes::CONFIG_ERROR
        })
}

// ============ Order Command ============

fn run_order(args: &OrderArgs, quiet: bool) -> anyhow::Result<i32> {
    let config = match resolve_config(args.config.as_deref(), &args.overrides()) {
        Ok(config) => config,
        Err(code) => return Ok(code),
    };

    let files = match listing::load(&args.input) {
        Ok(files) => files,
        Err(ListingError::NotFound(path)) => {
            eprintln!("Error: Input path does not exist: {}", path.display());
            return Ok(exit_codes::INPUT_NOT_FOUND);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to load listing {}", args.input.display()))
        }
    };

    let sequencer = PageSequencer::new(config)?;
    let report = sequencer.order(files);

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write manifest {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    if !quiet {
        print_summary(&report);
    }

    if args.fail_on_error && report.has_errors() {
        return Ok(exit_codes::VALIDATION_FAILED);
    }
    Ok(exit_codes::SUCCESS)
}

fn print_summary(report: &OrderingReport) {
    let summary = &report.summary;
    let range = match (summary.first_page, summary.last_page) {
        (Some(first), Some(last)) => format!(", pages {}-{}", first, last),
        _ => String::new(),
    };
    eprintln!(
        "Ordered {} files ({} parsed, {} unparsed{}); issues: {} error, {} warning, {} info",
        summary.total,
        summary.parsed,
        summary.unparsed,
        range,
        summary.issue_count(Severity::Error),
        summary.issue_count(Severity::Warning),
        summary.issue_count(Severity::Info),
    );
}

// ============ Parse Command ============

fn run_parse(args: &ParseArgs) -> anyhow::Result<i32> {
    let config = match resolve_config(args.config.as_deref(), &args.overrides()) {
        Ok(config) => config,
        Err(code) => return Ok(code),
    };
    let sequencer = PageSequencer::new(config)?;

    let mut stdout = std::io::stdout().lock();
    for name in &args.names {
        let info = sequencer.parser().parse(name);
        writeln!(stdout, "{}", serde_json::to_string(&info)?)?;
    }
    Ok(exit_codes::SUCCESS)
}

// ============ Patterns Command ============

fn run_patterns(args: &PatternsArgs) -> anyhow::Result<i32> {
    let config = match resolve_config(args.config.as_deref(), &CliOverrides::new()) {
        Ok(config) => config,
        Err(code) => return Ok(code),
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "{:<3} {:<16} {:<14} {:>10}  PATTERN",
        "#", "NAME", "FORMAT", "CONFIDENCE"
    )?;
    for (i, rule) in config.library.rules().enumerate() {
        let name = if rule.custom {
            format!("{}*", rule.name)
        } else {
            rule.name.clone()
        };
        writeln!(
            stdout,
            "{:<3} {:<16} {:<14} {:>10.2}  {}",
            i + 1,
            name,
            rule.format.as_str(),
            rule.confidence,
            rule.regex.as_str()
        )?;
    }
    if config.library.custom_count() > 0 {
        writeln!(stdout, "\n* custom pattern")?;
    }
    Ok(exit_codes::SUCCESS)
}
