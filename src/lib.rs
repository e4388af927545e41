//! page-sequencer - filename-based page ordering for scanned manuscripts
//!
//! Parses heterogeneous scan/photo filenames into page numbers, sorts mixed
//! batches into a page sequence and flags gaps, duplicates and uncertain
//! parses before any OCR work is committed.
//!
//! # Modules
//!
//! - [`page_order`] - pattern library, parser, sorter and validator
//! - [`pipeline`] - parse → sort → validate in one call
//! - [`config`] - TOML config file and CLI overrides
//! - [`listing`] - JSON and directory listings for the CLI
//! - [`cli`] - command-line definitions

pub mod cli;
pub mod config;
pub mod listing;
pub mod page_order;
pub mod pipeline;

// CLI
pub use cli::{exit_codes, Cli, Commands, OrderArgs, ParseArgs, PatternsArgs};

// Config
pub use config::{CliOverrides, Config, ConfigError, SequencerConfig};

// Listings
pub use listing::ListingError;

// Page ordering
pub use page_order::{
    AnnotatedFile, BatchSorter, FileDescriptor, FilenameParser, FormatType, IssueType, PageInfo,
    PageMetadata, PageRange, ParserOptions, PatternLibrary, PatternRule, SequenceError,
    SequenceValidator, Severity, SortOptions, ValidationIssue, ValidationOptions,
};

// Pipeline
pub use pipeline::{BatchSummary, OrderingReport, PageSequencer};
