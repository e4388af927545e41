//! Page Order module
//!
//! Turns a listing of scan/photo filenames into a reliable page sequence.
//!
//! # Features
//!
//! - Ordered, inspectable filename pattern table with custom rules
//! - Baron group+offset, page-word, chapter+page, camera date-stamp,
//!   prefixed, bare numeric, spelled-out and last-number grammars
//! - Parallel batch parsing with stable, deterministic ordering
//! - Gap, duplicate and low-confidence validation
//!
//! # Example
//!
//! ```rust
//! use page_sequencer::{
//!     BatchSorter, FileDescriptor, FilenameParser, PatternLibrary, ParserOptions,
//!     SequenceValidator, ValidationOptions,
//! };
//!
//! let parser = FilenameParser::new(PatternLibrary::new(), ParserOptions::default());
//! let files = vec![
//!     FileDescriptor::new("b", "baron001 1.png"),
//!     FileDescriptor::new("a", "baron001.png"),
//! ];
//!
//! let sorted = BatchSorter::sort(files, &parser);
//! assert_eq!(sorted[0].calculated_page_number, Some(1));
//!
//! let validator = SequenceValidator::new(ValidationOptions::default()).unwrap();
//! assert!(validator.validate(&sorted).is_empty());
//! ```

// Submodules
mod parse;
mod patterns;
mod sort;
mod types;
mod validate;

// Re-export public API
pub use parse::FilenameParser;
pub use patterns::{Extractor, PatternLibrary, PatternRule};
pub use sort::{BatchSorter, SortOptions};
pub use types::{
    AnnotatedFile, FileDescriptor, FormatType, PageInfo, PageMetadata, ParserOptions,
    ParserOptionsBuilder, Result, SequenceError, DEFAULT_BARON_PAGE_SPAN,
};
pub use validate::{
    IssueType, PageRange, SequenceValidator, Severity, ValidationIssue, ValidationOptions,
    DEFAULT_LOW_CONFIDENCE_THRESHOLD, DEFAULT_MAX_GAP,
};
