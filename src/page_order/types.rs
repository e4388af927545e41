//! Page Order module core types
//!
//! Contains the parse record, file descriptors, errors and parser options
//! shared by the pattern library, parser, sorter and validator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Default number of pages covered by one baron group
pub const DEFAULT_BARON_PAGE_SPAN: u32 = 25;

/// Minimum baron page span clamp value
pub const MIN_BARON_PAGE_SPAN: u32 = 1;

/// Maximum baron page span clamp value
pub const MAX_BARON_PAGE_SPAN: u32 = 10_000;

// ============================================================
// Error Types
// ============================================================

/// Page ordering error types
#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("Invalid pattern '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },

    #[error("Invalid confidence {0}: must be within (0.0, 1.0]")]
    InvalidConfidence(f64),

    #[error("Invalid max gap {0}: must be at least 1")]
    InvalidMaxGap(u32),

    #[error("Invalid low-confidence threshold {0}: must be within [0.0, 1.0]")]
    InvalidThreshold(f64),
}

pub type Result<T> = std::result::Result<T, SequenceError>;

// ============================================================
// Format Tags
// ============================================================

/// Detected filename format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatType {
    /// `baronNNN` group files with optional offset
    Baron,
    /// Bare digits, or the last number in the name
    Numeric,
    /// `page`/`pg`/`p` followed by digits
    PagePrefixed,
    /// Chapter number plus page within the chapter
    ChapterPage,
    /// `image`/`img`/`scan`/`photo` prefixes and camera date-stamps
    ImageScan,
    /// `book_page`/`manuscript`/`document` prefixes
    BookPage,
    /// Spelled-out English page numbers
    Named,
    /// Caller-registered pattern
    Custom,
    /// Nothing recoverable
    Unknown,
}

impl FormatType {
    /// Stable snake_case tag
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatType::Baron => "baron",
            FormatType::Numeric => "numeric",
            FormatType::PagePrefixed => "page_prefixed",
            FormatType::ChapterPage => "chapter_page",
            FormatType::ImageScan => "image_scan",
            FormatType::BookPage => "book_page",
            FormatType::Named => "named",
            FormatType::Custom => "custom",
            FormatType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// Parse Record
// ============================================================

/// Auxiliary parse fields, keyed by format.
///
/// Serializes as a plain mapping (e.g. `{"group": 1, "position": 24, "span": 25}`),
/// so downstream consumers see a string-keyed object whose schema depends on
/// the record's `format_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PageMetadata {
    /// No extra fields (unknown records)
    Empty {},
    /// Baron group and offset within the group
    Baron { group: u32, position: u32, span: u32 },
    /// Word that introduced the page digits
    Prefixed { prefix: String },
    /// Camera-style name carrying a date before the sequence number
    Dated {
        prefix: String,
        date: String,
        sequence: u32,
    },
    /// Chapter and intra-chapter page
    Chapter {
        chapter: u32,
        page_in_chapter: u32,
        mapped: bool,
    },
    /// Digits at the start of the stem; `exact` when the stem is only digits
    Numeric { exact: bool },
    /// Spelled-out number that was recognized
    Named { word: String },
    /// Name of the custom pattern that matched
    Custom { pattern: String },
    /// Last-number fallback; number of digit runs seen in the stem
    Fallback { candidates: usize },
}

/// Parse result for one filename
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInfo {
    /// Original filename, as supplied
    pub filename: String,
    /// Canonical page number (1-based), absent when unparseable
    pub page_number: Option<u32>,
    /// Detected format
    pub format_type: FormatType,
    /// Parse confidence (0.0-1.0)
    pub confidence: f64,
    /// Format-specific fields
    pub metadata: PageMetadata,
}

impl PageInfo {
    /// Record for a filename with no recoverable page number
    pub fn unknown(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            page_number: None,
            format_type: FormatType::Unknown,
            confidence: 0.0,
            metadata: PageMetadata::Empty {},
        }
    }

    /// Record for a successful match.
    ///
    /// Confidence is clamped into (0.0, 1.0] so a present page number always
    /// carries a positive confidence.
    pub fn matched(
        filename: impl Into<String>,
        page_number: u32,
        format_type: FormatType,
        confidence: f64,
        metadata: PageMetadata,
    ) -> Self {
        debug_assert!(page_number >= 1);
        debug_assert!(format_type != FormatType::Unknown);
        Self {
            filename: filename.into(),
            page_number: Some(page_number),
            format_type,
            confidence: confidence.clamp(f64::EPSILON, 1.0),
            metadata,
        }
    }

    /// Whether a page number was recovered
    pub fn is_parsed(&self) -> bool {
        self.page_number.is_some()
    }
}

// ============================================================
// File Descriptors
// ============================================================

/// Keys a caller may use for the MIME type, in lookup order
pub const MIME_TYPE_KEYS: [&str; 2] = ["mime_type", "mimeType"];

/// Candidate file supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Opaque identifier (string, number or anything else the caller uses)
    pub id: serde_json::Value,
    /// Display name (the filename that gets parsed)
    pub name: String,
    /// Any other fields, passed through untouched (MIME type included)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FileDescriptor {
    /// Create a descriptor with no extra fields
    pub fn new(id: impl Into<serde_json::Value>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Set the MIME type under the `mime_type` key
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.extra.insert(
            MIME_TYPE_KEYS[0].to_string(),
            serde_json::Value::String(mime_type.into()),
        );
        self
    }

    /// MIME type under whichever key the caller used, if it is a string
    pub fn mime_type(&self) -> Option<&str> {
        MIME_TYPE_KEYS
            .iter()
            .find_map(|key| self.extra.get(*key).and_then(serde_json::Value::as_str))
    }
}

/// Descriptor annotated with its parse result
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedFile {
    /// The caller's descriptor, unchanged
    #[serde(flatten)]
    pub descriptor: FileDescriptor,
    /// Copy of `page_info.page_number`
    pub calculated_page_number: Option<u32>,
    /// Copy of `page_info.format_type`
    pub filename_format: FormatType,
    /// Copy of `page_info.confidence`
    pub page_confidence: f64,
    /// Full parse record
    pub page_info: PageInfo,
}

impl AnnotatedFile {
    /// Attach a parse record to a descriptor
    pub fn new(descriptor: FileDescriptor, page_info: PageInfo) -> Self {
        Self {
            calculated_page_number: page_info.page_number,
            filename_format: page_info.format_type,
            page_confidence: page_info.confidence,
            descriptor,
            page_info,
        }
    }

    /// Filename of the underlying descriptor
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

// ============================================================
// Options
// ============================================================

/// Filename parser options
#[derive(Debug, Clone, PartialEq)]
pub struct ParserOptions {
    /// Pages per baron group
    pub baron_page_span: u32,
    /// First page of each chapter, for chapter+page names
    pub chapter_offsets: BTreeMap<u32, u32>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            baron_page_span: DEFAULT_BARON_PAGE_SPAN,
            chapter_offsets: BTreeMap::new(),
        }
    }
}

impl ParserOptions {
    /// Create a new options builder
    pub fn builder() -> ParserOptionsBuilder {
        ParserOptionsBuilder::default()
    }
}

/// Builder for ParserOptions
#[derive(Debug, Default)]
pub struct ParserOptionsBuilder {
    options: ParserOptions,
}

impl ParserOptionsBuilder {
    /// Set pages per baron group (clamped to 1-10000)
    #[must_use]
    pub fn baron_page_span(mut self, span: u32) -> Self {
        self.options.baron_page_span = span.clamp(MIN_BARON_PAGE_SPAN, MAX_BARON_PAGE_SPAN);
        self
    }

    /// Map a chapter to the page it starts on (pages below 1 are raised to 1)
    #[must_use]
    pub fn chapter_offset(mut self, chapter: u32, first_page: u32) -> Self {
        self.options
            .chapter_offsets
            .insert(chapter, first_page.max(1));
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> ParserOptions {
        self.options
    }
}
