//! Configuration file support
//!
//! Settings come from a TOML file, looked up in order:
//!
//! 1. an explicit path (`--config`)
//! 2. `./page-sequencer.toml`
//! 3. `<config dir>/page-sequencer/config.toml`
//!
//! Command-line flags override file values, which override defaults.

use crate::page_order::{
    ParserOptions, PatternLibrary, SequenceError, SortOptions, ValidationOptions,
    DEFAULT_BARON_PAGE_SPAN, DEFAULT_LOW_CONFIDENCE_THRESHOLD, DEFAULT_MAX_GAP,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Local config file name
pub const LOCAL_CONFIG_FILE: &str = "page-sequencer.toml";

/// Application directory under the user config dir
const CONFIG_DIR_NAME: &str = "page-sequencer";

/// Default confidence for custom patterns that do not set one
const DEFAULT_CUSTOM_CONFIDENCE: f64 = 0.9;

// ============================================================
// Error Types
// ============================================================

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid chapter number '{0}' in [parser.chapter_offsets]")]
    ChapterKey(String),

    #[error("Invalid config: {0}")]
    Invalid(#[from] SequenceError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ============================================================
// File Schema
// ============================================================

/// Top-level config, deserialized from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `[parser]` section
    pub parser: ParserSection,
    /// `[validation]` section
    pub validation: ValidationSection,
    /// `[sorting]` section
    pub sorting: SortingSection,
    /// `[[patterns]]` custom rules, tried in order before the built-ins
    pub patterns: Vec<PatternSection>,
}

/// `[parser]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSection {
    pub baron_page_span: u32,
    /// Chapter number (as a string key) to the page the chapter starts on
    pub chapter_offsets: BTreeMap<String, u32>,
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            baron_page_span: DEFAULT_BARON_PAGE_SPAN,
            chapter_offsets: BTreeMap::new(),
        }
    }
}

/// `[validation]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSection {
    pub max_gap: u32,
    pub low_confidence_threshold: f64,
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            max_gap: DEFAULT_MAX_GAP,
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
        }
    }
}

/// `[sorting]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingSection {
    pub images_only: bool,
}

/// One `[[patterns]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSection {
    pub name: String,
    pub pattern: String,
    #[serde(default = "default_custom_confidence")]
    pub confidence: f64,
}

fn default_custom_confidence() -> f64 {
    DEFAULT_CUSTOM_CONFIDENCE
}

// ============================================================
// CLI Overrides
// ============================================================

/// Values set explicitly on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub baron_page_span: Option<u32>,
    pub max_gap: Option<u32>,
    pub low_confidence_threshold: Option<f64>,
    pub images_only: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    pub parser: ParserOptions,
    pub validation: ValidationOptions,
    pub sorting: SortOptions,
    pub library: PatternLibrary,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            parser: ParserOptions::default(),
            validation: ValidationOptions::default(),
            sorting: SortOptions::default(),
            library: PatternLibrary::new(),
        }
    }
}

// ============================================================
// Loading
// ============================================================

impl Config {
    /// Load from the first config file found, or defaults if there is none
    pub fn load() -> Result<Self> {
        for path in Self::search_paths() {
            if path.is_file() {
                return Self::load_from_path(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Candidate config locations, highest priority first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(CONFIG_DIR_NAME).join("config.toml"));
        }
        paths
    }

    /// Merge with CLI overrides (CLI wins) and compile custom patterns.
    ///
    /// Fails if a custom pattern does not compile or an option is out of range.
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> Result<SequencerConfig> {
        let mut parser = ParserOptions::builder()
            .baron_page_span(cli.baron_page_span.unwrap_or(self.parser.baron_page_span));
        for (chapter, first_page) in &self.parser.chapter_offsets {
            let chapter: u32 = chapter
                .trim()
                .parse()
                .map_err(|_| ConfigError::ChapterKey(chapter.clone()))?;
            parser = parser.chapter_offset(chapter, *first_page);
        }

        let validation = ValidationOptions {
            max_gap: cli.max_gap.unwrap_or(self.validation.max_gap),
            low_confidence_threshold: cli
                .low_confidence_threshold
                .unwrap_or(self.validation.low_confidence_threshold),
        };
        validation.check()?;

        let mut library = PatternLibrary::new();
        for entry in &self.patterns {
            library.register(&entry.name, &entry.pattern, entry.confidence)?;
        }

        Ok(SequencerConfig {
            parser: parser.build(),
            validation,
            sorting: SortOptions {
                images_only: cli.images_only.unwrap_or(self.sorting.images_only),
            },
            library,
        })
    }
}
