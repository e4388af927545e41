//! Filename Pattern Library
//!
//! An explicitly ordered table of filename grammars. Each rule pairs a regex
//! with an extractor, a format tag and a base confidence; the parser walks the
//! table top to bottom and takes the first rule that yields a page number.

use super::types::{FormatType, Result, SequenceError};
use regex::Regex;
use std::sync::LazyLock;

// ============================================================
// Rule Table
// ============================================================

/// How a matched rule turns its captures into a page number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    /// `group` and optional `offset`, mapped through the baron page span
    Baron,
    /// `prefix` and `page`; confidence depends on the prefix word
    PageWord,
    /// `chapter` and `page`, optionally mapped through chapter offsets
    ChapterPage,
    /// `prefix`, `date` and optional `page` (the sequence after the date)
    CameraDate,
    /// `prefix` and `page`
    Prefixed,
    /// `page` at the start of the stem, `rest` after it
    LeadingDigits,
    /// `words` spelling out a number
    NumberWords,
    /// Last digit run anywhere in the stem
    LastNumber,
    /// Named group `page`, or group 1
    Capture,
}

/// One entry in the pattern table
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// Rule name (unique within a library)
    pub name: String,
    /// Grammar, matched against the extension-stripped stem
    pub regex: Regex,
    /// Format tag assigned on match
    pub format: FormatType,
    /// Base confidence (0.0-1.0]
    pub confidence: f64,
    /// Capture interpretation
    pub extractor: Extractor,
    /// Whether the rule was registered by the caller
    pub custom: bool,
}

impl PatternRule {
    fn builtin(
        name: &str,
        pattern: &str,
        format: FormatType,
        confidence: f64,
        extractor: Extractor,
    ) -> Self {
        Self {
            name: name.to_string(),
            regex: Regex::new(pattern).expect("valid built-in regex"),
            format,
            confidence,
            extractor,
            custom: false,
        }
    }
}

/// Built-in rules, highest priority first.
///
/// Digit classes are ASCII only; every captured run must parse as `u32`.
static BUILTIN_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        PatternRule::builtin(
            "baron",
            r"(?i)^baron[_\-\s]?(?P<group>[0-9]+)(?:[_\-\s]+(?P<offset>[0-9]+))?$",
            FormatType::Baron,
            1.0,
            Extractor::Baron,
        ),
        PatternRule::builtin(
            "page_word",
            r"(?i)^(?P<prefix>page|pg|p)[_\-\s.]?(?P<page>[0-9]+)(?:[^0-9].*)?$",
            FormatType::PagePrefixed,
            0.95,
            Extractor::PageWord,
        ),
        PatternRule::builtin(
            "chapter_page",
            r"(?i)^(?:chapter|chap|ch)[_\-\s]?(?P<chapter>[0-9]+)[_\-\s]*(?:page|pg|p)[_\-\s]?(?P<page>[0-9]+)(?:[^0-9].*)?$",
            FormatType::ChapterPage,
            0.8,
            Extractor::ChapterPage,
        ),
        // Ahead of image_prefix so a camera date is never read as the page.
        // A date with no sequence after it claims the name without a page.
        PatternRule::builtin(
            "camera_date",
            r"(?i)^(?P<prefix>img|image|scan|photo|dsc|pxl)[_\-\s]?(?P<date>(?:19|20)[0-9]{2}(?:0[1-9]|1[0-2])(?:0[1-9]|[12][0-9]|3[01]))(?:[_\-\s](?P<page>[0-9]+))?(?:[^0-9].*)?$",
            FormatType::ImageScan,
            0.7,
            Extractor::CameraDate,
        ),
        PatternRule::builtin(
            "image_prefix",
            r"(?i)^(?P<prefix>image|img|scan|photo)[_\-\s]*(?P<page>[0-9]+)(?:[^0-9].*)?$",
            FormatType::ImageScan,
            0.7,
            Extractor::Prefixed,
        ),
        PatternRule::builtin(
            "book_prefix",
            r"(?i)^(?P<prefix>book[_\-\s]?page|manuscript|document|doc)[_\-\s]*(?P<page>[0-9]+)(?:[^0-9].*)?$",
            FormatType::BookPage,
            0.7,
            Extractor::Prefixed,
        ),
        PatternRule::builtin(
            "bare_numeric",
            r"^(?P<page>[0-9]+)(?P<rest>.*)$",
            FormatType::Numeric,
            0.6,
            Extractor::LeadingDigits,
        ),
        PatternRule::builtin(
            "named",
            r"(?i)^(?:page[_\-\s]*)?(?P<words>[a-z]+(?:[_\-\s]+[a-z]+)?)$",
            FormatType::Named,
            0.5,
            Extractor::NumberWords,
        ),
        PatternRule::builtin(
            "last_number",
            r"[0-9]+",
            FormatType::Numeric,
            0.4,
            Extractor::LastNumber,
        ),
    ]
});

// ============================================================
// Pattern Library
// ============================================================

/// Ordered set of filename rules.
///
/// Custom rules are tried before every built-in rule, in registration order.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    custom: Vec<PatternRule>,
    builtin: Vec<PatternRule>,
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternLibrary {
    /// Library with the built-in rules only
    pub fn new() -> Self {
        Self {
            custom: Vec::new(),
            builtin: BUILTIN_RULES.clone(),
        }
    }

    /// Register a custom rule.
    ///
    /// The pattern is compiled here so a bad grammar fails at registration,
    /// not on the first batch. The page is read from the named group `page`
    /// when present, otherwise from group 1.
    pub fn register(&mut self, name: &str, pattern: &str, confidence: f64) -> Result<()> {
        if !(confidence > 0.0 && confidence <= 1.0) {
            return Err(SequenceError::InvalidConfidence(confidence));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(SequenceError::InvalidPattern {
                name: pattern.to_string(),
                reason: "pattern name is empty".to_string(),
            });
        }
        if self.rules().any(|r| r.name == name) {
            return Err(SequenceError::InvalidPattern {
                name: name.to_string(),
                reason: "a rule with this name already exists".to_string(),
            });
        }

        let regex = Regex::new(pattern).map_err(|e| SequenceError::InvalidPattern {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        if regex.captures_len() < 2 {
            return Err(SequenceError::InvalidPattern {
                name: name.to_string(),
                reason: "pattern has no capture group for the page number".to_string(),
            });
        }

        self.custom.push(PatternRule {
            name: name.to_string(),
            regex,
            format: FormatType::Custom,
            confidence,
            extractor: Extractor::Capture,
            custom: true,
        });
        Ok(())
    }

    /// Builder-style variant of [`PatternLibrary::register`]
    pub fn with_pattern(mut self, name: &str, pattern: &str, confidence: f64) -> Result<Self> {
        self.register(name, pattern, confidence)?;
        Ok(self)
    }

    /// All rules in evaluation order
    pub fn rules(&self) -> impl Iterator<Item = &PatternRule> {
        self.custom.iter().chain(self.builtin.iter())
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.custom.len() + self.builtin.len()
    }

    /// Whether the library has no rules
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of caller-registered rules
    pub fn custom_count(&self) -> usize {
        self.custom.len()
    }
}
