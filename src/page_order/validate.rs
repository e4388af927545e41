//! Sequence Validator
//!
//! Reports gaps, duplicate page numbers and low-confidence parses in a sorted
//! batch. Findings are advisory; nothing here stops a batch.

use super::types::{AnnotatedFile, Result, SequenceError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

// ============================================================
// Constants
// ============================================================

/// Default largest page jump still treated as missing pages
pub const DEFAULT_MAX_GAP: u32 = 10;

/// Default confidence below which a parse is flagged for review
pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Gaps missing at most this many pages are informational
const MINOR_GAP_PAGES: u32 = 3;

// ============================================================
// Issue Types
// ============================================================

/// Kind of validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Gap,
    Duplicate,
    LowConfidence,
}

/// Finding severity, ordered from least to most serious
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Inclusive page range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: String,
    /// Affected filenames, in sequence order
    pub files: Vec<String>,
    /// Pages missing between the affected files (gap issues only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<PageRange>,
}

// ============================================================
// Options
// ============================================================

/// Validation options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationOptions {
    /// Largest page jump reported as missing pages; larger jumps are errors
    pub max_gap: u32,
    /// Confidence below which a file is flagged
    pub low_confidence_threshold: f64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_gap: DEFAULT_MAX_GAP,
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
        }
    }
}

impl ValidationOptions {
    /// Check option ranges
    pub fn check(&self) -> Result<()> {
        if self.max_gap == 0 {
            return Err(SequenceError::InvalidMaxGap(self.max_gap));
        }
        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err(SequenceError::InvalidThreshold(
                self.low_confidence_threshold,
            ));
        }
        Ok(())
    }
}

// ============================================================
// Sequence Validator
// ============================================================

/// Validator for sorted page sequences
#[derive(Debug, Clone)]
pub struct SequenceValidator {
    options: ValidationOptions,
}

impl Default for SequenceValidator {
    fn default() -> Self {
        Self {
            options: ValidationOptions::default(),
        }
    }
}

impl SequenceValidator {
    /// Create a validator, rejecting out-of-range options
    pub fn new(options: ValidationOptions) -> Result<Self> {
        options.check()?;
        Ok(Self { options })
    }

    /// Validate with default options and the given max gap
    pub fn validate_with_gap(files: &[AnnotatedFile], max_gap: u32) -> Result<Vec<ValidationIssue>> {
        let validator = Self::new(ValidationOptions {
            max_gap,
            ..Default::default()
        })?;
        Ok(validator.validate(files))
    }

    /// Active options
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Run every check over a sorted batch.
    ///
    /// Issues come out gaps first, then duplicates, then low-confidence files.
    pub fn validate(&self, files: &[AnnotatedFile]) -> Vec<ValidationIssue> {
        let mut issues = self.check_gaps(files);
        issues.extend(self.check_duplicates(files));
        issues.extend(self.check_low_confidence(files));
        issues
    }

    /// Walk consecutive distinct page numbers looking for jumps
    pub fn check_gaps(&self, files: &[AnnotatedFile]) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut previous: Option<(u32, &str)> = None;

        for file in files {
            let Some(page) = file.calculated_page_number else {
                continue;
            };

            if let Some((prev_page, prev_name)) = previous {
                if page.saturating_sub(prev_page) > 1 {
                    issues.push(self.gap_issue(prev_page, prev_name, page, file.name()));
                }
            }
            previous = Some((page, file.name()));
        }

        issues
    }

    fn gap_issue(&self, before: u32, before_name: &str, after: u32, after_name: &str) -> ValidationIssue {
        let jump = after - before;
        let missing = PageRange {
            start: before + 1,
            end: after - 1,
        };
        let count = missing.end - missing.start + 1;
        let pages = if count == 1 {
            format!("page {}", missing.start)
        } else {
            format!("pages {}-{}", missing.start, missing.end)
        };

        let (severity, message) = if jump > self.options.max_gap {
            warn!(
                from = before,
                to = after,
                max_gap = self.options.max_gap,
                "page jump exceeds max gap"
            );
            (
                Severity::Error,
                format!(
                    "Jump from page {} to {} exceeds max gap {} ({} missing); likely a parsing failure",
                    before, after, self.options.max_gap, pages
                ),
            )
        } else if count <= MINOR_GAP_PAGES {
            (Severity::Info, format!("Missing {}", pages))
        } else {
            (Severity::Warning, format!("Missing {}", pages))
        };

        ValidationIssue {
            issue_type: IssueType::Gap,
            severity,
            message,
            files: vec![before_name.to_string(), after_name.to_string()],
            missing: Some(missing),
        }
    }

    /// One issue per page number computed for more than one file
    pub fn check_duplicates(&self, files: &[AnnotatedFile]) -> Vec<ValidationIssue> {
        let mut by_page: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
        for file in files {
            if let Some(page) = file.calculated_page_number {
                by_page.entry(page).or_default().push(file.name());
            }
        }

        by_page
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(page, names)| ValidationIssue {
                issue_type: IssueType::Duplicate,
                severity: Severity::Warning,
                message: format!("Page {} computed for {} files", page, names.len()),
                files: names.into_iter().map(str::to_string).collect(),
                missing: None,
            })
            .collect()
    }

    /// One issue per file below the confidence threshold
    pub fn check_low_confidence(&self, files: &[AnnotatedFile]) -> Vec<ValidationIssue> {
        files
            .iter()
            .filter(|f| f.page_confidence < self.options.low_confidence_threshold)
            .map(|f| {
                let message = match f.calculated_page_number {
                    None => format!("No page number found in '{}'", f.name()),
                    Some(page) => format!(
                        "Low confidence ({:.2}) for page {} from '{}'",
                        f.page_confidence,
                        page,
                        f.name()
                    ),
                };
                ValidationIssue {
                    issue_type: IssueType::LowConfidence,
                    severity: Severity::Warning,
                    message,
                    files: vec![f.name().to_string()],
                    missing: None,
                }
            })
            .collect()
    }
}
