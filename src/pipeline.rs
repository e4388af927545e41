//! Ordering pipeline
//!
//! Runs parse → sort → validate over one batch and collects the result into an
//! [`OrderingReport`].

use crate::config::SequencerConfig;
use crate::page_order::{
    AnnotatedFile, BatchSorter, FileDescriptor, FilenameParser, FormatType, Result,
    SequenceValidator, Severity, SortOptions, ValidationIssue,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Batch-level counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Files in the ordered sequence
    pub total: usize,
    /// Files with a page number
    pub parsed: usize,
    /// Files without a page number
    pub unparsed: usize,
    /// Files per detected format
    pub formats: BTreeMap<FormatType, usize>,
    /// Lowest page number
    pub first_page: Option<u32>,
    /// Highest page number
    pub last_page: Option<u32>,
    /// Issues per severity
    pub issues: BTreeMap<Severity, usize>,
}

impl BatchSummary {
    fn collect(files: &[AnnotatedFile], issues: &[ValidationIssue]) -> Self {
        let mut summary = Self {
            total: files.len(),
            ..Default::default()
        };

        for file in files {
            *summary.formats.entry(file.filename_format).or_default() += 1;
            if let Some(page) = file.calculated_page_number {
                summary.parsed += 1;
                summary.first_page = Some(summary.first_page.map_or(page, |p| p.min(page)));
                summary.last_page = Some(summary.last_page.map_or(page, |p| p.max(page)));
            }
        }
        summary.unparsed = summary.total - summary.parsed;

        for issue in issues {
            *summary.issues.entry(issue.severity).or_default() += 1;
        }
        summary
    }

    /// Number of issues at a severity
    pub fn issue_count(&self, severity: Severity) -> usize {
        self.issues.get(&severity).copied().unwrap_or(0)
    }
}

/// Ordered, annotated batch plus its validation findings
#[derive(Debug, Clone, Serialize)]
pub struct OrderingReport {
    pub generated_at: DateTime<Utc>,
    pub summary: BatchSummary,
    pub files: Vec<AnnotatedFile>,
    pub issues: Vec<ValidationIssue>,
}

impl OrderingReport {
    /// Most serious issue severity, if any issue was reported
    pub fn max_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity).max()
    }

    /// Whether any error-severity issue was reported
    pub fn has_errors(&self) -> bool {
        self.max_severity() == Some(Severity::Error)
    }
}

/// Parser, sorter options and validator bundled for repeated use
#[derive(Debug, Clone)]
pub struct PageSequencer {
    parser: FilenameParser,
    validator: SequenceValidator,
    sort_options: SortOptions,
}

impl Default for PageSequencer {
    fn default() -> Self {
        Self {
            parser: FilenameParser::default(),
            validator: SequenceValidator::default(),
            sort_options: SortOptions::default(),
        }
    }
}

impl PageSequencer {
    /// Build from resolved settings
    pub fn new(config: SequencerConfig) -> Result<Self> {
        Ok(Self {
            parser: FilenameParser::new(config.library, config.parser),
            validator: SequenceValidator::new(config.validation)?,
            sort_options: config.sorting,
        })
    }

    /// Active parser
    pub fn parser(&self) -> &FilenameParser {
        &self.parser
    }

    /// Parse, sort and validate one batch. An empty batch yields an empty
    /// report.
    pub fn order(&self, files: Vec<FileDescriptor>) -> OrderingReport {
        let files = BatchSorter::sort_with_options(files, &self.parser, &self.sort_options);
        let issues = self.validator.validate(&files);
        let summary = BatchSummary::collect(&files, &issues);

        info!(
            files = summary.total,
            parsed = summary.parsed,
            errors = summary.issue_count(Severity::Error),
            warnings = summary.issue_count(Severity::Warning),
            "ordered batch"
        );

        OrderingReport {
            generated_at: Utc::now(),
            summary,
            files,
            issues,
        }
    }
}
