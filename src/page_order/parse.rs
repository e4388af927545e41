//! Filename Parser
//!
//! Applies the pattern library to a single filename.

use super::patterns::{Extractor, PatternLibrary, PatternRule};
use super::types::{PageInfo, PageMetadata, ParserOptions};
use regex::Captures;
use tracing::debug;

/// Longest suffix treated as a file extension
const MAX_EXTENSION_LEN: usize = 5;

/// Confidence step between related variants of one rule
const CONFIDENCE_STEP: f64 = 0.05;

/// Page number and confidence recovered by one rule
#[derive(Debug, Clone, PartialEq)]
struct Extraction {
    page: u32,
    confidence: f64,
    metadata: PageMetadata,
}

/// Stateless filename parser
#[derive(Debug, Clone, Default)]
pub struct FilenameParser {
    library: PatternLibrary,
    options: ParserOptions,
}

impl FilenameParser {
    /// Create a parser over a library and options
    pub fn new(library: PatternLibrary, options: ParserOptions) -> Self {
        Self { library, options }
    }

    /// Active pattern library
    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Active parser options
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse one filename.
    ///
    /// Never fails: a name no rule understands yields [`PageInfo::unknown`].
    pub fn parse(&self, filename: &str) -> PageInfo {
        let stem = Self::stem(filename);
        if stem.is_empty() {
            return PageInfo::unknown(filename);
        }

        for rule in self.library.rules() {
            if let Some(found) = self.apply(rule, stem) {
                debug!(
                    filename,
                    rule = %rule.name,
                    page = found.page,
                    confidence = found.confidence,
                    "parsed filename"
                );
                return PageInfo::matched(
                    filename,
                    found.page,
                    rule.format,
                    found.confidence,
                    found.metadata,
                );
            }
            if Self::claims_without_page(rule, stem) {
                debug!(filename, rule = %rule.name, "date stamp without a sequence number");
                return PageInfo::unknown(filename);
            }
        }

        debug!(filename, "no pattern matched");
        PageInfo::unknown(filename)
    }

    /// Camera names whose only number is the date stop evaluation here, so
    /// later rules never read the date as a page.
    fn claims_without_page(rule: &PatternRule, stem: &str) -> bool {
        rule.extractor == Extractor::CameraDate && rule.regex.is_match(stem)
    }

    /// Final path component with one extension removed, trimmed.
    ///
    /// A trailing `.xyz` only counts as an extension when it is 1-5 ASCII
    /// alphanumerics with at least one letter, and something precedes the dot.
    pub fn stem(filename: &str) -> &str {
        let base = filename.rsplit(&['/', '\\'][..]).next().unwrap_or(filename);
        let stem = match base.rfind('.') {
            Some(dot) if dot > 0 => {
                let ext = &base[dot + 1..];
                if !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LEN
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
                    && ext.chars().any(|c| c.is_ascii_alphabetic())
                {
                    &base[..dot]
                } else {
                    base
                }
            }
            _ => base,
        };
        stem.trim()
    }

    fn apply(&self, rule: &PatternRule, stem: &str) -> Option<Extraction> {
        match rule.extractor {
            Extractor::Baron => self.extract_baron(rule, stem),
            Extractor::PageWord => {
                let caps = rule.regex.captures(stem)?;
                let page = page_number(&caps, "page")?;
                let prefix = caps.name("prefix")?.as_str().to_lowercase();
                let confidence = match prefix.as_str() {
                    "page" => rule.confidence,
                    "pg" => rule.confidence - CONFIDENCE_STEP,
                    _ => rule.confidence - 2.0 * CONFIDENCE_STEP,
                };
                Some(Extraction {
                    page,
                    confidence,
                    metadata: PageMetadata::Prefixed { prefix },
                })
            }
            Extractor::ChapterPage => self.extract_chapter(rule, stem),
            Extractor::CameraDate => {
                let caps = rule.regex.captures(stem)?;
                let page = page_number(&caps, "page")?;
                Some(Extraction {
                    page,
                    confidence: rule.confidence,
                    metadata: PageMetadata::Dated {
                        prefix: caps.name("prefix")?.as_str().to_lowercase(),
                        date: caps.name("date")?.as_str().to_string(),
                        sequence: page,
                    },
                })
            }
            Extractor::Prefixed => {
                let caps = rule.regex.captures(stem)?;
                let page = page_number(&caps, "page")?;
                let prefix = caps.name("prefix")?.as_str().to_lowercase();
                Some(Extraction {
                    page,
                    confidence: rule.confidence,
                    metadata: PageMetadata::Prefixed { prefix },
                })
            }
            Extractor::LeadingDigits => {
                let caps = rule.regex.captures(stem)?;
                let page = page_number(&caps, "page")?;
                let exact = caps.name("rest").map_or(true, |m| m.as_str().is_empty());
                Some(Extraction {
                    page,
                    confidence: if exact {
                        rule.confidence
                    } else {
                        rule.confidence - CONFIDENCE_STEP
                    },
                    metadata: PageMetadata::Numeric { exact },
                })
            }
            Extractor::NumberWords => {
                let caps = rule.regex.captures(stem)?;
                let words = caps.name("words")?.as_str().to_lowercase();
                let page = number_from_words(&words)?;
                Some(Extraction {
                    page,
                    confidence: rule.confidence,
                    metadata: PageMetadata::Named { word: words },
                })
            }
            Extractor::LastNumber => {
                let runs: Vec<&str> = rule.regex.find_iter(stem).map(|m| m.as_str()).collect();
                let page = parse_positive(runs.last()?)?;
                let confidence = if runs.len() == 1 {
                    rule.confidence
                } else {
                    rule.confidence - 2.0 * CONFIDENCE_STEP
                };
                Some(Extraction {
                    page,
                    confidence,
                    metadata: PageMetadata::Fallback {
                        candidates: runs.len(),
                    },
                })
            }
            Extractor::Capture => {
                let caps = rule.regex.captures(stem)?;
                let digits = caps.name("page").or_else(|| caps.get(1))?;
                Some(Extraction {
                    page: parse_positive(digits.as_str())?,
                    confidence: rule.confidence,
                    metadata: PageMetadata::Custom {
                        pattern: rule.name.clone(),
                    },
                })
            }
        }
    }

    /// `baronNNN` is position 0 of group NNN; `baronNNN K` is offset K.
    /// Groups are laid end to end, `span` pages each.
    fn extract_baron(&self, rule: &PatternRule, stem: &str) -> Option<Extraction> {
        let caps = rule.regex.captures(stem)?;
        let group = page_number(&caps, "group")?;
        let offset = match caps.name("offset") {
            Some(m) => Some(m.as_str().parse::<u32>().ok()?),
            None => None,
        };

        let span = self.options.baron_page_span;
        let position = offset.unwrap_or(0);
        let page = span
            .checked_mul(group - 1)?
            .checked_add(position)?
            .checked_add(1)?;

        let confidence = match offset {
            None => rule.confidence,
            Some(k) if k < span => rule.confidence - CONFIDENCE_STEP,
            // Offset runs into the next group's pages.
            Some(_) => rule.confidence - 2.0 * CONFIDENCE_STEP,
        };

        Some(Extraction {
            page,
            confidence,
            metadata: PageMetadata::Baron {
                group,
                position,
                span,
            },
        })
    }

    fn extract_chapter(&self, rule: &PatternRule, stem: &str) -> Option<Extraction> {
        let caps = rule.regex.captures(stem)?;
        let chapter = caps.name("chapter")?.as_str().parse::<u32>().ok()?;
        let page_in_chapter = page_number(&caps, "page")?;

        let (page, mapped) = match self.options.chapter_offsets.get(&chapter) {
            Some(&first) => (first.checked_add(page_in_chapter - 1)?, true),
            None => (page_in_chapter, false),
        };

        Some(Extraction {
            page,
            confidence: rule.confidence,
            metadata: PageMetadata::Chapter {
                chapter,
                page_in_chapter,
                mapped,
            },
        })
    }
}

/// Positive page number from a named capture
fn page_number(caps: &Captures<'_>, group: &str) -> Option<u32> {
    parse_positive(caps.name(group)?.as_str())
}

/// Digits to a page number; 0 and overflow are rejected
fn parse_positive(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|&n| n >= 1)
}

/// Spelled-out English number (one..ninety-nine)
fn number_from_words(words: &str) -> Option<u32> {
    let tokens: Vec<&str> = words
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    match tokens.as_slice() {
        [single] => small_number(single).or_else(|| tens(single)),
        [ten, unit] => {
            let unit = small_number(unit).filter(|&n| n < 10)?;
            Some(tens(ten)? + unit)
        }
        _ => None,
    }
}

fn small_number(word: &str) -> Option<u32> {
    let n = match word {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        _ => return None,
    };
    Some(n)
}

fn tens(word: &str) -> Option<u32> {
    let n = match word {
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        _ => return None,
    };
    Some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_order::types::FormatType;

    fn parser() -> FilenameParser {
        FilenameParser::default()
    }

    #[test]
    fn test_stem_strips_one_extension() {
        assert_eq!(FilenameParser::stem("baron001 24.png"), "baron001 24");
        assert_eq!(FilenameParser::stem("scans/page_003.jpeg"), "page_003");
        assert_eq!(FilenameParser::stem("C:\\scans\\p4.TIF"), "p4");
        assert_eq!(FilenameParser::stem("archive.tar.gz"), "archive.tar");
        assert_eq!(FilenameParser::stem(".hidden"), ".hidden");
        assert_eq!(FilenameParser::stem("p. 12"), "p. 12");
        assert_eq!(FilenameParser::stem("  "), "");
    }

    #[test]
    fn test_digit_only_suffix_is_not_an_extension() {
        assert_eq!(FilenameParser::stem("page.12"), "page.12");
        assert_eq!(FilenameParser::stem("page.12.png"), "page.12");
        assert_eq!(FilenameParser::stem("scan.mp4"), "scan");

        let info = parser().parse("page.12");
        assert_eq!(info.page_number, Some(12));
        assert_eq!(info.format_type, FormatType::PagePrefixed);
    }

    #[test]
    fn test_baron_grouping() {
        let p = parser();
        let base = p.parse("baron001.png");
        assert_eq!(base.page_number, Some(1));
        assert_eq!(base.format_type, FormatType::Baron);
        assert_eq!(base.confidence, 1.0);

        let companion = p.parse("baron001 24.png");
        assert_eq!(companion.page_number, Some(25));
        assert!(companion.confidence >= 0.9 && companion.confidence < 1.0);
        assert_eq!(
            companion.metadata,
            PageMetadata::Baron {
                group: 1,
                position: 24,
                span: 25
            }
        );

        assert_eq!(p.parse("baron002.png").page_number, Some(26));
        assert_eq!(p.parse("Baron002_3.jpg").page_number, Some(29));
    }

    #[test]
    fn test_baron_offset_beyond_span_is_less_confident() {
        let p = parser();
        let inside = p.parse("baron001 24.png");
        let beyond = p.parse("baron001 30.png");
        assert_eq!(beyond.page_number, Some(31));
        assert!(beyond.confidence < inside.confidence);
        assert!(beyond.confidence >= 0.9 - 1e-9);
    }

    #[test]
    fn test_baron_custom_span() {
        let p = FilenameParser::new(
            PatternLibrary::new(),
            ParserOptions::builder().baron_page_span(10).build(),
        );
        assert_eq!(p.parse("baron003 2.png").page_number, Some(23));
    }

    #[test]
    fn test_baron_group_zero_falls_through() {
        let info = parser().parse("baron000.png");
        assert_ne!(info.format_type, FormatType::Baron);
    }

    #[test]
    fn test_page_word_formats() {
        let p = parser();
        let page = p.parse("page_001.jpg");
        assert_eq!(page.page_number, Some(1));
        assert_eq!(page.format_type, FormatType::PagePrefixed);
        assert_eq!(page.confidence, 0.95);

        let pg = p.parse("pg33.gif");
        assert_eq!(pg.page_number, Some(33));
        assert!((pg.confidence - 0.90).abs() < 1e-9);

        let short = p.parse("P-7.png");
        assert_eq!(short.page_number, Some(7));
        assert!((short.confidence - 0.85).abs() < 1e-9);

        assert_eq!(p.parse("Page 12 (final).jpg").page_number, Some(12));
    }

    #[test]
    fn test_camera_date_takes_trailing_sequence() {
        let info = parser().parse("IMG_20240101_001.jpg");
        assert_eq!(info.page_number, Some(1));
        assert_eq!(info.format_type, FormatType::ImageScan);
        assert_eq!(
            info.metadata,
            PageMetadata::Dated {
                prefix: "img".to_string(),
                date: "20240101".to_string(),
                sequence: 1,
            }
        );
    }

    #[test]
    fn test_date_only_camera_name_has_no_page() {
        let p = parser();
        for name in ["IMG_20240101.jpg", "DSC20231231.JPG", "photo-20240229 (copy).png"] {
            let info = p.parse(name);
            assert_eq!(info.page_number, None, "{name}");
            assert_eq!(info.format_type, FormatType::Unknown, "{name}");
            assert_eq!(info.confidence, 0.0, "{name}");
        }

        // Not a calendar date: an ordinary image sequence number.
        let info = p.parse("IMG_12345678.jpg");
        assert_eq!(info.page_number, Some(12345678));
        assert_eq!(info.format_type, FormatType::ImageScan);
    }

    #[test]
    fn test_non_ascii_digits_are_not_pages() {
        let p = parser();
        assert!(!p.parse("page_\u{0661}\u{0662}.png").is_parsed());
        assert!(!p.parse("\u{FF11}\u{FF12}.jpg").is_parsed());
        assert_eq!(p.parse("page_\u{0661}_7.png").page_number, Some(7));
    }

    #[test]
    fn test_chapter_page_without_mapping() {
        let info = parser().parse("chapter2_page5.png");
        assert_eq!(info.page_number, Some(5));
        assert_eq!(info.format_type, FormatType::ChapterPage);
        assert_eq!(
            info.metadata,
            PageMetadata::Chapter {
                chapter: 2,
                page_in_chapter: 5,
                mapped: false
            }
        );
        assert_eq!(parser().parse("ch3p4.jpg").page_number, Some(4));
    }

    #[test]
    fn test_chapter_page_with_mapping() {
        let p = FilenameParser::new(
            PatternLibrary::new(),
            ParserOptions::builder().chapter_offset(2, 31).build(),
        );
        let info = p.parse("ch2p5.png");
        assert_eq!(info.page_number, Some(35));
        assert!(matches!(
            info.metadata,
            PageMetadata::Chapter { mapped: true, .. }
        ));
    }

    #[test]
    fn test_generic_prefixes() {
        let p = parser();
        let scan = p.parse("scan-007.tif");
        assert_eq!(scan.page_number, Some(7));
        assert_eq!(scan.format_type, FormatType::ImageScan);

        let book = p.parse("book_page_009.jpg");
        assert_eq!(book.page_number, Some(9));
        assert_eq!(book.format_type, FormatType::BookPage);

        assert_eq!(p.parse("manuscript_11.png").page_number, Some(11));
        assert_eq!(p.parse("document 12.pdf").page_number, Some(12));
    }

    #[test]
    fn test_bare_numeric() {
        let p = parser();
        let exact = p.parse("042.png");
        assert_eq!(exact.page_number, Some(42));
        assert_eq!(exact.format_type, FormatType::Numeric);
        assert_eq!(exact.confidence, 0.6);

        let leading = p.parse("15_left.png");
        assert_eq!(leading.page_number, Some(15));
        assert!(leading.confidence < exact.confidence);
    }

    #[test]
    fn test_named_numbers() {
        let p = parser();
        let info = p.parse("page_one.jpg");
        assert_eq!(info.page_number, Some(1));
        assert_eq!(info.format_type, FormatType::Named);
        assert_eq!(p.parse("twenty-one.png").page_number, Some(21));
        assert_eq!(p.parse("Thirteen.png").page_number, Some(13));
        assert_eq!(p.parse("ten_one.png").page_number, None);
    }

    #[test]
    fn test_last_number_fallback() {
        let p = parser();
        let single = p.parse("front matter v3.png");
        assert_eq!(single.page_number, Some(3));
        assert_eq!(single.format_type, FormatType::Numeric);
        assert!((single.confidence - 0.4).abs() < 1e-9);

        let several = p.parse("final scan 2023-05-01 (12).png");
        assert_eq!(several.page_number, Some(12));
        assert!((several.confidence - 0.3).abs() < 1e-9);
        assert_eq!(several.metadata, PageMetadata::Fallback { candidates: 4 });
    }

    #[test]
    fn test_unknown_format() {
        let info = parser().parse("no_numbers_here.png");
        assert_eq!(info.page_number, None);
        assert_eq!(info.confidence, 0.0);
        assert_eq!(info.format_type, FormatType::Unknown);

        assert!(!parser().parse("").is_parsed());
        assert!(!parser().parse("cover.jpg").is_parsed());
    }

    #[test]
    fn test_zero_and_overflow_are_not_pages() {
        let p = parser();
        assert!(!p.parse("page_000.jpg").is_parsed());
        assert!(!p.parse("99999999999999.png").is_parsed());
    }

    #[test]
    fn test_custom_rule_wins_over_builtin() {
        let library = PatternLibrary::new()
            .with_pattern("leaf", r"(?i)^page_(?P<page>\d+)r$", 0.99)
            .unwrap();
        let p = FilenameParser::new(library, ParserOptions::default());

        let info = p.parse("page_12r.jpg");
        assert_eq!(info.page_number, Some(12));
        assert_eq!(info.format_type, FormatType::Custom);
        assert_eq!(
            info.metadata,
            PageMetadata::Custom {
                pattern: "leaf".to_string()
            }
        );

        // Non-matching names still reach the built-ins.
        assert_eq!(p.parse("page_12.jpg").format_type, FormatType::PagePrefixed);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let p = parser();
        for name in ["baron001 24.png", "IMG_20240101_001.jpg", "no_numbers_here.png"] {
            assert_eq!(p.parse(name), p.parse(name));
        }
    }

    #[test]
    fn test_page_number_present_iff_confidence_positive() {
        let p = parser();
        for name in [
            "baron001.png",
            "pg33.gif",
            "ch1p2.png",
            "scan_4.jpg",
            "5.png",
            "page_six.png",
            "x9y",
            "nothing.png",
            "",
        ] {
            let info = p.parse(name);
            assert_eq!(info.page_number.is_some(), info.confidence > 0.0, "{name}");
        }
    }
}
