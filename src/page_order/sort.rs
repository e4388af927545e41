//! Batch Sorter
//!
//! Parses a batch of descriptors in parallel and orders them by page.

use super::parse::FilenameParser;
use super::types::{AnnotatedFile, FileDescriptor};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{info, warn};

/// Extensions accepted as page images when no MIME type is given
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "tif", "tiff", "bmp", "webp", "heic", "jp2",
];

/// Batch sorting options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOptions {
    /// Drop descriptors that are not page images before sorting
    pub images_only: bool,
}

/// Sorter for arranging files in page order
pub struct BatchSorter;

impl BatchSorter {
    /// Parse and sort with default options
    pub fn sort(files: Vec<FileDescriptor>, parser: &FilenameParser) -> Vec<AnnotatedFile> {
        Self::sort_with_options(files, parser, &SortOptions::default())
    }

    /// Parse every descriptor, annotate it, and sort.
    ///
    /// Order: page number ascending, then filename; files without a page
    /// number go last in their input order.
    pub fn sort_with_options(
        files: Vec<FileDescriptor>,
        parser: &FilenameParser,
        options: &SortOptions,
    ) -> Vec<AnnotatedFile> {
        let total = files.len();
        let candidates: Vec<FileDescriptor> = if options.images_only {
            files
                .into_iter()
                .filter(|d| {
                    let keep = Self::is_image_candidate(d);
                    if !keep {
                        warn!(name = %d.name, "skipping non-image file");
                    }
                    keep
                })
                .collect()
        } else {
            files
        };

        let mut annotated: Vec<AnnotatedFile> = candidates
            .into_par_iter()
            .map(|descriptor| {
                let info = parser.parse(&descriptor.name);
                AnnotatedFile::new(descriptor, info)
            })
            .collect();

        // Stable: equal keys keep input order.
        annotated.sort_by(Self::compare);

        let parsed = annotated
            .iter()
            .filter(|f| f.calculated_page_number.is_some())
            .count();
        info!(
            total,
            kept = annotated.len(),
            parsed,
            unparsed = annotated.len() - parsed,
            "sorted batch"
        );

        annotated
    }

    /// Ordering used by [`BatchSorter::sort`]
    pub fn compare(a: &AnnotatedFile, b: &AnnotatedFile) -> Ordering {
        match (a.calculated_page_number, b.calculated_page_number) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.name().cmp(b.name())),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Whether a descriptor looks like a page image
    pub fn is_image_candidate(descriptor: &FileDescriptor) -> bool {
        match descriptor.mime_type() {
            Some(mime) => mime.to_ascii_lowercase().starts_with("image/"),
            None => descriptor
                .name
                .rsplit_once('.')
                .map(|(_, ext)| {
                    let ext = ext.to_ascii_lowercase();
                    IMAGE_EXTENSIONS.contains(&ext.as_str())
                })
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors(names: &[&str]) -> Vec<FileDescriptor> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| FileDescriptor::new(format!("id-{i}"), *name))
            .collect()
    }

    fn names(files: &[AnnotatedFile]) -> Vec<&str> {
        files.iter().map(|f| f.name()).collect()
    }

    #[test]
    fn test_sort_empty_batch() {
        let sorted = BatchSorter::sort(Vec::new(), &FilenameParser::default());
        assert!(sorted.is_empty());
    }

    #[test]
    fn test_sort_by_page_number() {
        let files = descriptors(&["page_010.jpg", "baron001.png", "pg3.png", "002.png"]);
        let sorted = BatchSorter::sort(files, &FilenameParser::default());
        assert_eq!(
            names(&sorted),
            vec!["baron001.png", "002.png", "pg3.png", "page_010.jpg"]
        );
        assert_eq!(sorted[3].calculated_page_number, Some(10));
    }

    #[test]
    fn test_baron_groups_concatenate() {
        let files = descriptors(&["baron002.png", "baron001 24.png", "baron001 1.png", "baron001.png"]);
        let sorted = BatchSorter::sort(files, &FilenameParser::default());
        assert_eq!(
            names(&sorted),
            vec!["baron001.png", "baron001 1.png", "baron001 24.png", "baron002.png"]
        );
        let pages: Vec<Option<u32>> = sorted.iter().map(|f| f.calculated_page_number).collect();
        assert_eq!(pages, vec![Some(1), Some(2), Some(25), Some(26)]);
    }

    #[test]
    fn test_ties_break_by_filename_regardless_of_input_order() {
        let parser = FilenameParser::default();
        let forward = BatchSorter::sort(descriptors(&["scan_5.png", "page_5.png", "5.png"]), &parser);
        let backward = BatchSorter::sort(descriptors(&["5.png", "page_5.png", "scan_5.png"]), &parser);

        assert_eq!(names(&forward), vec!["5.png", "page_5.png", "scan_5.png"]);
        assert_eq!(names(&forward), names(&backward));
    }

    #[test]
    fn test_unparseable_files_last_in_input_order() {
        let files = descriptors(&["zeta.png", "page_2.png", "alpha.png", "page_1.png"]);
        let sorted = BatchSorter::sort(files, &FilenameParser::default());
        assert_eq!(
            names(&sorted),
            vec!["page_1.png", "page_2.png", "zeta.png", "alpha.png"]
        );
    }

    #[test]
    fn test_annotations_mirror_page_info() {
        let files = vec![FileDescriptor::new("x", "pg33.gif").with_mime_type("image/gif")];
        let sorted = BatchSorter::sort(files, &FilenameParser::default());
        let file = &sorted[0];
        assert_eq!(file.descriptor.id, "x");
        assert_eq!(file.descriptor.mime_type(), Some("image/gif"));
        assert_eq!(file.calculated_page_number, file.page_info.page_number);
        assert_eq!(file.filename_format, file.page_info.format_type);
        assert_eq!(file.page_confidence, file.page_info.confidence);
    }

    #[test]
    fn test_images_only_filter() {
        let files = vec![
            FileDescriptor::new("1", "page_1.jpg").with_mime_type("image/jpeg"),
            FileDescriptor::new("2", "page_2.pdf").with_mime_type("application/pdf"),
            FileDescriptor::new("3", "page_3.PNG"),
            FileDescriptor::new("4", "notes.txt"),
        ];
        let options = SortOptions { images_only: true };
        let sorted = BatchSorter::sort_with_options(files, &FilenameParser::default(), &options);
        assert_eq!(names(&sorted), vec!["page_1.jpg", "page_3.PNG"]);
    }

    #[test]
    fn test_sort_is_deterministic() {
        let parser = FilenameParser::default();
        let input = descriptors(&["b.png", "p1.png", "a.png", "page_1.png", "3.png"]);
        let first = BatchSorter::sort(input.clone(), &parser);
        let second = BatchSorter::sort(input, &parser);
        assert_eq!(names(&first), names(&second));
    }
}
