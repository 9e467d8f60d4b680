//! PDF layout path: extractor spans -> classified lines -> Markdown.

use std::path::Path;

use crate::assemble::assemble_document;
use crate::classify::ClassifierConfig;
use crate::error::Result;
use crate::layout::LayoutExtractor;
use crate::normalize::MarkdownNormalizer;

/// Outcome of the PDF layout path, before the report is built.
pub(crate) struct PdfOutcome {
    /// Normalized Markdown.
    pub markdown: String,
    /// Number of pages in the source document.
    pub pages: usize,
}

/// Convert a PDF via the layout path. The returned Markdown is already
/// normalized; the caller writes it and builds the report.
pub(crate) fn convert_pdf(
    extractor: &dyn LayoutExtractor,
    classifier: &ClassifierConfig,
    normalizer: &MarkdownNormalizer,
    input: &Path,
) -> Result<PdfOutcome> {
    let pages = extractor.extract_pages(input)?;
    let (assembled, processed) = assemble_document(&pages, classifier);
    let markdown = normalizer.normalize(&assembled);

    log::debug!(
        "{}: {} pages, {} chars of markdown",
        input.display(),
        processed,
        markdown.len()
    );

    Ok(PdfOutcome {
        markdown,
        pages: processed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PageLayout, StyleFlags, TextLine, TextSpan};

    struct FixedExtractor(Vec<PageLayout>);

    impl LayoutExtractor for FixedExtractor {
        fn extract_pages(&self, _path: &Path) -> Result<Vec<PageLayout>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_convert_pdf_normalizes_output() {
        let pages = vec![PageLayout {
            number: 1,
            lines: vec![
                TextLine::new(vec![TextSpan::new("Title", 18.0, StyleFlags::default())]),
                TextLine::new(vec![TextSpan::plain("body text")]),
            ],
        }];
        let extractor = FixedExtractor(pages);
        let outcome = convert_pdf(
            &extractor,
            &ClassifierConfig::default(),
            &MarkdownNormalizer::new(),
            Path::new("fixture.pdf"),
        )
        .unwrap();

        assert_eq!(outcome.pages, 1);
        assert_eq!(outcome.markdown, "# Title\n\nbody text");
    }
}
