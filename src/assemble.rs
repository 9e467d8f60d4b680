//! Page assembly: turning classified spans into per-page Markdown.

use crate::classify::{classify, ClassifierConfig, Fragment};
use crate::layout::{PageLayout, TextLine};

/// Literal separator inserted between non-empty pages. `{}` receives the
/// number of the page being emitted.
fn page_break(page_number: u32) -> String {
    format!("\n\n---\n*Page {}*\n\n", page_number)
}

/// Render one extractor line as Markdown.
///
/// If any span in the line classifies as a heading, the emitted text is
/// exactly that first heading fragment; the remaining spans of the line
/// are dropped. Otherwise body fragments join with single spaces. Lines
/// with no non-blank span yield `None`.
pub fn assemble_line(line: &TextLine, config: &ClassifierConfig) -> Option<String> {
    let fragments: Vec<Fragment> = line
        .spans
        .iter()
        .filter_map(|span| classify(span, config))
        .collect();

    if fragments.is_empty() {
        return None;
    }

    if let Some(heading) = fragments.iter().find(|f| f.is_heading()) {
        return Some(heading.render());
    }

    Some(
        fragments
            .iter()
            .map(Fragment::render)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Render one page: non-blank lines joined with blank lines to force
/// Markdown paragraph breaks. Empty string for a page with no content.
pub fn assemble_page(page: &PageLayout, config: &ClassifierConfig) -> String {
    page.lines
        .iter()
        .filter_map(|line| assemble_line(line, config))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render a whole document: page contents joined by page-break markers.
///
/// The marker carries the number of the page being emitted and only ever
/// appears between two non-empty pages, never before the first one.
/// Empty pages contribute neither content nor a separator. Returns the
/// assembled Markdown and the number of pages processed.
pub fn assemble_document(pages: &[PageLayout], config: &ClassifierConfig) -> (String, usize) {
    let mut output = String::new();
    let mut emitted_any = false;

    for page in pages {
        let content = assemble_page(page, config);
        if content.is_empty() {
            continue;
        }
        if emitted_any {
            output.push_str(&page_break(page.number));
        }
        output.push_str(&content);
        emitted_any = true;
    }

    (output, pages.len())
}
