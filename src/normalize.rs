//! Markdown normalization pass.
//!
//! A pure text-to-text cleanup applied to every conversion result, whether
//! it came from the PDF layout path or from the external converter. The
//! pass is idempotent: `normalize(normalize(s)) == normalize(s)`. Each rule
//! only inserts a blank line where the "missing blank line" precondition
//! holds, so a second run finds nothing left to do.

use regex::Regex;

/// Markdown normalizer with precompiled patterns.
pub struct MarkdownNormalizer {
    collapse_newlines: Regex,
    blank_before_heading: Regex,
    blank_after_heading: Regex,
    blank_before_list: Regex,
}

impl MarkdownNormalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self {
            collapse_newlines: Regex::new(r"\n{3,}").unwrap(),
            blank_before_heading: Regex::new(r"([^\n])\n(#{1,6})").unwrap(),
            blank_after_heading: Regex::new(r"(?m)^(#{1,6}[^\n]*)\n([^\n#])").unwrap(),
            blank_before_list: Regex::new(r"([^\n])\n([ \t]*[-*+])").unwrap(),
        }
    }

    /// Apply the full normalization pass.
    ///
    /// Transformations, in order:
    /// 1. Collapse runs of 3+ newlines to exactly 2.
    /// 2. Blank line before a heading line that lacks one.
    /// 3. Blank line after a heading line when the next line is non-blank
    ///    and not itself a heading.
    /// 4. Blank line before a list-item line that lacks one.
    /// 5. Blank line at table block boundaries.
    /// 6. Trim leading/trailing whitespace of the whole document.
    pub fn normalize(&self, markdown: &str) -> String {
        let result = self.collapse_newlines.replace_all(markdown, "\n\n");
        let result = self
            .blank_before_heading
            .replace_all(&result, "${1}\n\n${2}");
        let result = self
            .blank_after_heading
            .replace_all(&result, "${1}\n\n${2}");
        let result = self.blank_before_list.replace_all(&result, "${1}\n\n${2}");
        let result = self.isolate_tables(&result);
        result.trim().to_string()
    }

    /// Insert blank lines at table block boundaries.
    ///
    /// A line is a table line when it contains `|` and its trimmed form
    /// starts with `|`. A blank line is inserted at each table/non-table
    /// transition unless the boundary is already blank.
    fn isolate_tables(&self, text: &str) -> String {
        let mut out: Vec<&str> = Vec::new();
        let mut prev_was_table = false;

        for line in text.split('\n') {
            let is_table = is_table_line(line);
            let is_blank = line.trim().is_empty();

            if is_table && !prev_was_table {
                if let Some(prev) = out.last() {
                    if !prev.trim().is_empty() {
                        out.push("");
                    }
                }
            } else if !is_table && prev_was_table && !is_blank {
                out.push("");
            }

            out.push(line);
            prev_was_table = is_table;
        }

        out.join("\n")
    }
}

impl Default for MarkdownNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_table_line(line: &str) -> bool {
    line.contains('|') && line.trim_start().starts_with('|')
}
