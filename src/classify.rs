//! Span classification: mapping font size and style flags to Markdown.
//!
//! Heading inference is purely a function of font size against a fixed,
//! overridable threshold table. Style flags only apply to body text;
//! a heading never receives emphasis wrapping even when its flags are set.

use crate::layout::TextSpan;

/// Font size assumed when the extractor reports none.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// One font-size-to-heading rule. A span whose size is strictly greater
/// than `min_size` renders at `level`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingRule {
    /// Exclusive lower bound on font size.
    pub min_size: f32,
    /// Markdown heading level (1-6).
    pub level: u8,
}

/// Classifier configuration: the heading threshold table.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Rules sorted largest threshold first; first match wins.
    rules: Vec<HeadingRule>,
}

impl ClassifierConfig {
    /// Create a config from a custom rule table.
    ///
    /// Rules are re-sorted largest threshold first so that the first
    /// match always is the highest applicable level.
    pub fn with_rules(mut rules: Vec<HeadingRule>) -> Self {
        rules.sort_by(|a, b| {
            b.min_size
                .partial_cmp(&a.min_size)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { rules }
    }

    /// Heading level for a font size, or `None` for body text.
    pub fn heading_level(&self, font_size: f32) -> Option<u8> {
        self.rules
            .iter()
            .find(|r| font_size > r.min_size)
            .map(|r| r.level)
    }
}

impl Default for ClassifierConfig {
    /// The standard table: > 16pt → H1, > 14pt → H2, > 12pt → H3.
    fn default() -> Self {
        Self::with_rules(vec![
            HeadingRule {
                min_size: 16.0,
                level: 1,
            },
            HeadingRule {
                min_size: 14.0,
                level: 2,
            },
            HeadingRule {
                min_size: 12.0,
                level: 3,
            },
        ])
    }
}

/// A span rendered as a Markdown fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A heading line.
    Heading {
        /// Heading level (1-6).
        level: u8,
        /// Trimmed heading text, no markers.
        text: String,
    },
    /// Style-wrapped body text.
    Body(String),
}

impl Fragment {
    /// Render the fragment to its Markdown string.
    pub fn render(&self) -> String {
        match self {
            Fragment::Heading { level, text } => {
                format!("{} {}", "#".repeat(*level as usize), text)
            }
            Fragment::Body(text) => text.clone(),
        }
    }

    /// Whether this fragment is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Fragment::Heading { .. })
    }
}

/// Classify one span. Spans whose trimmed text is empty produce no
/// fragment, so no empty heading markers are ever emitted.
pub fn classify(span: &TextSpan, config: &ClassifierConfig) -> Option<Fragment> {
    let text = span.text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(level) = config.heading_level(span.font_size) {
        return Some(Fragment::Heading {
            level,
            text: text.to_string(),
        });
    }

    // Bold applied first, italic wrapped outside it.
    let mut rendered = text.to_string();
    if span.flags.bold {
        rendered = format!("**{}**", rendered);
    }
    if span.flags.italic {
        rendered = format!("*{}*", rendered);
    }
    Some(Fragment::Body(rendered))
}
