//! Text layout extraction for PDF documents.
//!
//! The conversion core does not parse PDFs itself; it consumes positioned
//! text runs from a [`LayoutExtractor`]. The bundled [`LopdfExtractor`]
//! walks page content streams with `lopdf` and reports spans grouped into
//! baseline lines, deterministically for a given input.

use std::collections::HashMap;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object};

use crate::error::{Error, Result};

/// Bold flag bit in a raw extractor flag word.
const FLAG_BOLD: u32 = 1 << 4;
/// Italic flag bit in a raw extractor flag word.
const FLAG_ITALIC: u32 = 1 << 1;

/// Style flags attached to a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleFlags {
    /// Span is rendered in a bold face.
    pub bold: bool,
    /// Span is rendered in an italic face.
    pub italic: bool,
}

impl StyleFlags {
    /// Decode a raw flag word as reported by layout extractors
    /// (bit 4 = bold, bit 1 = italic).
    pub fn from_bits(bits: u32) -> Self {
        Self {
            bold: bits & FLAG_BOLD != 0,
            italic: bits & FLAG_ITALIC != 0,
        }
    }

    /// Derive flags from a PostScript font name (e.g. "Helvetica-Bold").
    pub fn from_font_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        Self {
            bold: lower.contains("bold") || lower.contains("black") || lower.contains("heavy"),
            italic: lower.contains("italic") || lower.contains("oblique"),
        }
    }
}

/// A contiguous run of text sharing one font size and style.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content.
    pub text: String,
    /// Font size in points.
    pub font_size: f32,
    /// Bold/italic style flags.
    pub flags: StyleFlags,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(text: impl Into<String>, font_size: f32, flags: StyleFlags) -> Self {
        Self {
            text: text.into(),
            font_size,
            flags,
        }
    }

    /// Create a plain body-text span with the default font size.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, crate::classify::DEFAULT_FONT_SIZE, StyleFlags::default())
    }
}

/// A visual line of spans as grouped by the layout extractor.
///
/// Span order within a line is the extractor's delivery order; the
/// conversion core never re-sorts it.
#[derive(Debug, Clone, Default)]
pub struct TextLine {
    /// The spans in this line.
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    /// Create a line from spans.
    pub fn new(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }
}

/// All extracted lines of one page, numbered 1..N.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// 1-based page number.
    pub number: u32,
    /// Lines in reading order.
    pub lines: Vec<TextLine>,
}

/// Collaborator that turns a PDF file into per-page span lists.
///
/// Implementations must be deterministic for a given input. The line
/// grouping rules are the extractor's own; the core consumes them as-is.
pub trait LayoutExtractor: Send + Sync {
    /// Extract every page of the document at `path`.
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageLayout>>;
}

/// Layout extractor backed by `lopdf` content-stream parsing.
#[derive(Debug, Clone, Default)]
pub struct LopdfExtractor {
    _private: (),
}

impl LopdfExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl LayoutExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageLayout>> {
        let doc = LopdfDocument::load(path)?;
        let pages = doc.get_pages();

        let mut layouts = Vec::with_capacity(pages.len());
        for (&page_num, &page_id) in &pages {
            let spans = extract_page_spans(&doc, page_id)?;
            let lines = group_spans_into_lines(spans);
            log::debug!("page {}: {} lines", page_num, lines.len());
            layouts.push(PageLayout {
                number: page_num,
                lines,
            });
        }

        Ok(layouts)
    }
}

/// A positioned span, before line grouping.
struct PositionedSpan {
    span: TextSpan,
    x: f32,
    y: f32,
}

/// Extract positioned spans from one page's content stream.
fn extract_page_spans(doc: &LopdfDocument, page_id: lopdf::ObjectId) -> Result<Vec<PositionedSpan>> {
    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    // Resource name -> base font name, for style detection.
    let mut base_names: HashMap<Vec<u8>, String> = HashMap::new();
    for (name, font) in &fonts {
        let base = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        base_names.insert(name.clone(), base);
    }

    let content_data = doc
        .get_page_content(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;
    let content = lopdf::content::Content::decode(&content_data)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    let mut spans = Vec::new();
    let mut current_font_name: Vec<u8> = Vec::new();
    let mut current_flags = StyleFlags::default();
    let mut current_size: f32 = crate::classify::DEFAULT_FONT_SIZE;
    let mut matrix = TextMatrix::default();
    let mut in_text = false;

    for op in content.operations {
        match op.operator.as_str() {
            "BT" => {
                in_text = true;
                matrix = TextMatrix::default();
            }
            "ET" => in_text = false,
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Object::Name(name) = &op.operands[0] {
                        current_font_name = name.clone();
                        let base = base_names
                            .get(name.as_slice())
                            .map(String::as_str)
                            .unwrap_or("");
                        current_flags = StyleFlags::from_font_name(base);
                    }
                    current_size =
                        as_number(&op.operands[1]).unwrap_or(crate::classify::DEFAULT_FONT_SIZE);
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = as_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = as_number(&op.operands[1]).unwrap_or(0.0);
                    matrix.translate(tx, ty);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    let v: Vec<f32> = op.operands[..6]
                        .iter()
                        .map(|o| as_number(o).unwrap_or(0.0))
                        .collect();
                    matrix.set(v[0], v[1], v[2], v[3], v[4], v[5]);
                }
            }
            "T*" => matrix.next_line(),
            "Tj" | "TJ" => {
                if in_text {
                    let text = decode_show_text(doc, &fonts, &current_font_name, &op);
                    push_span(&mut spans, text, &matrix, current_size, current_flags);
                }
            }
            "'" | "\"" => {
                matrix.next_line();
                if in_text {
                    let idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = op.operands.get(idx) {
                        let text = decode_bytes(doc, &fonts, &current_font_name, bytes);
                        push_span(&mut spans, text, &matrix, current_size, current_flags);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

fn push_span(
    spans: &mut Vec<PositionedSpan>,
    text: String,
    matrix: &TextMatrix,
    size: f32,
    flags: StyleFlags,
) {
    if text.trim().is_empty() {
        return;
    }
    let (x, y) = matrix.position();
    spans.push(PositionedSpan {
        span: TextSpan::new(text, size * matrix.scale(), flags),
        x,
        y,
    });
}

/// Decode the string operand(s) of a Tj/TJ operator.
fn decode_show_text(
    doc: &LopdfDocument,
    fonts: &std::collections::BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    font_name: &[u8],
    op: &lopdf::content::Operation,
) -> String {
    if op.operator == "TJ" {
        // TJ interleaves strings with kerning adjustments in 1/1000 text
        // space units; large negative adjustments stand in for word spaces.
        let mut combined = String::new();
        if let Some(Object::Array(arr)) = op.operands.first() {
            for item in arr {
                match item {
                    Object::String(bytes, _) => {
                        combined.push_str(&decode_bytes(doc, fonts, font_name, bytes));
                    }
                    Object::Integer(n) => {
                        maybe_push_space(&mut combined, -(*n as f32));
                    }
                    Object::Real(n) => {
                        maybe_push_space(&mut combined, -n);
                    }
                    _ => {}
                }
            }
        }
        combined
    } else if let Some(Object::String(bytes, _)) = op.operands.first() {
        decode_bytes(doc, fonts, font_name, bytes)
    } else {
        String::new()
    }
}

fn maybe_push_space(combined: &mut String, adjustment: f32) {
    const SPACE_THRESHOLD: f32 = 200.0;
    if adjustment > SPACE_THRESHOLD && !combined.is_empty() && !combined.ends_with(' ') {
        combined.push(' ');
    }
}

/// Decode raw string bytes with the current font's encoding, falling back
/// to UTF-16BE/UTF-8/Latin-1 detection when the font has none.
fn decode_bytes(
    doc: &LopdfDocument,
    fonts: &std::collections::BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    font_name: &[u8],
    bytes: &[u8],
) -> String {
    if let Some(font) = fonts.get(font_name) {
        if let Ok(encoding) = font.get_font_encoding(doc) {
            if let Ok(decoded) = LopdfDocument::decode_text(&encoding, bytes) {
                return decoded;
            }
        }
    }
    decode_text_simple(bytes)
}

fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Group positioned spans into baseline lines.
///
/// Spans are sorted top-to-bottom (PDF Y is bottom-up) then left-to-right,
/// and spans within 30% of the font size of the current baseline join the
/// same line.
fn group_spans_into_lines(mut spans: Vec<PositionedSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for positioned in spans {
        let tolerance = positioned.span.font_size * 0.3;
        match current_y {
            Some(y) if (positioned.y - y).abs() <= tolerance => {
                current.push(positioned.span);
            }
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::new(std::mem::take(&mut current)));
                }
                current_y = Some(positioned.y);
                current.push(positioned.span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(TextLine::new(current));
    }

    lines
}

/// Text matrix tracking the current drawing position.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        self.f -= 12.0 * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Helper to read a numeric PDF operand.
fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_flags_from_bits() {
        let flags = StyleFlags::from_bits((1 << 4) | (1 << 1));
        assert!(flags.bold);
        assert!(flags.italic);

        let none = StyleFlags::from_bits(0);
        assert!(!none.bold);
        assert!(!none.italic);
    }

    #[test]
    fn test_style_flags_from_font_name() {
        let flags = StyleFlags::from_font_name("Helvetica-Bold");
        assert!(flags.bold);
        assert!(!flags.italic);

        let flags = StyleFlags::from_font_name("Times-Oblique");
        assert!(!flags.bold);
        assert!(flags.italic);
    }

    #[test]
    fn test_group_spans_same_baseline() {
        let spans = vec![
            PositionedSpan {
                span: TextSpan::plain("world"),
                x: 50.0,
                y: 700.0,
            },
            PositionedSpan {
                span: TextSpan::plain("hello"),
                x: 10.0,
                y: 700.5,
            },
        ];
        let lines = group_spans_into_lines(spans);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans[0].text, "hello");
        assert_eq!(lines[0].spans[1].text, "world");
    }

    #[test]
    fn test_group_spans_separate_baselines() {
        let spans = vec![
            PositionedSpan {
                span: TextSpan::plain("lower"),
                x: 10.0,
                y: 650.0,
            },
            PositionedSpan {
                span: TextSpan::plain("upper"),
                x: 10.0,
                y: 700.0,
            },
        ];
        let lines = group_spans_into_lines(spans);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].text, "upper");
        assert_eq!(lines[1].spans[0].text, "lower");
    }

    #[test]
    fn test_decode_text_simple_utf16() {
        let bytes = [0xFE, 0xFF, 0x00, b'H', 0x00, b'i'];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_tj_kerning_space() {
        let mut s = String::from("hello");
        maybe_push_space(&mut s, 250.0);
        assert_eq!(s, "hello ");
        maybe_push_space(&mut s, 250.0);
        assert_eq!(s, "hello ");
        maybe_push_space(&mut s, 50.0);
        assert_eq!(s, "hello ");
    }
}
