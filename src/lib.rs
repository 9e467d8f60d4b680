//! # docmd
//!
//! Document-to-Markdown conversion library for Rust.
//!
//! This library converts PDF and office documents to normalized Markdown.
//! PDFs go through a built-in layout path that classifies text spans into
//! headings and styled body text by font size and style flags. Office
//! formats (docx, pptx, xlsx and friends) go through an external pandoc
//! process. Both paths finish with the same normalization pass, so output
//! formatting is uniform regardless of the source format.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! fn main() -> docmd::Result<()> {
//!     // Convert a single document
//!     let report = docmd::convert_file(Path::new("report.pdf"))?;
//!     println!("{} words in {:?}", report.word_count, report.output_path);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Two conversion paths**: built-in PDF layout inference, pandoc bridge
//!   for office formats
//! - **Font-size heading inference**: configurable threshold table
//! - **Idempotent normalization**: spacing, heading and table cleanup that
//!   is stable under re-application
//! - **Batch conversion**: recursive directory walks, optionally parallel
//!   via Rayon
//! - **Uniform result records**: per-file JSON-serializable reports

pub mod assemble;
pub mod batch;
pub mod classify;
pub mod convert;
pub mod error;
pub mod layout;
pub mod normalize;

// Re-export commonly used types
pub use batch::{convert_dir, BatchOptions};
pub use classify::{ClassifierConfig, Fragment, HeadingRule};
pub use convert::{
    ConversionKind, ConversionReport, ConversionType, ConvertOptions, Converter, OfficeFormat,
};
pub use error::{Error, Result};
pub use layout::{LayoutExtractor, LopdfExtractor, PageLayout, StyleFlags, TextLine, TextSpan};
pub use normalize::MarkdownNormalizer;

use std::path::Path;

/// Convert one document with default options.
///
/// The output path is the input path with an `md` extension.
pub fn convert_file(input: &Path) -> Result<ConversionReport> {
    Converter::new().convert(input, None)
}

/// Convert one document with the given options.
pub fn convert_file_with_options(
    input: &Path,
    output: Option<&Path>,
    options: ConvertOptions,
) -> Result<ConversionReport> {
    Converter::with_options(options).convert(input, output)
}

/// Convert every file under a directory with default options.
pub fn batch_convert(
    input_dir: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> Result<Vec<ConversionReport>> {
    convert_dir(&Converter::new(), input_dir, output_dir, options)
}
