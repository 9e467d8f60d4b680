//! Conversion orchestration: format dispatch, the two extraction paths,
//! and the per-file result record.
//!
//! Dispatch is a closed enum over the two paths (the PDF layout path and
//! the external-converter path), selected by file extension. Both paths
//! finish with the Markdown normalization pass and produce a uniform
//! [`ConversionReport`].

mod office;
mod pdf;

pub use office::OfficeFormat;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::classify::ClassifierConfig;
use crate::error::{Error, Result};
use crate::layout::{LayoutExtractor, LopdfExtractor};
use crate::normalize::MarkdownNormalizer;

/// Default bound on the external converter's run time.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Which conversion path a file dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// PDF layout path.
    Pdf,
    /// External-converter path for an office format.
    Office(OfficeFormat),
}

impl ConversionKind {
    /// Resolve the conversion path from a file extension,
    /// case-insensitively. Unsupported extensions are an error, never a
    /// silent no-op.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if ext == "pdf" {
            return Ok(Self::Pdf);
        }
        if let Some(format) = OfficeFormat::from_extension(&ext) {
            return Ok(Self::Office(format));
        }
        Err(Error::UnsupportedFormat(if ext.is_empty() {
            path.display().to_string()
        } else {
            ext
        }))
    }
}

/// Conversion path recorded in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionType {
    /// Converted via the PDF layout path.
    #[serde(rename = "pdf_to_markdown")]
    Pdf,
    /// Converted via the external converter.
    #[serde(rename = "office_to_markdown")]
    Office,
}

/// Options for a conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Pass extracted media through the external converter (default true).
    pub preserve_images: bool,

    /// Directory for extracted media; defaults to the output directory.
    pub image_dir: Option<PathBuf>,

    /// Optional column-width hint for the external converter's tables.
    pub columns: Option<u32>,

    /// External converter program (default "pandoc").
    pub pandoc_program: String,

    /// Bound on the external converter's run time.
    pub timeout: Duration,

    /// Heading threshold table for the span classifier.
    pub classifier: ClassifierConfig,
}

impl ConvertOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable media extraction.
    pub fn with_preserve_images(mut self, preserve: bool) -> Self {
        self.preserve_images = preserve;
        self
    }

    /// Set the media extraction directory.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    /// Set the column-width hint.
    pub fn with_columns(mut self, columns: u32) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Set the external converter program.
    pub fn with_pandoc_program(mut self, program: impl Into<String>) -> Self {
        self.pandoc_program = program.into();
        self
    }

    /// Set the external converter timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the classifier's heading threshold table.
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            preserve_images: true,
            image_dir: None,
            columns: None,
            pandoc_program: "pandoc".to_string(),
            timeout: DEFAULT_TIMEOUT,
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Result record for one file conversion attempt.
///
/// Immutable once built; field names match the JSON contract consumers of
/// the `--json` output expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Whether the conversion succeeded.
    pub success: bool,

    /// The source document.
    pub input_path: PathBuf,

    /// The written Markdown file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Which path converted the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_type: Option<ConversionType>,

    /// Pages processed (PDF path only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_processed: Option<usize>,

    /// Wall-clock seconds from path entry to report construction.
    pub duration: f64,

    /// Size in bytes of the written file.
    pub file_size: u64,

    /// Whitespace-delimited token count of the normalized content.
    pub word_count: usize,

    /// Character count of the normalized content.
    pub char_count: usize,

    /// Generator details (`generator`, `source_pages` / `source_format`).
    pub metadata: BTreeMap<String, String>,

    /// Error message for failed conversions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionReport {
    /// Build a failure record, as collected by the batch driver.
    pub fn failure(input_path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            input_path: input_path.into(),
            output_path: None,
            conversion_type: None,
            pages_processed: None,
            duration: 0.0,
            file_size: 0,
            word_count: 0,
            char_count: 0,
            metadata: BTreeMap::new(),
            error: Some(error.into()),
        }
    }
}

/// Document-to-Markdown converter.
///
/// Holds the options, the layout extractor collaborator, and the
/// normalizer. Conversions are independent and stateless with respect to
/// each other, so one `Converter` can serve many files.
pub struct Converter {
    options: ConvertOptions,
    extractor: Box<dyn LayoutExtractor>,
    normalizer: MarkdownNormalizer,
}

impl Converter {
    /// Create a converter with default options and the lopdf extractor.
    pub fn new() -> Self {
        Self::with_options(ConvertOptions::default())
    }

    /// Create a converter with the given options.
    pub fn with_options(options: ConvertOptions) -> Self {
        Self {
            options,
            extractor: Box::new(LopdfExtractor::new()),
            normalizer: MarkdownNormalizer::new(),
        }
    }

    /// Replace the layout extractor collaborator.
    pub fn with_extractor(mut self, extractor: Box<dyn LayoutExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// The converter's options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert one document to Markdown.
    ///
    /// The output path defaults to the input path with an `md` extension.
    /// The input must exist and carry a supported extension; both are
    /// checked before any output file is created.
    pub fn convert(&self, input: &Path, output: Option<&Path>) -> Result<ConversionReport> {
        let started = Instant::now();

        if !input.exists() {
            return Err(Error::InputNotFound(input.to_path_buf()));
        }
        let kind = ConversionKind::from_path(input)?;

        let output = output
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| input.with_extension("md"));
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut metadata = BTreeMap::new();
        let (markdown, conversion_type, pages_processed) = match kind {
            ConversionKind::Pdf => {
                let outcome = pdf::convert_pdf(
                    self.extractor.as_ref(),
                    &self.options.classifier,
                    &self.normalizer,
                    input,
                )?;
                fs::write(&output, &outcome.markdown)?;
                metadata.insert("generator".to_string(), "layout".to_string());
                metadata.insert("source_pages".to_string(), outcome.pages.to_string());
                (outcome.markdown, ConversionType::Pdf, Some(outcome.pages))
            }
            ConversionKind::Office(format) => {
                office::run_converter(format, input, &output, &self.options)?;
                let raw = fs::read_to_string(&output)?;
                let markdown = self.normalizer.normalize(&raw);
                // Not transactional: the raw converter output stays on
                // disk if this overwrite fails.
                fs::write(&output, &markdown)?;
                metadata.insert("generator".to_string(), "pandoc".to_string());
                metadata.insert(
                    "source_format".to_string(),
                    format.extension().to_string(),
                );
                (markdown, ConversionType::Office, None)
            }
        };

        let file_size = fs::metadata(&output)?.len();
        Ok(ConversionReport {
            success: true,
            input_path: input.to_path_buf(),
            output_path: Some(output),
            conversion_type: Some(conversion_type),
            pages_processed,
            duration: started.elapsed().as_secs_f64(),
            file_size,
            word_count: markdown.split_whitespace().count(),
            char_count: markdown.chars().count(),
            metadata,
            error: None,
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}
