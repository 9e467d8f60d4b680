//! Error types for the docmd library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docmd operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input path does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The file extension is not in the supported set.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The external document-to-markup converter exited non-zero.
    #[error("External converter exited with status {status}: {stderr}")]
    ExternalConverter { status: i32, stderr: String },

    /// The external converter did not finish within the configured timeout.
    #[error("External converter timed out after {0}s")]
    ExternalConverterTimeout(u64),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Error extracting text layout from a page.
    #[error("Layout extraction error: {0}")]
    Extract(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedFormat("txt".to_string());
        assert_eq!(err.to_string(), "Unsupported file format: txt");

        let err = Error::ExternalConverter {
            status: 2,
            stderr: "bad input".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "External converter exited with status 2: bad input"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
