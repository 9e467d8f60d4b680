//! External-converter path for office documents.
//!
//! Office formats are not parsed here; a pandoc process converts them
//! straight to Markdown and this module owns the process boundary: command
//! construction, a bounded wait, and the non-zero-exit failure contract.

use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

use super::ConvertOptions;

/// Office formats handled by the external converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficeFormat {
    Docx,
    Doc,
    Pptx,
    Ppt,
    Xlsx,
    Xls,
    Odt,
    Odp,
    Ods,
}

impl OfficeFormat {
    /// Map a lowercase file extension to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::Ppt),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "odt" => Some(Self::Odt),
            "odp" => Some(Self::Odp),
            "ods" => Some(Self::Ods),
            _ => None,
        }
    }

    /// The pandoc source format identifier.
    pub fn pandoc_format(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Doc => "doc",
            Self::Pptx => "pptx",
            Self::Ppt => "ppt",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Odt => "odt",
            Self::Odp => "odp",
            Self::Ods => "ods",
        }
    }

    /// The extension this format is registered under.
    pub fn extension(&self) -> &'static str {
        self.pandoc_format()
    }
}

/// Build the pandoc argument list for one conversion.
pub(crate) fn converter_args(
    format: OfficeFormat,
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-f".into(),
        format.pandoc_format().into(),
        "-t".into(),
        "markdown".into(),
        "--wrap=none".into(),
    ];

    if options.preserve_images {
        let media_dir = options
            .image_dir
            .clone()
            .or_else(|| output.parent().map(|p| p.to_path_buf()))
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| ".".into());
        args.push("--extract-media".into());
        args.push(media_dir.into_os_string());
    }

    if let Some(columns) = options.columns {
        args.push("--columns".into());
        args.push(columns.to_string().into());
    }

    args.push(input.as_os_str().to_owned());
    args.push("-o".into());
    args.push(output.as_os_str().to_owned());
    args
}

/// Run the external converter, bounded by the configured timeout.
///
/// On success the converter has written Markdown to `output`. A non-zero
/// exit surfaces as [`Error::ExternalConverter`] carrying the captured
/// stderr text; exceeding the timeout kills the process.
pub(crate) fn run_converter(
    format: OfficeFormat,
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<()> {
    let args = converter_args(format, input, output, options);
    log::debug!(
        "running {} {:?} for {}",
        options.pandoc_program,
        args,
        input.display()
    );

    let mut child = Command::new(&options.pandoc_program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    let deadline = Instant::now() + options.timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::ExternalConverterTimeout(options.timeout.as_secs()));
        }
        std::thread::sleep(Duration::from_millis(25));
    };

    let mut stderr = String::new();
    if let Some(mut pipe) = child.stderr.take() {
        pipe.read_to_string(&mut stderr)?;
    }

    if !status.success() {
        return Err(Error::ExternalConverter {
            status: status.code().unwrap_or(-1),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OfficeFormat::from_extension("docx"), Some(OfficeFormat::Docx));
        assert_eq!(OfficeFormat::from_extension("ods"), Some(OfficeFormat::Ods));
        assert_eq!(OfficeFormat::from_extension("pdf"), None);
        assert_eq!(OfficeFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_converter_args_basic() {
        let options = ConvertOptions::new().with_preserve_images(false);
        let args = converter_args(
            OfficeFormat::Docx,
            Path::new("report.docx"),
            Path::new("report.md"),
            &options,
        );
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-f",
                "docx",
                "-t",
                "markdown",
                "--wrap=none",
                "report.docx",
                "-o",
                "report.md"
            ]
        );
    }

    #[test]
    fn test_converter_args_media_and_columns() {
        let options = ConvertOptions::new()
            .with_image_dir("media")
            .with_columns(100);
        let args = converter_args(
            OfficeFormat::Odt,
            Path::new("doc.odt"),
            Path::new("out/doc.md"),
            &options,
        );
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(args.contains(&"--extract-media".to_string()));
        assert!(args.contains(&"media".to_string()));
        assert!(args.contains(&"--columns".to_string()));
        assert!(args.contains(&"100".to_string()));
    }

    #[test]
    fn test_converter_args_media_defaults_to_output_dir() {
        let options = ConvertOptions::new();
        let args = converter_args(
            OfficeFormat::Docx,
            Path::new("in/doc.docx"),
            Path::new("out/doc.md"),
            &options,
        );
        let idx = args
            .iter()
            .position(|a| a == "--extract-media")
            .expect("media flag present");
        assert_eq!(PathBuf::from(&args[idx + 1]), PathBuf::from("out"));
    }

    #[test]
    fn test_missing_converter_program() {
        let options = ConvertOptions::new()
            .with_pandoc_program("/nonexistent/docmd-test-pandoc");
        let result = run_converter(
            OfficeFormat::Docx,
            Path::new("doc.docx"),
            Path::new("doc.md"),
            &options,
        );
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
