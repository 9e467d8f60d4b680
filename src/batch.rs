//! Batch conversion over a directory tree.
//!
//! Walks the input directory recursively in sorted order and converts
//! every regular file, mirroring the directory structure under the output
//! root. One bad file never aborts the run; its error is captured as a
//! failure record and the walk continues.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;

use crate::convert::{ConversionReport, Converter};
use crate::error::{Error, Result};

/// Options for a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Convert files in parallel with a rayon pool.
    pub parallel: bool,
}

impl BatchOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel conversion.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Convert every regular file under `input_dir`, writing Markdown under
/// `output_dir` with the same relative layout.
///
/// Returns one [`ConversionReport`] per file, in the deterministic sorted
/// walk order. Unsupported or failing files produce failure records.
pub fn convert_dir(
    converter: &Converter,
    input_dir: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> Result<Vec<ConversionReport>> {
    if !input_dir.is_dir() {
        return Err(Error::InputNotFound(input_dir.to_path_buf()));
    }

    let mut files = Vec::new();
    collect_files(input_dir, &mut files)?;
    debug!("batch: {} files under {}", files.len(), input_dir.display());

    let convert_one = |input: &PathBuf| -> ConversionReport {
        let relative = input.strip_prefix(input_dir).unwrap_or(input);
        let output = output_dir.join(relative).with_extension("md");
        match converter.convert(input, Some(&output)) {
            Ok(report) => report,
            Err(err) => {
                warn!("batch: {} failed: {}", input.display(), err);
                ConversionReport::failure(input, err.to_string())
            }
        }
    };

    let reports = if options.parallel {
        files.par_iter().map(convert_one).collect()
    } else {
        files.iter().map(convert_one).collect()
    };
    Ok(reports)
}

/// Recursive sorted walk collecting regular files.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_dir() {
        let converter = Converter::new();
        let err = convert_dir(
            &converter,
            Path::new("/nonexistent/docmd-batch"),
            Path::new("/tmp/out"),
            &BatchOptions::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
    }

    #[test]
    fn test_collect_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.pdf"), b"").unwrap();
        fs::write(dir.path().join("a.docx"), b"").unwrap();
        fs::write(dir.path().join("sub").join("c.txt"), b"").unwrap();

        let mut files = Vec::new();
        collect_files(dir.path(), &mut files).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.docx"),
                PathBuf::from("b.pdf"),
                PathBuf::from("sub/c.txt"),
            ]
        );
    }
}
