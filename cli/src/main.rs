//! docmd CLI - convert documents to Markdown

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docmd::{BatchOptions, ConversionReport, ConvertOptions, Converter};

#[derive(Parser)]
#[command(name = "docmd")]
#[command(version)]
#[command(about = "Convert PDF and office documents to Markdown", long_about = None)]
struct Cli {
    /// Input file, or input directory with --batch
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file, or output directory with --batch
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Convert every file under the input directory
    #[arg(long)]
    batch: bool,

    /// Convert batch files in parallel
    #[arg(long, requires = "batch")]
    parallel: bool,

    /// Extract embedded media alongside the Markdown
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    preserve_images: bool,

    /// Directory for extracted media
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,

    /// Column-width hint for converted tables
    #[arg(long, value_name = "N")]
    columns: Option<u32>,

    /// External converter program
    #[arg(long, env = "DOCMD_PANDOC", default_value = "pandoc")]
    pandoc: String,

    /// External converter timeout in seconds
    #[arg(long, value_name = "SECS", default_value = "120")]
    timeout: u64,

    /// Print result records as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let mut options = ConvertOptions::new()
        .with_preserve_images(cli.preserve_images)
        .with_pandoc_program(&cli.pandoc)
        .with_timeout(Duration::from_secs(cli.timeout));
    if let Some(dir) = &cli.image_dir {
        options = options.with_image_dir(dir);
    }
    if let Some(columns) = cli.columns {
        options = options.with_columns(columns);
    }
    let converter = Converter::with_options(options);

    let exit_code = if cli.batch {
        run_batch(&converter, &cli)
    } else {
        run_single(&converter, &cli)
    };
    std::process::exit(exit_code);
}

fn run_single(converter: &Converter, cli: &Cli) -> i32 {
    match converter.convert(&cli.input, cli.output.as_deref()) {
        Ok(report) => {
            print_report(&report, cli.json);
            0
        }
        Err(e) => {
            if cli.json {
                let report = ConversionReport::failure(&cli.input, e.to_string());
                println!("{}", serde_json::to_string_pretty(&report).unwrap());
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
            }
            1
        }
    }
}

fn run_batch(converter: &Converter, cli: &Cli) -> i32 {
    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| default_batch_output(&cli.input));

    let batch_options = BatchOptions::new().with_parallel(cli.parallel);

    // The library converts the whole tree in one call, so a spinner is
    // the honest progress indicator here.
    let spinner = if cli.json {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(format!("Converting {}", cli.input.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let result = docmd::convert_dir(converter, &cli.input, &output_dir, &batch_options);
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    let reports = match result {
        Ok(reports) => reports,
        Err(e) => {
            if cli.json {
                let report = ConversionReport::failure(&cli.input, e.to_string());
                println!("{}", serde_json::to_string_pretty(&report).unwrap());
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
            }
            return 1;
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports).unwrap());
    } else {
        for report in &reports {
            println!("{}", report_line(report));
        }

        let succeeded = reports.iter().filter(|r| r.success).count();
        let failed = reports.len() - succeeded;
        println!(
            "\n{} {} converted, {} failed",
            "Done!".green().bold(),
            succeeded,
            failed
        );
    }

    // Per-file failures are part of the batch result, not a top-level
    // failure.
    0
}

fn print_report(report: &ConversionReport, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(report).unwrap());
    } else {
        println!("{}", report_line(report));
    }
}

/// One human-readable result line for a conversion record.
fn report_line(report: &ConversionReport) -> String {
    if report.success {
        let output = report
            .output_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        format!(
            "{} {} -> {} ({} words, {:.2}s)",
            "\u{2713}".green().bold(),
            report.input_path.display(),
            output,
            report.word_count,
            report.duration
        )
    } else {
        format!(
            "{} {}: {}",
            "\u{2717}".red().bold(),
            report.input_path.display(),
            report.error.as_deref().unwrap_or("unknown error")
        )
    }
}

fn default_batch_output(input: &Path) -> PathBuf {
    let stem = input.file_name().unwrap_or_default().to_string_lossy();
    PathBuf::from(format!("{}_markdown", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_line_success() {
        let mut report = ConversionReport::failure("doc.pdf", "");
        report.success = true;
        report.error = None;
        report.output_path = Some(PathBuf::from("doc.md"));
        report.word_count = 12;

        let line = report_line(&report);
        assert!(line.contains("doc.pdf -> doc.md"));
        assert!(line.contains("12 words"));
    }

    #[test]
    fn test_report_line_failure() {
        let report = ConversionReport::failure("bad.txt", "Unsupported file format: txt");
        let line = report_line(&report);
        assert!(line.contains("bad.txt"));
        assert!(line.contains("Unsupported file format: txt"));
    }

    #[test]
    fn test_batch_error_json_record() {
        // Batch-level failures in --json mode print a failure record,
        // the same shape run_single emits.
        let report = ConversionReport::failure("missing_dir", "Input file not found: missing_dir");
        let json = serde_json::to_string_pretty(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Input file not found: missing_dir");
    }

    #[test]
    fn test_default_batch_output() {
        assert_eq!(
            default_batch_output(Path::new("docs")),
            PathBuf::from("docs_markdown")
        );
    }
}
