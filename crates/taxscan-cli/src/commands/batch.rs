//! Batch processing command for multiple tax documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use taxscan_core::{ClassifiedError, ExtractionResult, MediaType};

use super::process::{build_extractor, extract_path, format_result, OutputFormat};
use super::{load_config, resolve_model_dir, DocumentArg};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching input files
    #[arg(required = true)]
    input: String,

    /// Document type
    #[arg(short = 't', long = "type", value_enum, default_value = "auto")]
    document: DocumentArg,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of documents processed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Treat inputs as already-recognized text and skip OCR
    #[arg(long)]
    text_input: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<FileError>,
    processing_time_ms: u64,
}

struct FileError {
    /// Classified kind, or "error" for I/O and other failures.
    kind: String,
    message: String,
}

impl FileError {
    fn from_anyhow(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ClassifiedError>() {
            Some(classified) => Self {
                kind: classified.kind.to_string(),
                message: classified.message.clone(),
            },
            None => Self {
                kind: "error".to_string(),
                message: err.to_string(),
            },
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && is_candidate(p, args.text_input))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let model_dir = resolve_model_dir(args.model_dir.as_deref(), &config);
    let extractor = build_extractor(&model_dir, &config);
    let extractor = &extractor;
    let (document, text_input) = (args.document, args.text_input);

    let mut pending = stream::iter(files)
        .map(move |path| async move {
            let file_start = Instant::now();
            let outcome = extract_path(extractor, &path, document, text_input).await;
            (path, outcome, file_start.elapsed().as_millis() as u64)
        })
        .buffer_unordered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some((path, outcome, processing_time_ms)) = pending.next().await {
        overall_pb.inc(1);
        match outcome {
            Ok(result) => results.push(ProcessResult {
                path,
                result: Some(result),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), e);
                    results.push(ProcessResult {
                        path,
                        result: None,
                        error: Some(FileError::from_anyhow(&e)),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", path.display(), e);
                    return Err(e.context(format!("Processing failed: {}", path.display())));
                }
            }
        }
    }
    overall_pb.finish_and_clear();
    results.sort_by(|a, b| a.path.cmp(&b.path));

    let successful: Vec<_> = results.iter().filter(|r| r.result.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for entry in &successful {
            if let Some(result) = &entry.result {
                let output_name = entry
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("document");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_result(result, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for entry in &failed {
            if let Some(error) = &entry.error {
                println!(
                    "  - {}: [{}] {}",
                    entry.path.display(),
                    error.kind,
                    error.message
                );
            }
        }
    }

    Ok(())
}

/// Whether a globbed path is worth handing to the extractor.
///
/// PDFs are kept so they are reported as unsupported rather than skipped.
fn is_candidate(path: &Path, text_input: bool) -> bool {
    let media_type = MediaType::parse(MediaType::for_path(path));
    if text_input {
        media_type == MediaType::Other("text/plain".to_string())
    } else {
        media_type.is_raster_image() || media_type == MediaType::Pdf
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "document_type",
        "fields",
        "confidence",
        "warnings",
        "processing_time_ms",
        "error_kind",
        "error",
    ])?;

    for entry in results {
        let filename = entry
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(result) = &entry.result {
            wtr.write_record([
                filename,
                "success",
                &result.document_type,
                &result.record.len().to_string(),
                &format!("{:.1}", result.confidence),
                &result.warnings.len().to_string(),
                &entry.processing_time_ms.to_string(),
                "",
                "",
            ])?;
        } else if let Some(error) = &entry.error {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                &entry.processing_time_ms.to_string(),
                &error.kind,
                &error.message,
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates() {
        assert!(is_candidate(Path::new("scans/w2.png"), false));
        assert!(is_candidate(Path::new("scans/w2.JPG"), false));
        assert!(is_candidate(Path::new("scans/w2.pdf"), false));
        assert!(!is_candidate(Path::new("scans/notes.txt"), false));

        assert!(is_candidate(Path::new("texts/w2.txt"), true));
        assert!(!is_candidate(Path::new("texts/w2.png"), true));
    }

    #[test]
    fn test_summary_records_error_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        let results = vec![ProcessResult {
            path: PathBuf::from("scans/receipt.png"),
            result: None,
            error: Some(FileError::from_anyhow(&anyhow::Error::new(
                ClassifiedError::fields_not_found("W-2", &["wages"]),
            ))),
            processing_time_ms: 5,
        }];

        write_summary(&path, &results).unwrap();
        let summary = fs::read_to_string(&path).unwrap();
        assert!(summary.contains("receipt.png,error"));
        assert!(summary.contains("fields_not_found,could not find W-2 fields: wages"));
    }
}
