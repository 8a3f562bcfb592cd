//! Process command - extract fields from a single tax document.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use taxscan_core::fields::format_currency_amount;
use taxscan_core::{
    AcquiredText, DocumentExtractor, DocumentFile, DocumentType, ExtractionResult, FieldValue,
    PureOcrBackend, TaxscanConfig,
};

use super::{load_config, resolve_model_dir, DocumentArg};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (image, or UTF-8 text with --text-input)
    #[arg(required = true)]
    input: PathBuf,

    /// Document type
    #[arg(short = 't', long = "type", value_enum, default_value = "auto")]
    document: DocumentArg,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Treat the input as already-recognized text and skip OCR
    #[arg(long)]
    text_input: bool,

    /// Show OCR confidence and processing time
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(if args.text_input {
        "Extracting fields..."
    } else {
        "Running OCR..."
    });

    let model_dir = resolve_model_dir(args.model_dir.as_deref(), &config);
    let extractor = build_extractor(&model_dir, &config);
    let outcome = extract_path(&extractor, &args.input, args.document, args.text_input).await;
    pb.finish_and_clear();
    let result = outcome?;

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} OCR confidence: {:.1}%",
            style("ℹ").blue(),
            result.confidence
        );
        println!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            result.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Build an extractor over the model files in `model_dir`.
pub fn build_extractor(
    model_dir: &Path,
    config: &TaxscanConfig,
) -> DocumentExtractor<PureOcrBackend> {
    debug!("Using models from {}", model_dir.display());
    let backend = PureOcrBackend::from_dir(model_dir, &config.models, config.ocr.clone());
    DocumentExtractor::new(backend).with_config(config.extraction.clone())
}

/// Extract one file, either through OCR or from its text content.
pub async fn extract_path(
    extractor: &DocumentExtractor<PureOcrBackend>,
    path: &Path,
    document: DocumentArg,
    text_input: bool,
) -> anyhow::Result<ExtractionResult> {
    if text_input {
        let acquired = AcquiredText::new(fs::read_to_string(path)?, 100.0);
        let result = match document.document_type() {
            Some(document_type) => extractor.extract_from_text(document_type.spec(), acquired)?,
            None => extractor.extract_auto_from_text(acquired)?,
        };
        return Ok(result);
    }

    let file = DocumentFile::from_path(path)?;
    let result = match document.document_type() {
        Some(document_type) => extractor.extract_document(document_type, &file).await?,
        None => extractor.extract_auto(&file).await?,
    };
    Ok(result)
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

/// Field columns: the document type's declared fields, else the record's keys.
fn field_columns(result: &ExtractionResult) -> Vec<String> {
    match DocumentType::from_str(&result.document_type) {
        Ok(document_type) => document_type
            .spec()
            .field_names()
            .map(str::to_string)
            .collect(),
        Err(_) => result.record.iter().map(|(k, _)| k.to_string()).collect(),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let columns = field_columns(result);

    let mut header = vec!["document_type".to_string()];
    header.extend(columns.iter().cloned());
    header.push("confidence".to_string());
    wtr.write_record(&header)?;

    let mut row = vec![result.document_type.clone()];
    row.extend(columns.iter().map(|name| {
        result
            .record
            .get(name)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }));
    row.push(format!("{:.1}", result.confidence));
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Form {}\n", result.document_type));
    output.push('\n');

    for name in field_columns(result) {
        let value = match result.record.get(&name) {
            Some(FieldValue::Amount(amount)) => format!("${}", format_currency_amount(*amount)),
            Some(FieldValue::Text(text)) => text.clone(),
            None => "-".to_string(),
        };
        output.push_str(&format!("  {:<28} {}\n", name, value));
    }

    if !result.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &result.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxscan_core::{ExtractedRecord, FieldValue};

    fn sample() -> ExtractionResult {
        let mut record = ExtractedRecord::new();
        record.insert("payer", FieldValue::Text("FIRST NATIONAL BANK".to_string()));
        record.insert(
            "amount",
            FieldValue::Amount(taxscan_core::fields::parse_currency_amount("1,245.18").unwrap()),
        );
        ExtractionResult {
            document_type: "1099-INT".to_string(),
            record,
            confidence: 93.25,
            warnings: vec!["optional field not found: payerTin".to_string()],
            processing_time_ms: 12,
            raw_text: None,
        }
    }

    #[test]
    fn test_format_csv() {
        let csv = format_csv(&sample()).unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("document_type,payer,amount,payerTin"));
        assert!(header.ends_with(",confidence"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("1099-INT,FIRST NATIONAL BANK,1245.18,,"));
        assert!(row.ends_with(",93.2") || row.ends_with(",93.3"));
    }

    #[test]
    fn test_format_text() {
        let text = format_text(&sample());
        assert!(text.starts_with("Form 1099-INT\n"));
        assert!(text.contains("$1,245.18"));
        assert!(text.contains("FIRST NATIONAL BANK"));
        assert!(text.contains("- optional field not found: payerTin"));
    }
}
