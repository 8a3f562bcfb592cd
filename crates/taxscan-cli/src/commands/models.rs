//! Models command - download and manage OCR models.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use futures_util::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use taxscan_core::models::config::ModelConfig;

use super::{load_config, resolve_model_dir};

/// Where the PaddleOCR mobile models are published.
const DEFAULT_BASE_URL: &str = "https://github.com/jakubmatias/incr/raw/main/models/mobile";

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// List the model files OCR needs
    List,

    /// Download models
    Download(DownloadArgs),

    /// Check model status
    Status(DirArgs),

    /// Remove downloaded models
    Clean(DirArgs),
}

#[derive(Args)]
struct DownloadArgs {
    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force re-download even if files exist
    #[arg(long)]
    force: bool,

    /// Base URL the model files are fetched from
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

#[derive(Args)]
struct DirArgs {
    /// Model directory
    #[arg(short, long)]
    dir: Option<PathBuf>,
}

/// A model file and its expected size.
struct ModelInfo {
    filename: String,
    size_bytes: u64,
    description: &'static str,
}

/// Model files named by the configuration.
fn model_files(models: &ModelConfig) -> [ModelInfo; 3] {
    [
        ModelInfo {
            filename: models.detection_model.clone(),
            size_bytes: 4_500_000,
            description: "PP-OCRv3 mobile text detection",
        },
        ModelInfo {
            filename: models.recognition_model.clone(),
            size_bytes: 7_500_000,
            description: "Latin text recognition",
        },
        ModelInfo {
            filename: models.dictionary.clone(),
            size_bytes: 2_000,
            description: "Latin character dictionary",
        },
    ]
}

/// Download location for model files.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taxscan")
        .join("models")
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    match args.command {
        ModelsCommand::List => list_models(&config.models),
        ModelsCommand::Download(download_args) => {
            download_models(download_args, &config.models).await
        }
        ModelsCommand::Status(dir_args) => {
            let dir = resolve_model_dir(dir_args.dir.as_deref(), &config);
            check_status(&dir, &config.models)
        }
        ModelsCommand::Clean(dir_args) => {
            let dir = resolve_model_dir(dir_args.dir.as_deref(), &config);
            clean_models(&dir, &config.models)
        }
    }
}

fn list_models(models: &ModelConfig) -> anyhow::Result<()> {
    let files = model_files(models);
    let total_size: u64 = files.iter().map(|m| m.size_bytes).sum();

    println!("{}", style("OCR Models").bold());
    println!();
    println!(
        "{} {}",
        style("▸ mobile").bold().cyan(),
        format_size(total_size)
    );

    for model in &files {
        println!(
            "    {:<20} {:>10}  {}",
            model.filename,
            format_size(model.size_bytes),
            model.description
        );
    }

    println!();
    println!("Default location: {}", default_model_dir().display());
    println!();
    println!("Commands:");
    println!("  taxscan models download    Download models");
    println!("  taxscan models status      Check downloaded models");

    Ok(())
}

async fn download_models(args: DownloadArgs, models: &ModelConfig) -> anyhow::Result<()> {
    let output_dir = args.output.unwrap_or_else(default_model_dir);
    fs::create_dir_all(&output_dir)?;

    println!(
        "{} Downloading models to {}",
        style("ℹ").blue(),
        output_dir.display()
    );
    println!();

    let client = reqwest::Client::builder()
        .user_agent(concat!("taxscan-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let multi_progress = MultiProgress::new();
    let mut success_count = 0;
    let mut skip_count = 0;
    let mut error_count = 0;

    for model in model_files(models) {
        let path = output_dir.join(&model.filename);

        if path.exists() && !args.force {
            let metadata = fs::metadata(&path)?;
            // Anything under half the expected size is a broken download
            if metadata.len() > model.size_bytes / 2 {
                println!(
                    "  {} {} (already exists, {})",
                    style("✓").green(),
                    model.filename,
                    format_size(metadata.len())
                );
                skip_count += 1;
                continue;
            }
        }

        let url = format!("{}/{}", args.base_url.trim_end_matches('/'), model.filename);

        let pb = multi_progress.add(ProgressBar::new(model.size_bytes));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} {msg:<30} [{bar:25.cyan/blue}] {bytes}/{total_bytes}")?
                .progress_chars("=>-"),
        );
        pb.set_message(model.filename.clone());

        match download_file(&client, &url, &path, &pb).await {
            Ok(()) => {
                pb.finish_with_message(format!("{} {}", style("✓").green(), model.filename));
                success_count += 1;
            }
            Err(e) => {
                pb.finish_with_message(format!("{} {} - {}", style("✗").red(), model.filename, e));
                error_count += 1;
            }
        }
    }

    println!();

    if error_count == 0 {
        println!("{} Models downloaded successfully!", style("✓").green().bold());
        if skip_count > 0 {
            println!(
                "   {} downloaded, {} already present",
                success_count, skip_count
            );
        }
    } else {
        println!(
            "{} Download completed with errors",
            style("⚠").yellow().bold()
        );
        println!(
            "   {} downloaded, {} skipped, {} failed",
            success_count, skip_count, error_count
        );
        println!();
        println!("Retry with: taxscan models download --force");
    }

    println!();
    check_status(&output_dir, models)?;

    if error_count > 0 {
        anyhow::bail!("{} model files failed to download", error_count);
    }

    Ok(())
}

async fn download_file(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    pb: &ProgressBar,
) -> anyhow::Result<()> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }

    if let Some(content_length) = response.content_length() {
        pb.set_length(content_length);
    }

    // Write to a temp file so an interrupted download never looks complete
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Per-file status of a model directory.
#[derive(Debug, PartialEq, Eq)]
enum FileStatus {
    Ready(u64),
    Incomplete(u64),
    Missing,
}

fn file_status(path: &Path, model: &ModelInfo) -> anyhow::Result<FileStatus> {
    if !path.exists() {
        return Ok(FileStatus::Missing);
    }
    let size = fs::metadata(path)?.len();
    if size > model.size_bytes / 2 {
        Ok(FileStatus::Ready(size))
    } else {
        Ok(FileStatus::Incomplete(size))
    }
}

fn check_status(model_dir: &Path, models: &ModelConfig) -> anyhow::Result<()> {
    println!("{}", style("Model Status").bold());
    println!("{}", model_dir.display());

    let mut all_present = true;
    let mut total_size: u64 = 0;

    for model in model_files(models) {
        let path = model_dir.join(&model.filename);
        let (status, size_str) = match file_status(&path, &model)? {
            FileStatus::Ready(size) => {
                total_size += size;
                (style("✓").green(), format_size(size))
            }
            FileStatus::Incomplete(size) => {
                all_present = false;
                total_size += size;
                (
                    style("⚠").yellow(),
                    format!("{} (incomplete?)", format_size(size)),
                )
            }
            FileStatus::Missing => {
                all_present = false;
                (style("✗").red(), "missing".to_string())
            }
        };

        println!("    {} {:<25} {:>10}", status, model.filename, size_str);
    }

    if all_present {
        println!(
            "    {} Ready ({} total)",
            style("✓").green(),
            format_size(total_size)
        );
    } else {
        println!(
            "    {} Run 'taxscan models download' to download",
            style("⚠").yellow()
        );
    }

    Ok(())
}

fn clean_models(model_dir: &Path, models: &ModelConfig) -> anyhow::Result<()> {
    if !model_dir.exists() {
        println!("{} No model files to remove.", style("ℹ").blue());
        return Ok(());
    }

    let mut total_removed = 0;
    let mut total_freed: u64 = 0;

    for model in model_files(models) {
        let path = model_dir.join(&model.filename);
        if path.exists() {
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            fs::remove_file(&path)?;
            total_removed += 1;
            total_freed += size;
            println!("  {} Removed {}", style("✓").green(), model.filename);
        }
    }

    // Leftovers from interrupted downloads
    if let Ok(entries) = fs::read_dir(model_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "tmp").unwrap_or(false) {
                let _ = fs::remove_file(&path);
            }
        }
    }

    if total_removed > 0 {
        println!();
        println!(
            "{} Removed {} files, freed {}",
            style("✓").green(),
            total_removed,
            format_size(total_freed)
        );
    } else {
        println!("{} No model files to remove.", style("ℹ").blue());
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}
