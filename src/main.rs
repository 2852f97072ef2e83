//! Draak CLI - Command-line tool for Darkstone game file extraction.
//!
//! This is the main entry point for the Draak command-line application.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use draak::prelude::*;

/// Draak - Darkstone game file extraction tool
#[derive(Parser)]
#[command(name = "draak")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an MTF archive from one or more directories
    Create {
        /// Path of the archive to write
        #[arg(short, long, env = "OUTPUT_MTF")]
        archive: PathBuf,

        /// Directories whose files become the archive entries
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Extract files from an MTF archive
    Extract {
        /// Path to the MTF file
        #[arg(short, long, env = "INPUT_MTF")]
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER", default_value = ".")]
        output: PathBuf,
    },

    /// List contents of an MTF archive
    List {
        /// Path to the MTF file
        #[arg(short, long, env = "INPUT_MTF")]
        archive: PathBuf,

        /// Write the listing to this file instead of the console
        #[arg(short, long)]
        log: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Create { archive, inputs } => {
            cmd_create(&archive, &inputs)?;
        }
        Commands::Extract { archive, output } => {
            cmd_extract(&archive, &output)?;
        }
        Commands::List { archive, log } => {
            cmd_list(&archive, log.as_deref())?;
        }
    }

    Ok(())
}

fn cmd_create(archive: &Path, inputs: &[PathBuf]) -> Result<()> {
    let start = Instant::now();
    let mut builder = MtfBuilder::new();

    for input in inputs {
        let root = input
            .canonicalize()
            .with_context(|| format!("Failed to resolve input directory {}", input.display()))?;

        for entry in WalkDir::new(&root).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(&root)?;
            builder
                .add_file(stored_name(relative)?, entry.path())
                .with_context(|| format!("Failed to add {}", entry.path().display()))?;
            println!("{} {}", relative.display(), entry.metadata()?.len());
        }
    }

    println!("Packing {} files into {}...", builder.len(), archive.display());
    builder.write_to(archive).context("Failed to write archive")?;
    println!("Created in {:?}", start.elapsed());

    Ok(())
}

fn cmd_extract(archive_path: &Path, output: &Path) -> Result<()> {
    println!("Opening MTF archive: {}", archive_path.display());

    let start = Instant::now();
    let archive = MtfArchive::open(archive_path).context("Failed to open MTF archive")?;
    println!("Loaded {} entries in {:?}", archive.entry_count(), start.elapsed());

    let pb = ProgressBar::new(archive.entry_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    archive
        .extract_all_parallel(output, |_| pb.inc(1))
        .context("Extraction failed")?;

    pb.finish_with_message("Done");
    println!(
        "Extracted {} files in {:?}",
        archive.entry_count(),
        start.elapsed()
    );

    Ok(())
}

fn cmd_list(archive_path: &Path, log: Option<&Path>) -> Result<()> {
    let archive = MtfArchive::open(archive_path).context("Failed to open MTF archive")?;
    let sep = display_separator();

    match log {
        Some(log_path) => {
            let mut file = fs::File::create(log_path)
                .with_context(|| format!("Failed to create log file {}", log_path.display()))?;
            for entry in archive.entries() {
                writeln!(file, "{}, {}", entry.display_name(sep), entry.data_size())?;
            }
            println!(
                "Wrote {} entries to {}",
                archive.entry_count(),
                log_path.display()
            );
        }
        None => {
            for entry in archive.entries() {
                println!("{} {}", entry.display_name(sep), entry.data_size());
            }
            println!("\nTotal: {} entries", archive.entry_count());
        }
    }

    Ok(())
}

/// Stored entry name for a file, relative to its input root.
///
/// The archive always stores `\` separators regardless of platform.
fn stored_name(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        let part = component
            .as_os_str()
            .to_str()
            .context("File name is not valid Unicode")?;
        parts.push(part);
    }
    Ok(parts.join("\\"))
}

/// Listings keep the stored backslashes on Windows and show forward
/// slashes everywhere else.
fn display_separator() -> Separator {
    if cfg!(windows) {
        Separator::Backslash
    } else {
        Separator::ForwardSlash
    }
}
