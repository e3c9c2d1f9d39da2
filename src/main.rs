//! Main entry point for the runpak CLI application.
//!
//! This binary lists, extracts and creates PAK archives. Any failure ends the
//! process with a non-zero status and the error chain on stderr.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::Path;
use std::sync::Arc;

use runpak::cli::{Cli, Command};
use runpak::pak::{PakExtractor, WriteOptions, create_pak};
use runpak::{LocalFileReader, ReadAt};

/// Application entry point.
///
/// Parses command-line arguments, sets up logging, and dispatches on the
/// subcommand.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    match &cli.command {
        Command::List { pak, long } => {
            let extractor = open_pak(pak).await?;
            list_files(&extractor, *long);
        }
        Command::Extract {
            pak,
            extract_dir,
            pipe,
        } => {
            let extractor = open_pak(pak).await?;
            let dest = extract_dir.as_deref().unwrap_or(Path::new(""));
            extract_files(&extractor, dest, *pipe, cli.is_quiet()).await?;
        }
        Command::Create {
            pak,
            source,
            strict_names,
        } => {
            let options = WriteOptions {
                strict_names: *strict_names,
            };
            create(pak, source, options, cli.is_quiet()).await?;
        }
    }

    Ok(())
}

async fn open_pak(path: &Path) -> Result<PakExtractor<LocalFileReader>> {
    let reader = Arc::new(LocalFileReader::new(path)?);
    info!("opened {} ({} bytes)", path.display(), reader.size());
    PakExtractor::open(reader)
        .await
        .with_context(|| format!("Couldn't load archive {}", path.display()))
}

/// List files in the PAK archive.
///
/// Supports two output formats:
/// - Simple format: just entry names, one per line
/// - Long format (`-l`): offset and length table with a totals line
fn list_files<R: ReadAt>(extractor: &PakExtractor<R>, long: bool) {
    if !long {
        for name in extractor.list() {
            println!("{}", name);
        }
        return;
    }

    println!("{:>10}  {:>10}  Name", "Offset", "Length");
    println!("{}", "-".repeat(50));
    let index = extractor.index();
    for entry in index {
        println!("{:>10}  {:>10}  {}", entry.offset, entry.length, entry.name);
    }
    println!("{}", "-".repeat(50));
    println!(
        "{:>10}  {:>10}  {} files",
        "",
        index.total_length(),
        index.len()
    );
}

/// Extract every entry, either to disk under `dest` or to stdout.
async fn extract_files<R: ReadAt>(
    extractor: &PakExtractor<R>,
    dest: &Path,
    pipe: bool,
    quiet: bool,
) -> Result<()> {
    if pipe {
        let mut stdout = tokio::io::stdout();
        extractor
            .extract_all_to_writer(&mut stdout)
            .await
            .context("Couldn't write entries to stdout")?;
        return Ok(());
    }

    extractor
        .extract_all(dest, |entry| {
            if !quiet {
                println!("  extracting: {}", entry.name);
            }
        })
        .await
        .context("Extraction failed")?;

    Ok(())
}

async fn create(pak: &Path, source: &Path, options: WriteOptions, quiet: bool) -> Result<()> {
    let finished = create_pak(pak, source, options, |entry| {
        if !quiet {
            println!("  adding: {}", entry.name);
        }
    })
    .await
    .with_context(|| {
        format!(
            "Couldn't create {} from {}",
            pak.display(),
            source.display()
        )
    })?;

    info!(
        "wrote {} entries, index at {}",
        finished.index.len(),
        finished.header.index_offset
    );
    Ok(())
}
