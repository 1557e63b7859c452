use anyhow::{bail, Context, Result};
use clap::Parser;
use squeeze_pack::archive::{build_archive, save_archive};
use squeeze_pack::batch::{run_batch, BatchReport, BatchState, CancelToken};
use squeeze_pack::cli::{Args, Commands, Selection};
use squeeze_pack::compressor::CompressionConfig;
use squeeze_pack::intake::{collect_selection, intake, SourceImage};
use squeeze_pack::logger;
use squeeze_pack::preview::render_previews;
use squeeze_pack::progress::BarProgress;
use squeeze_pack::utils::format_file_size;
use std::path::Path;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    let mut state = BatchState::new();

    match args.command {
        Commands::Compress {
            selection,
            output,
            quality,
            format,
            timeout,
        } => {
            let config = CompressionConfig::new(quality, format.as_deref())?
                .with_timeout(Duration::from_secs(timeout));
            let images = select_images(&selection, &mut state)?;
            if images.is_empty() {
                return Ok(());
            }
            compress_batch(images, &config, &mut state, &output).await?;
        }
        Commands::Preview {
            selection,
            thumbnails,
        } => {
            let images = select_images(&selection, &mut state)?;
            if images.is_empty() {
                return Ok(());
            }
            show_previews(&images, thumbnails.as_deref())?;
        }
    }

    Ok(())
}

fn select_images(selection: &Selection, state: &mut BatchState) -> Result<Vec<SourceImage>> {
    let files = collect_selection(&selection.inputs, selection.recursive)?;
    let images = intake(&files, state)?;

    if images.is_empty() {
        println!("⚠️  No image files found in the selection");
    } else {
        println!("📊 Found {} image files ({} selected)", images.len(), files.len());
    }

    Ok(images)
}

async fn compress_batch(
    images: Vec<SourceImage>,
    config: &CompressionConfig,
    state: &mut BatchState,
    output: &Path,
) -> Result<()> {
    println!("🚀 Compressing to {} at {}% quality", config.format, config.quality_percent());

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let sink = BarProgress::new(images.len());
    let report = run_batch(images, config, state, &cancel, &sink).await?;
    print_summary(&report);

    if report.all_failed() {
        bail!("none of the {} images could be compressed", report.total);
    }

    let bytes = build_archive(state.compressed())?;
    let written = save_archive(&bytes, output)
        .with_context(|| format!("failed to write archive {}", output.display()))?;

    println!(
        "✅ Archive written: {} ({}, {} entries)",
        output.display(),
        format_file_size(written),
        state.compressed().len()
    );

    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!("\n📊 Batch Compression Summary:");
    println!("  📁 Images compressed: {}/{}", report.succeeded, report.total);
    println!("  📊 Total original size: {}", format_file_size(report.input_bytes));
    println!("  📊 Total compressed size: {}", format_file_size(report.output_bytes));
    println!("  🎯 Overall compression ratio: {:.1}%", report.compression_ratio());
    println!("  ⏱️  Total time: {:?}", report.elapsed);

    if !report.failures.is_empty() {
        println!("  ⚠️  Failed files: {}", report.failures.len());
        for failure in &report.failures {
            println!("    ❌ #{} {}: {}", failure.index + 1, failure.name, failure.reason);
        }
    }
}

fn show_previews(images: &[SourceImage], thumbnails: Option<&Path>) -> Result<()> {
    let tiles = render_previews(images);

    for tile in &tiles {
        println!(
            "📋 {:<40} {:>10}  {}x{}",
            tile.name, tile.size_label, tile.width, tile.height
        );
        if let Some(dir) = thumbnails {
            tile.save_thumbnail(dir)?;
        }
    }

    let skipped = images.len() - tiles.len();
    if skipped > 0 {
        println!("⚠️  {} images could not be previewed", skipped);
    }

    Ok(())
}
