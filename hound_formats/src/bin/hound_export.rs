//! Decode a build record's thumbnail (or a swizzle stage view) to PNG.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use hound_formats::record::RECORD_FILE_NAME;
use hound_formats::{
    BuildRecord, SwizzleStage, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH, ThumbnailImage, load_thumbnail,
    visualize_stage,
};
use image::{ColorType, ImageEncoder, codecs::png::PngEncoder};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Record file or `.mcd` build folder to decode (ignored with --stage)
    #[arg(long, value_name = "PATH", required_unless_present = "stage")]
    input: Option<PathBuf>,

    /// Output PNG path
    #[arg(long, value_name = "FILE")]
    output: PathBuf,

    /// Paint a swizzle stage (1-5, a stage name, or `boundaries`) instead of decoding
    #[arg(long, value_name = "STAGE")]
    stage: Option<SwizzleStage>,

    /// Decode the thumbnail even if the header timestamp is invalid
    #[arg(long)]
    ignore_timestamp: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let image = match args.stage {
        Some(stage) => visualize_stage(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, stage),
        None => {
            let input = args
                .input
                .as_ref()
                .context("--input is required unless --stage is given")?;
            decode_input(input, args.ignore_timestamp)?
        }
    };

    write_png(&image, &args.output)
        .with_context(|| format!("writing PNG to {}", args.output.display()))?;
    println!(
        "wrote {}x{} thumbnail to {}",
        image.width(),
        image.height(),
        args.output.display()
    );
    Ok(())
}

fn decode_input(input: &Path, ignore_timestamp: bool) -> Result<ThumbnailImage> {
    let file = if input.is_dir() {
        input.join(RECORD_FILE_NAME)
    } else {
        input.to_path_buf()
    };

    if ignore_timestamp {
        return load_thumbnail(&file)
            .with_context(|| format!("decoding thumbnail from {}", file.display()));
    }

    let record = BuildRecord::open(&file)
        .with_context(|| format!("loading build record {}", file.display()))?;
    println!(
        "{} built {}",
        record.header.name,
        record.header.built_at.format("%Y-%m-%d %H:%M:%S")
    );
    Ok(record.image)
}

fn write_png(image: &ThumbnailImage, path: &Path) -> Result<()> {
    ensure!(
        image.width() > 0 && image.height() > 0,
        "refusing to write an empty image"
    );
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let encoder = PngEncoder::new(BufWriter::new(file));
    encoder.write_image(
        &image.to_rgba8888(),
        image.width(),
        image.height(),
        ColorType::Rgba8.into(),
    )?;
    Ok(())
}
