mod utils;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use image::ImageReader;
use im3::{Bitmap, PixelOperation};
use tracing::info;
use tracing_subscriber::EnvFilter;
use utils::{exists_decision, pixel_operation, Assume};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Subcommands,

    /// Overwrite output files
    #[arg(short = 'y', long = "overwrite", conflicts_with = "assumeno")]
    assumeyes: bool,

    /// Do not overwrite output files
    #[arg(short = 'n', long = "preserve", conflicts_with = "assumeyes")]
    assumeno: bool,

    /// Log more details, may be repeated
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Encode an image to IM3 format
    Encode(EncodeArgs),

    /// Decode an IM3 image into another format
    Decode(DecodeArgs),
}

#[derive(Debug, Args)]
struct EncodeArgs {
    /// Input image file of any type supported by `image`
    input: PathBuf,

    /// Output path to IM3 location. Defaults to the input path with `.im3`
    /// appended
    output: Option<PathBuf>,

    /// Pixel operation to apply before encoding
    ///
    /// Valid values:
    ///  - grayscale
    ///  - dither
    ///  - brighten=<factor>
    #[arg(short, long, value_parser = pixel_operation, verbatim_doc_comment)]
    filter: Option<PixelOperation>,
}

#[derive(Debug, Args)]
struct DecodeArgs {
    /// Input IM3 image file
    input: PathBuf,

    /// Output image file, the format is picked from the extension
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let assume = if args.assumeyes {
        Some(Assume::Yes)
    } else if args.assumeno {
        Some(Assume::No)
    } else {
        None
    };

    match args.command {
        Subcommands::Encode(a) => encode(a, assume),
        Subcommands::Decode(a) => decode(a, assume),
    }
}

fn encode(args: EncodeArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    let output = args.output.unwrap_or_else(|| {
        let mut name = args.input.clone().into_os_string();
        name.push(".im3");
        PathBuf::from(name)
    });

    if output.try_exists()?
        && !exists_decision("Output", "Overwrite", &output, assume)
    {
        return Ok(())
    }

    let image = ImageReader::open(&args.input)?
        .decode()?
        .into_rgb8();

    let width = image.width();
    let height = image.height();
    if width % 8 != 0 || height % 8 != 0 {
        bail!("Image is {width}×{height}, but both dimensions must be multiples of 8");
    }

    let mut bitmap = Bitmap::from_raw(width, height, image.into_raw())
        .context("Decoded image has an unexpected size")?;

    if let Some(filter) = args.filter {
        info!(?filter, "applying pixel operation");
        filter.apply_to(&mut bitmap);
    }

    let container = im3::compress(&bitmap)?;
    container.save(&output)?;

    info!(
        path = ?output,
        bytes = container.len(),
        raw_bytes = width as usize * height as usize * 3,
        "wrote IM3 image"
    );

    Ok(())
}

fn decode(args: DecodeArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    if args.output.try_exists()?
        && !exists_decision("Output", "Overwrite", &args.output, assume)
    {
        return Ok(())
    }

    let container = im3::open(&args.input)
        .with_context(|| format!("Could not read {:?}", args.input))?;
    let bitmap = im3::decompress(&container)?;

    let width = container.header.width();
    let height = container.header.height();

    image::save_buffer(
        &args.output,
        bitmap.as_raw(),
        width,
        height,
        image::ColorType::Rgb8,
    )?;

    info!(path = ?args.output, width, height, "wrote decoded image");

    Ok(())
}
