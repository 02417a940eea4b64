//! swatch CLI - placeholder icon generator
//!
//! Writes solid-color PNG icons, single images of any size, and inspects
//! the chunk structure of existing PNG files.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};

use swatch::png::chunk::ChunkReader;
use swatch::png::PngOptions;
use swatch::{IconSet, Rgb};

/// Generate solid-color placeholder PNG images.
#[derive(Parser, Debug)]
#[command(name = "swatch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the icon set (icon-192.png, icon-512.png, apple-touch-icon.png by default)
    Icons {
        /// Directory to write icons into
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,

        /// Fill color as #rrggbb or #rgb (overrides the manifest)
        #[arg(long)]
        color: Option<Rgb>,

        /// TOML manifest describing a custom icon set
        #[arg(short, long, value_name = "FILE")]
        manifest: Option<PathBuf>,

        /// Compression level (1-9, overrides the manifest)
        #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=9))]
        compression: Option<u8>,
    },

    /// Write a single solid-color PNG
    Generate {
        /// Image width in pixels
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,

        /// Image height in pixels
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        height: u32,

        /// Fill color as #rrggbb or #rgb
        #[arg(long, default_value = "#2563eb")]
        color: Rgb,

        /// Compression level (1-9, higher = smaller file)
        #[arg(
            short = 'c',
            long,
            default_value = "9",
            value_parser = clap::value_parser!(u8).range(1..=9)
        )]
        compression: u8,

        /// Output file path
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// List the chunks of a PNG file and verify their CRCs
    Inspect {
        /// PNG file to inspect
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Icons {
            out_dir,
            color,
            manifest,
            compression,
        } => {
            let mut set = match &manifest {
                Some(path) => IconSet::load(path)?,
                None => IconSet::default(),
            };
            if let Some(color) = color {
                set.color = color;
            }
            let mut options = set.png_options();
            if let Some(level) = compression {
                options.compression_level = level;
            }

            let start = Instant::now();
            for icon in set.write_all(&out_dir, &options)? {
                let name = icon
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                println!("Created {} ({}x{})", name, icon.size, icon.size);
                debug!("  {} bytes", icon.bytes);
            }
            debug!("icon set done in {:.2?}", start.elapsed());
        }

        Command::Generate {
            width,
            height,
            color,
            compression,
            output,
        } => {
            let options = PngOptions {
                compression_level: compression,
            };
            let data = swatch::png::encode_with_options(width, height, color, &options)?;
            fs::write(&output, &data)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Created {} ({}x{}, {})",
                output.display(),
                width,
                height,
                format_size(data.len() as u64)
            );
        }

        Command::Inspect { input } => {
            let bytes =
                fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            inspect(&bytes)?;
        }
    }

    Ok(())
}

/// Print one line per chunk and the decoded IHDR fields.
fn inspect(bytes: &[u8]) -> anyhow::Result<()> {
    let mut chunk_count = 0;
    for chunk in ChunkReader::new(bytes)? {
        let chunk = chunk?;
        chunk_count += 1;
        println!(
            "{:>8}  {}  {:>8} bytes  crc {:08x} ok",
            chunk.offset,
            chunk.kind_str(),
            chunk.data.len(),
            chunk.crc
        );

        if &chunk.kind == b"IHDR" {
            let d = chunk.data;
            if d.len() != 13 {
                bail!("IHDR has {} bytes, expected 13", d.len());
            }
            let width = u32::from_be_bytes([d[0], d[1], d[2], d[3]]);
            let height = u32::from_be_bytes([d[4], d[5], d[6], d[7]]);
            println!(
                "          {width}x{height}, bit depth {}, color type {}, \
                 compression {}, filter {}, interlace {}",
                d[8], d[9], d[10], d[11], d[12]
            );
        }
    }

    println!("{} chunks, {}", chunk_count, format_size(bytes.len() as u64));
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
