use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use libvelox::{Reader, FORMAT_FLOAT};
use velox::TagOverrides;

#[derive(Parser)]
#[command(name = "velox")]
#[command(version = "0.8.0")]
#[command(about = "Velox lossless audio codec", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a WAV or AIFF file losslessly
    Encode {
        /// Input audio file (.wav, .aif, .aiff)
        input: PathBuf,
        /// Output velox file (.vlx)
        output: PathBuf,
        /// Title tag (overrides anything imported from the source)
        #[arg(long)]
        title: Option<String>,
        /// Artist tag
        #[arg(long)]
        artist: Option<String>,
        /// Album tag
        #[arg(long)]
        album: Option<String>,
    },
    /// Restore the original container file from a velox file
    Decode {
        /// Input velox file
        input: PathBuf,
        /// Output audio file
        output: PathBuf,
    },
    /// Show information about a velox file
    Info {
        /// Input velox file
        input: PathBuf,
    },
    /// Show tags from a velox file
    Tags {
        /// Input velox file
        input: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            title,
            artist,
            album,
        } => encode(
            &input,
            &output,
            TagOverrides {
                title,
                artist,
                album,
            },
        ),
        Commands::Decode { input, output } => decode(&input, &output),
        Commands::Info { input } => show_info(&input),
        Commands::Tags { input, json } => show_tags(&input, json),
    }
}

fn encode(input: &Path, output: &Path, overrides: TagOverrides) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("cannot read {}", input.display()))?;
    let encoded = velox::encode_file(&bytes, &overrides)
        .with_context(|| format!("cannot encode {}", input.display()))?;

    info!("{} bytes in, {} bytes out", bytes.len(), encoded.len());
    fs::write(output, &encoded)
        .with_context(|| format!("cannot write {}", output.display()))?;

    println!(
        "{} -> {} ({:.1}% of the source file)",
        input.display(),
        output.display(),
        100.0 * encoded.len() as f64 / bytes.len().max(1) as f64
    );
    Ok(())
}

fn decode(input: &Path, output: &Path) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("cannot read {}", input.display()))?;
    let restored = velox::decode_file(&data)
        .with_context(|| format!("cannot decode {}", input.display()))?;

    fs::write(output, &restored)
        .with_context(|| format!("cannot write {}", output.display()))?;
    println!(
        "{} -> {} ({} bytes)",
        input.display(),
        output.display(),
        restored.len()
    );
    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("cannot read {}", input.display()))?;
    let file = Reader::new().read(&data)?;
    let h = &file.header;

    let frames = h.total_samples / h.channels.max(1) as u64;
    let seconds = frames as f64 / h.sample_rate.max(1) as f64;
    let raw_size = h.total_samples * (h.bits_per_sample as u64 / 8);

    println!("velox {}.{}", h.version >> 8, h.version & 0xFF);
    println!(
        "  {} Hz, {} ch, {} bit{}",
        h.sample_rate,
        h.channels,
        h.bits_per_sample,
        if h.format_code == FORMAT_FLOAT { " float" } else { "" }
    );
    println!("  {} frames ({:.1} s)", frames, seconds);
    println!(
        "  payload {} bytes ({:.1}% of {} raw)",
        file.payload.len(),
        100.0 * file.payload.len() as f64 / raw_size.max(1) as f64,
        raw_size
    );
    println!(
        "  preserved container bytes: {} header, {} footer",
        file.header_blob.len(),
        file.footer_blob.len()
    );
    Ok(())
}

fn show_tags(input: &Path, json: bool) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("cannot read {}", input.display()))?;
    let file = Reader::new().read(&data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&file.metadata)?);
        return Ok(());
    }

    println!("vendor: {}", file.metadata.vendor);
    for (key, value) in &file.metadata.tags {
        println!("{}: {}", key, value);
    }
    match &file.metadata.picture {
        Some(pic) => println!("picture: {} ({} bytes)", pic.mime_type, pic.data.len()),
        None => println!("picture: none"),
    }
    Ok(())
}
