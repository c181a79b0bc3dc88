// mediascan-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use mediascan_core::HardwareEncoder;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Mediascan: media stream inspection",
    long_about = "Reads stream information from media files and probes hardware encoders using ffmpeg via mediascan-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// ffmpeg executable to use (defaults to `ffmpeg` on PATH).
    #[arg(long, global = true, value_name = "PATH", env = "MEDIASCAN_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Kill any single ffmpeg run after this many seconds.
    #[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reads video, audio and subtitle streams from one or more files
    Info(InfoArgs),
    /// Reads tags and audio properties from a music file
    Music(MusicArgs),
    /// Runs trial encodes to find usable hardware encoders
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Media files to read
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Print JSON instead of the human-readable layout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct MusicArgs {
    /// Music file to read
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print JSON instead of the human-readable layout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Encoders to probe, e.g. nvidia-hevc or hevc_nvenc (default: all)
    #[arg(value_name = "ENCODERS")]
    pub encoders: Vec<HardwareEncoder>,

    /// Print JSON instead of the human-readable layout
    #[arg(long)]
    pub json: bool,

    /// Wait between the two trial encodes of a retried encoder
    #[arg(long, value_name = "MS")]
    pub retry_delay_ms: Option<u64>,
}
