//! Implementation of the 'music' subcommand.

use anyhow::{Context, Result};
use mediascan_core::{CoreConfig, MusicInfoReader, ProcessInvoker};

use super::resolve_ffmpeg;
use crate::cli::MusicArgs;
use crate::output::print_music_info;

pub fn run_music(config: &CoreConfig, args: MusicArgs) -> Result<i32> {
    let ffmpeg = resolve_ffmpeg(config)?;
    let reader = MusicInfoReader::new(ffmpeg, ProcessInvoker::new(config.tool_timeout));

    let music = reader
        .try_read(&args.file)
        .with_context(|| format!("Failed to read audio information for {}", args.file.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&music)?);
    } else {
        print_music_info(&args.file, &music);
    }
    Ok(0)
}
