//! Implementation of the 'info' subcommand.
//!
//! Files are read in parallel, each with its own ffmpeg process; results are
//! reported in the order the files were given.

use anyhow::Result;
use log::{error, info};
use mediascan_core::{ProcessInvoker, VideoInfoReader};
use rayon::prelude::*;
use serde_json::json;

use super::resolve_ffmpeg;
use crate::cli::InfoArgs;
use crate::output::{print_error, print_file_header, print_video_info};
use mediascan_core::CoreConfig;

pub fn run_info(config: &CoreConfig, args: InfoArgs) -> Result<i32> {
    let ffmpeg = resolve_ffmpeg(config)?;
    let reader = VideoInfoReader::new(ffmpeg, ProcessInvoker::new(config.tool_timeout));

    info!("Reading {} file(s)", args.files.len());
    let results: Vec<_> = args
        .files
        .par_iter()
        .map(|file| (file, reader.try_read(file)))
        .collect();

    let mut failures = 0usize;
    let mut documents = Vec::with_capacity(results.len());

    for (file, result) in &results {
        match result {
            Ok(video_info) => {
                if args.json {
                    documents.push(json!({ "file": file, "info": video_info }));
                } else {
                    print_video_info(file, video_info);
                }
            }
            Err(e) => {
                failures += 1;
                error!("Failed reading video information for {}: {}", file.display(), e);
                if args.json {
                    documents.push(json!({ "file": file, "error": e.to_string() }));
                } else {
                    print_file_header(file);
                    print_error(&e.to_string());
                }
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&documents)?);
    }

    if failures > 0 {
        error!("{} of {} file(s) could not be read", failures, results.len());
        return Ok(1);
    }
    Ok(0)
}
