// ============================================================================
// mediascan-core/src/media/video_info.rs
// ============================================================================
//
// VIDEO INFO: Reading Stream Descriptors Through ffmpeg
//
// Runs `ffmpeg -hide_banner -i <file>` and assembles the printed input
// summary into a VideoInfo. ffmpeg exits non-zero here by design (no output
// file was given), so the exit code is not a failure signal; the presence
// of the "Input #0" section is.
//
// FAILURE MODEL:
// - Hard failures (missing file, missing tool, tool error text, no
//   "Input #0") abort the whole read. `try_read` returns the error; `read`
//   logs it and returns an empty VideoInfo.
// - A field that cannot be found is left unset; it never fails the read.

use std::path::{Path, PathBuf};

use super::extract::{
    container_bitrate, container_duration, container_format, extract_audio_stream,
    extract_subtitle_stream, extract_video_stream,
};
use super::segment::segment;
use super::{StreamKind, VideoInfo};
use crate::error::{CoreError, CoreResult};
use crate::external::{ToolInvoker, ToolOutput};

/// Marker that starts ffmpeg's description of the first input.
pub(crate) const INPUT_MARKER: &str = "Input #0";

/// ffmpeg's complaint when run with an input but no output. Expected here.
pub(crate) const NO_OUTPUT_COMPLAINT: &str = "At least one output file must be specified";

/// Reads [`VideoInfo`] for files using a given ffmpeg executable.
pub struct VideoInfoReader<I: ToolInvoker> {
    ffmpeg: PathBuf,
    invoker: I,
}

impl<I: ToolInvoker> VideoInfoReader<I> {
    pub fn new(ffmpeg: impl Into<PathBuf>, invoker: I) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            invoker,
        }
    }

    /// Reads the file, logging any hard failure and returning an empty
    /// [`VideoInfo`] in that case.
    pub fn read(&self, input: &Path) -> VideoInfo {
        match self.try_read(input) {
            Ok(info) => info,
            Err(e) => {
                log::error!("Failed reading video information for {}: {}", input.display(), e);
                VideoInfo::default()
            }
        }
    }

    /// Reads the file, returning hard failures as errors.
    pub fn try_read(&self, input: &Path) -> CoreResult<VideoInfo> {
        let output = run_input_summary(&self.ffmpeg, &self.invoker, input)?;
        log::debug!("Video information for {}:\n{}", input.display(), output);

        let info = parse_video_info(&output);
        log::info!(
            "Read {} video, {} audio, {} subtitle stream(s) from {}",
            info.video_streams.len(),
            info.audio_streams.len(),
            info.subtitle_streams.len(),
            input.display()
        );
        Ok(info)
    }
}

/// Runs ffmpeg's input summary for `input` and returns the captured text,
/// applying the hard-failure checks shared by all readers.
pub(crate) fn run_input_summary<I: ToolInvoker>(
    ffmpeg: &Path,
    invoker: &I,
    input: &Path,
) -> CoreResult<String> {
    if !input.is_file() {
        return Err(CoreError::InputNotFound(input.to_path_buf()));
    }
    if ffmpeg.as_os_str().is_empty() || !ffmpeg.is_file() {
        return Err(CoreError::ToolNotFound(format!(
            "ffmpeg not found: {}",
            if ffmpeg.as_os_str().is_empty() {
                "not passed in".to_string()
            } else {
                ffmpeg.display().to_string()
            }
        )));
    }

    let args = vec![
        "-hide_banner".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
    ];
    let ToolOutput {
        output, timed_out, ..
    } = invoker.execute(ffmpeg, &args, true)?;

    if timed_out {
        return Err(CoreError::ToolTimeout(input.to_path_buf()));
    }
    if !output.contains(INPUT_MARKER) {
        return Err(match failure_reason(&output) {
            Some(reason) => CoreError::ToolFailed(reason),
            None => CoreError::MissingInputMarker(input.to_path_buf()),
        });
    }

    Ok(output)
}

/// The error line ffmpeg left when it failed to open the input, if any.
///
/// The last non-empty line is what ffmpeg prints for a failed open
/// (`movie.mkv: Invalid data found when processing input`); the benign
/// no-output complaint is not an error.
fn failure_reason(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .filter(|line| *line != NO_OUTPUT_COMPLAINT)
        .map(str::to_string)
}

/// Assembles a [`VideoInfo`] from ffmpeg's input summary.
///
/// Streams keep their global appearance index. Type indices count each kind
/// separately: video and audio from 0, subtitles from 1. Repeated streams
/// are kept as reported.
#[must_use]
pub fn parse_video_info(output: &str) -> VideoInfo {
    let mut info = VideoInfo {
        container: container_format(output),
        duration: container_duration(output),
        bitrate: container_bitrate(output),
        ..Default::default()
    };

    for block in segment(output) {
        match block.kind {
            StreamKind::Video => {
                let mut stream = extract_video_stream(&block, output);
                stream.type_index = info.video_streams.len();
                info.video_streams.push(stream);
            }
            StreamKind::Audio => {
                let mut stream = extract_audio_stream(&block, output);
                stream.type_index = info.audio_streams.len();
                info.audio_streams.push(stream);
            }
            StreamKind::Subtitle => {
                let mut stream = extract_subtitle_stream(&block, output);
                stream.type_index = info.subtitle_streams.len() + 1;
                info.subtitle_streams.push(stream);
            }
            StreamKind::Unknown => {}
        }
    }

    info
}
