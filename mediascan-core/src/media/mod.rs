//! Media descriptors recovered from ffmpeg's diagnostic output.
//!
//! Running `ffmpeg -i <file>` without an output prints a human-readable
//! summary of the container and every stream to standard error. This module
//! turns that text into typed records:
//!
//! - [`segment`] splits the text into one block per `Stream #n:m` header and
//!   classifies each block as video, audio or subtitle.
//! - [`extract`] pulls individual fields out of a block through ordered
//!   fallback chains.
//! - [`video_info`] runs ffmpeg and assembles the blocks into a [`VideoInfo`].
//! - [`music_info`] reads tag-oriented metadata for audio files.
//!
//! All records are plain values; nothing is cached between reads.

use serde::Serialize;
use std::time::Duration;

pub mod extract;
pub mod music_info;
pub mod segment;
pub mod video_info;

pub use music_info::{MusicInfo, MusicInfoReader, parse_music_info};
pub use segment::{StreamBlock, StreamBlocks, classify, segment};
pub use video_info::{VideoInfoReader, parse_video_info};

/// The kind of stream a block describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Unknown,
}

impl StreamKind {
    /// The header marker ffmpeg prints for this kind, e.g. `Video:`.
    #[must_use]
    pub fn marker(self) -> Option<&'static str> {
        match self {
            StreamKind::Video => Some("Video:"),
            StreamKind::Audio => Some("Audio:"),
            StreamKind::Subtitle => Some("Subtitle:"),
            StreamKind::Unknown => None,
        }
    }
}

/// A video stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoStream {
    /// Position among all stream headers in the tool output.
    pub index: usize,
    /// Position among video streams, starting at 0.
    pub type_index: usize,
    /// Stream id as printed, e.g. "0:0".
    pub stream_id: String,
    pub codec: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frames_per_second: Option<f32>,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Option<Duration>,
    /// Bits per second from the stream's `BPS` tag.
    pub bitrate: Option<u64>,
}

/// An audio stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioStream {
    pub index: usize,
    /// Position among audio streams, starting at 0.
    pub type_index: usize,
    pub stream_id: String,
    pub codec: String,
    /// Channel count; layouts like "5.1" are kept as 5.1.
    pub channels: Option<f32>,
    pub sample_rate: Option<u32>,
    pub language: String,
    pub title: String,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Option<Duration>,
}

/// A subtitle stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubtitleStream {
    pub index: usize,
    /// Position among subtitle streams, starting at 1.
    pub type_index: usize,
    pub stream_id: String,
    pub codec: String,
    pub language: String,
    pub title: String,
    pub forced: bool,
}

/// Everything read from one file.
///
/// A default (empty) value is what a failed read produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoInfo {
    /// Container formats from the `Input #0, <formats>, from` line.
    pub container: Option<String>,
    /// Container-level duration.
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Option<Duration>,
    /// Container-level bitrate in kb/s.
    pub bitrate: Option<u64>,
    pub video_streams: Vec<VideoStream>,
    pub audio_streams: Vec<AudioStream>,
    pub subtitle_streams: Vec<SubtitleStream>,
}

impl VideoInfo {
    /// Total number of classified streams.
    #[must_use]
    pub fn stream_count(&self) -> usize {
        self.video_streams.len() + self.audio_streams.len() + self.subtitle_streams.len()
    }

    /// True when nothing at all was read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Serializes an optional duration as fractional seconds.
pub(crate) fn serialize_secs<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}
