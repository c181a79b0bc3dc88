//! Field extraction from stream blocks.
//!
//! Each field is a [`FieldChain`]: an ordered list of small extractors, each
//! returning `Option<T>`. The first extractor that produces a value wins;
//! later ones only exist for output variants seen from other ffmpeg builds or
//! containers. A chain that finds nothing leaves the field unset, it never
//! fails the read.
//!
//! Supporting a new output variant means appending an extractor to the
//! relevant chain, not editing the existing ones.

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

use super::segment::StreamBlock;
use super::{AudioStream, StreamKind, SubtitleStream, VideoStream};
use crate::utils::parse_ffmpeg_duration;

// ============================================================================
// PATTERNS
// ============================================================================

/// Compiled patterns, built once.
struct Patterns {
    resolution: Regex,
    frame_rate: Regex,
    duration_tag: Regex,
    container_duration: Regex,
    container_bitrate: Regex,
    container_format: Regex,
    bps_tag: Regex,
    sample_rate: Regex,
    leading_number: Regex,
    language: Regex,
    language_with_stream_tag: Regex,
    title_tag: Regex,
}

static PATTERNS: Lazy<Patterns> = Lazy::new(|| Patterns {
    // Both sides need 3+ digits so "16x9" style fragments never match.
    resolution: compile(r"(\d{3,})x(\d{3,})"),
    frame_rate: compile(r"(\d+(?:\.\d+)?)\s*fps"),
    duration_tag: compile(r"(?m)^\s*DURATION(?:-\w+)?\s*:\s*(\d+:\d{2}:\d{2}(?:\.\d+)?)"),
    container_duration: compile(r"(?m)^\s*Duration:\s*([^,\r\n]*)"),
    container_bitrate: compile(r"(?m)^\s*Duration:.*?bitrate:\s*(\d+)\s*kb/s"),
    container_format: compile(r"(?m)^Input #0, (.+?), from '"),
    bps_tag: compile(r"(?m)^\s*BPS(?:-\w+)?\s*:\s*(\d+)\s*$"),
    sample_rate: compile(r"(?i)(\d+)\s*hz\b"),
    leading_number: compile(r"^\d+(?:\.\d+)?"),
    language: compile(r"Stream\s#\d+:\d+\(([^)]+)\)"),
    language_with_stream_tag: compile(r"Stream\s#\d+:\d+\[0x[0-9a-fA-F]+\]\(([^)]+)\)"),
    title_tag: compile(r"(?m)^\s*title\s*:[ \t]?(.*)$"),
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("extraction patterns are valid")
}

// ============================================================================
// EXTRACTOR CHAINS
// ============================================================================

/// What an extractor gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext<'a> {
    pub kind: StreamKind,
    /// The stream's header line.
    pub header: &'a str,
    /// The whole stream block, metadata included.
    pub block: &'a str,
    /// The complete tool output, for container-level fallbacks.
    pub full_text: &'a str,
}

impl<'a> BlockContext<'a> {
    #[must_use]
    pub fn new(block: &StreamBlock<'a>, full_text: &'a str) -> Self {
        Self {
            kind: block.kind,
            header: block.header(),
            block: block.text,
            full_text,
        }
    }
}

/// One way of reading a field.
pub type Extractor<T> = fn(&BlockContext<'_>) -> Option<T>;

/// An ordered fallback list of extractors for one field.
pub struct FieldChain<T: 'static> {
    pub name: &'static str,
    pub extractors: &'static [Extractor<T>],
}

impl<T: 'static> FieldChain<T> {
    /// Runs the extractors in order and returns the first value found.
    pub fn extract(&self, ctx: &BlockContext<'_>) -> Option<T> {
        for (position, extractor) in self.extractors.iter().enumerate() {
            if let Some(value) = extractor(ctx) {
                if position > 0 {
                    log::trace!("{}: fallback extractor #{} matched", self.name, position);
                }
                return Some(value);
            }
        }
        log::trace!("{}: no match in '{}'", self.name, ctx.header);
        None
    }
}

pub const CODEC: FieldChain<String> = FieldChain {
    name: "codec",
    extractors: &[codec_after_marker],
};

pub const RESOLUTION: FieldChain<(u32, u32)> = FieldChain {
    name: "resolution",
    extractors: &[resolution_in_header],
};

pub const FRAME_RATE: FieldChain<f32> = FieldChain {
    name: "frame_rate",
    extractors: &[frame_rate_before_fps],
};

/// Per-stream DURATION tag first, container `Duration:` line second.
pub const VIDEO_DURATION: FieldChain<Duration> = FieldChain {
    name: "video_duration",
    extractors: &[duration_tag, duration_from_container],
};

/// Audio streams only trust their own DURATION tag.
pub const AUDIO_DURATION: FieldChain<Duration> = FieldChain {
    name: "audio_duration",
    extractors: &[duration_tag],
};

pub const BITRATE: FieldChain<u64> = FieldChain {
    name: "bitrate",
    extractors: &[bps_tag],
};

pub const SAMPLE_RATE: FieldChain<u32> = FieldChain {
    name: "sample_rate",
    extractors: &[sample_rate_before_hz],
};

pub const CHANNELS: FieldChain<f32> = FieldChain {
    name: "channels",
    extractors: &[channels_after_sample_rate, channels_third_field],
};

pub const LANGUAGE: FieldChain<String> = FieldChain {
    name: "language",
    extractors: &[language_after_stream_id, language_after_stream_tag],
};

pub const TITLE: FieldChain<String> = FieldChain {
    name: "title",
    extractors: &[title_tag],
};

// ============================================================================
// EXTRACTORS
// ============================================================================

fn codec_after_marker(ctx: &BlockContext<'_>) -> Option<String> {
    let marker = ctx.kind.marker()?;
    let start = ctx.header.find(marker)? + marker.len();
    let codec: String = ctx.header[start..]
        .trim_start()
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != ',')
        .collect();
    (!codec.is_empty()).then(|| codec.to_lowercase())
}

fn resolution_in_header(ctx: &BlockContext<'_>) -> Option<(u32, u32)> {
    let caps = PATTERNS.resolution.captures(ctx.header)?;
    let width = caps[1].parse().ok()?;
    let height = caps[2].parse().ok()?;
    Some((width, height))
}

fn frame_rate_before_fps(ctx: &BlockContext<'_>) -> Option<f32> {
    PATTERNS.frame_rate.captures(ctx.header)?[1].parse().ok()
}

fn duration_tag(ctx: &BlockContext<'_>) -> Option<Duration> {
    parse_ffmpeg_duration(&PATTERNS.duration_tag.captures(ctx.block)?[1])
}

fn duration_from_container(ctx: &BlockContext<'_>) -> Option<Duration> {
    container_duration(ctx.full_text)
}

fn bps_tag(ctx: &BlockContext<'_>) -> Option<u64> {
    PATTERNS.bps_tag.captures(ctx.block)?[1].parse().ok()
}

fn sample_rate_before_hz(ctx: &BlockContext<'_>) -> Option<u32> {
    PATTERNS.sample_rate.captures(ctx.header)?[1].parse().ok()
}

/// The channel layout normally follows the sample rate field.
fn channels_after_sample_rate(ctx: &BlockContext<'_>) -> Option<f32> {
    let fields: Vec<&str> = ctx.header.split(',').map(str::trim).collect();
    let hz = fields.iter().position(|f| PATTERNS.sample_rate.is_match(f))?;
    parse_channel_layout(fields.get(hz + 1)?)
}

fn channels_third_field(ctx: &BlockContext<'_>) -> Option<f32> {
    parse_channel_layout(ctx.header.split(',').nth(2)?.trim())
}

fn language_after_stream_id(ctx: &BlockContext<'_>) -> Option<String> {
    Some(PATTERNS.language.captures(ctx.header)?[1].to_lowercase())
}

/// Newer ffmpeg builds print the container stream id: `Stream #0:1[0x1100](eng):`.
fn language_after_stream_tag(ctx: &BlockContext<'_>) -> Option<String> {
    Some(PATTERNS.language_with_stream_tag.captures(ctx.header)?[1].to_lowercase())
}

fn title_tag(ctx: &BlockContext<'_>) -> Option<String> {
    let title = PATTERNS.title_tag.captures(ctx.block)?[1].trim().to_string();
    (!title.is_empty()).then_some(title)
}

// ============================================================================
// PUBLIC HELPERS
// ============================================================================

/// Parses a channel layout field: "stereo" is 2, otherwise the leading
/// number ("5.1(side)" -> 5.1). Anything else is `None`.
#[must_use]
pub fn parse_channel_layout(field: &str) -> Option<f32> {
    let field = field.trim();
    if field == "stereo" {
        return Some(2.0);
    }
    PATTERNS.leading_number.find(field)?.as_str().parse().ok()
}

/// Container duration from the `Duration:` line, cut at the first comma.
/// `Duration: N/A` yields `None`.
#[must_use]
pub fn container_duration(full_text: &str) -> Option<Duration> {
    parse_ffmpeg_duration(PATTERNS.container_duration.captures(full_text)?.get(1)?.as_str())
}

/// Container bitrate in kb/s from the `Duration:` line.
#[must_use]
pub fn container_bitrate(full_text: &str) -> Option<u64> {
    PATTERNS.container_bitrate.captures(full_text)?[1].parse().ok()
}

/// Container formats from `Input #0, matroska,webm, from '...'`.
#[must_use]
pub fn container_format(full_text: &str) -> Option<String> {
    Some(PATTERNS.container_format.captures(full_text)?[1].trim().to_string())
}

/// Builds a video stream record from a classified block.
#[must_use]
pub fn extract_video_stream(block: &StreamBlock<'_>, full_text: &str) -> VideoStream {
    let ctx = BlockContext::new(block, full_text);
    let resolution = RESOLUTION.extract(&ctx);
    VideoStream {
        index: block.index,
        type_index: 0,
        stream_id: block.stream_id.to_string(),
        codec: CODEC.extract(&ctx).unwrap_or_default(),
        width: resolution.map(|(w, _)| w),
        height: resolution.map(|(_, h)| h),
        frames_per_second: FRAME_RATE.extract(&ctx),
        duration: VIDEO_DURATION.extract(&ctx),
        bitrate: BITRATE.extract(&ctx),
    }
}

/// Builds an audio stream record from a classified block.
#[must_use]
pub fn extract_audio_stream(block: &StreamBlock<'_>, full_text: &str) -> AudioStream {
    let ctx = BlockContext::new(block, full_text);
    AudioStream {
        index: block.index,
        type_index: 0,
        stream_id: block.stream_id.to_string(),
        codec: CODEC.extract(&ctx).unwrap_or_default(),
        channels: CHANNELS.extract(&ctx),
        sample_rate: SAMPLE_RATE.extract(&ctx),
        language: LANGUAGE.extract(&ctx).unwrap_or_default(),
        title: TITLE.extract(&ctx).unwrap_or_default(),
        duration: AUDIO_DURATION.extract(&ctx),
    }
}

/// Builds a subtitle stream record from a classified block.
#[must_use]
pub fn extract_subtitle_stream(block: &StreamBlock<'_>, full_text: &str) -> SubtitleStream {
    let ctx = BlockContext::new(block, full_text);
    SubtitleStream {
        index: block.index,
        type_index: 0,
        stream_id: block.stream_id.to_string(),
        codec: CODEC.extract(&ctx).unwrap_or_default(),
        language: LANGUAGE.extract(&ctx).unwrap_or_default(),
        title: TITLE.extract(&ctx).unwrap_or_default(),
        forced: block.text.to_lowercase().contains("forced"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::segment::segment;

    fn first_block(text: &str) -> StreamBlock<'_> {
        segment(text).next().expect("one classified block")
    }

    #[test]
    fn test_video_header_fields() {
        let text = "  Stream #0:0(eng): Video: h264 (High), yuv420p(tv, bt709/unknown/unknown, progressive), 1920x1080 [SAR 1:1 DAR 16:9], 23.98 fps, 23.98 tbr, 1k tbn (default)\n";
        let video = extract_video_stream(&first_block(text), text);
        assert_eq!(video.codec, "h264");
        assert_eq!(video.width, Some(1920));
        assert_eq!(video.height, Some(1080));
        assert!((video.frames_per_second.unwrap() - 23.98).abs() < 0.001);
        assert_eq!(video.stream_id, "0:0");
    }

    #[test]
    fn test_resolution_requires_three_digits() {
        let text = "  Stream #0:0: Video: mjpeg, yuvj420p, 16x9, 25 fps\n";
        let video = extract_video_stream(&first_block(text), text);
        assert_eq!(video.width, None);
        assert_eq!(video.height, None);
        assert_eq!(video.frames_per_second, Some(25.0));
    }

    #[test]
    fn test_codec_is_lowercased_and_stops_at_comma() {
        let text = "  Stream #0:0: Video: HEVC, yuv420p10le, 3840x2160\n";
        let video = extract_video_stream(&first_block(text), text);
        assert_eq!(video.codec, "hevc");
        assert_eq!(video.width, Some(3840));
    }

    #[test]
    fn test_video_duration_prefers_stream_tag() {
        let text = "  Duration: 01:00:00.00, start: 0.000000, bitrate: 5000 kb/s
  Stream #0:0: Video: hevc, yuv420p, 1280x720, 25 fps
    Metadata:
      DURATION-eng    : 00:42:08.576000000
      BPS-eng         : 4521987
";
        let video = extract_video_stream(&first_block(text), text);
        assert_eq!(video.duration, Some(Duration::from_millis(2_528_576)));
        assert_eq!(video.bitrate, Some(4_521_987));
    }

    #[test]
    fn test_video_duration_falls_back_to_container_line() {
        let text = "  Duration: 00:03:25.50, start: 0.000000, bitrate: 5000 kb/s
  Stream #0:0: Video: h264, yuv420p, 1280x720, 25 fps
";
        let video = extract_video_stream(&first_block(text), text);
        assert_eq!(video.duration, Some(Duration::from_millis(205_500)));
        // The summary bitrate line is not a per-stream bitrate.
        assert_eq!(video.bitrate, None);
    }

    #[test]
    fn test_video_duration_unparseable_is_unset() {
        let text = "  Duration: N/A, bitrate: N/A\n  Stream #0:0: Video: h264, 1280x720\n";
        let video = extract_video_stream(&first_block(text), text);
        assert_eq!(video.duration, None);
    }

    #[test]
    fn test_audio_header_fields() {
        let text = "  Stream #0:1(eng): Audio: dts (DTS), 48000 Hz, stereo, fltp, 1536 kb/s (default)\n";
        let audio = extract_audio_stream(&first_block(text), text);
        assert_eq!(audio.codec, "dts");
        assert_eq!(audio.sample_rate, Some(48000));
        assert_eq!(audio.channels, Some(2.0));
        assert_eq!(audio.language, "eng");
        assert_eq!(audio.title, "");
        assert_eq!(audio.duration, None);
    }

    #[test]
    fn test_audio_surround_layout_and_title() {
        let text = "  Stream #0:2(GER): Audio: ac3, 48000 Hz, 5.1(side), fltp, 640 kb/s
    Metadata:
      title           : Surround 5.1
      DURATION        : 01:39:03.360000000
";
        let audio = extract_audio_stream(&first_block(text), text);
        assert_eq!(audio.channels, Some(5.1));
        assert_eq!(audio.language, "ger");
        assert_eq!(audio.title, "Surround 5.1");
        assert_eq!(audio.duration, Some(Duration::from_millis(5_943_360)));
    }

    #[test]
    fn test_audio_does_not_use_container_duration() {
        let text = "  Duration: 00:03:25.50, start: 0.000000, bitrate: 320 kb/s
  Stream #0:0: Audio: mp3, 44100 Hz, stereo, fltp, 320 kb/s
";
        let audio = extract_audio_stream(&first_block(text), text);
        assert_eq!(audio.duration, None);
        assert_eq!(audio.language, "");
    }

    #[test]
    fn test_language_with_container_stream_tag() {
        let text = "  Stream #0:1[0x1100](fra): Audio: aac (LC), 48000 Hz, stereo, fltp\n";
        let audio = extract_audio_stream(&first_block(text), text);
        assert_eq!(audio.language, "fra");
    }

    #[test]
    fn test_channels_when_sample_rate_missing() {
        // Without a Hz field the third comma-separated field is used.
        let text = "  Stream #0:1: Audio: pcm_s16le, unknown, 6 channels, s16\n";
        let audio = extract_audio_stream(&first_block(text), text);
        assert_eq!(audio.sample_rate, None);
        assert_eq!(audio.channels, Some(6.0));
    }

    #[test]
    fn test_parse_channel_layout() {
        assert_eq!(parse_channel_layout("stereo"), Some(2.0));
        assert_eq!(parse_channel_layout(" 5.1 "), Some(5.1));
        assert_eq!(parse_channel_layout("7.1(wide)"), Some(7.1));
        assert_eq!(parse_channel_layout("mono"), None);
        assert_eq!(parse_channel_layout("downmix"), None);
        assert_eq!(parse_channel_layout(""), None);
    }

    #[test]
    fn test_subtitle_fields() {
        let text = "  Stream #0:3(eng): Subtitle: hdmv_pgs_subtitle (pgssub), 1920x1080 (forced)
    Metadata:
      title           : Signs
";
        let sub = extract_subtitle_stream(&first_block(text), text);
        assert_eq!(sub.codec, "hdmv_pgs_subtitle");
        assert_eq!(sub.language, "eng");
        assert_eq!(sub.title, "Signs");
        assert!(sub.forced);
    }

    #[test]
    fn test_subtitle_forced_marker_anywhere_in_block() {
        let text = "  Stream #0:4(spa): Subtitle: subrip
    Metadata:
      title           : FORCED
";
        assert!(extract_subtitle_stream(&first_block(text), text).forced);

        let plain = "  Stream #0:4(spa): Subtitle: subrip\n";
        assert!(!extract_subtitle_stream(&first_block(plain), plain).forced);
    }

    #[test]
    fn test_container_fields() {
        let text = "Input #0, matroska,webm, from '/media/movie.mkv':
  Duration: 01:39:03.36, start: 0.000000, bitrate: 9876 kb/s
";
        assert_eq!(container_format(text).as_deref(), Some("matroska,webm"));
        assert_eq!(container_bitrate(text), Some(9876));
        assert_eq!(container_duration(text), Some(Duration::from_millis(5_943_360)));
    }

    #[test]
    fn test_chain_falls_through_in_order() {
        fn never(_: &BlockContext<'_>) -> Option<u8> {
            None
        }
        fn seven(_: &BlockContext<'_>) -> Option<u8> {
            Some(7)
        }
        fn nine(_: &BlockContext<'_>) -> Option<u8> {
            Some(9)
        }
        const CHAIN: FieldChain<u8> = FieldChain {
            name: "test",
            extractors: &[never, seven, nine],
        };
        let ctx = BlockContext {
            kind: StreamKind::Video,
            header: "",
            block: "",
            full_text: "",
        };
        assert_eq!(CHAIN.extract(&ctx), Some(7));
    }
}
