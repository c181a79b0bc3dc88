//! Core library for reading media stream information from ffmpeg and
//! probing which hardware encoders actually work on this machine.
//!
//! ffmpeg has no machine-readable "describe this file" mode of its own, so
//! the readers here run `ffmpeg -hide_banner -i <file>` and parse the
//! human-oriented input summary it prints.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use mediascan_core::{CoreConfig, EncoderTable, HardwareEncoder, HardwareProbe};
//! use mediascan_core::{ProcessInvoker, VideoInfoReader, resolve_tool};
//! use std::path::Path;
//!
//! let config = CoreConfig::default();
//! let ffmpeg = resolve_tool(config.ffmpeg_path.as_deref(), "ffmpeg").unwrap();
//!
//! let reader = VideoInfoReader::new(ffmpeg, ProcessInvoker::new(config.tool_timeout));
//! let info = reader.read(Path::new("/path/to/movie.mkv"));
//! println!("{} video stream(s)", info.video_streams.len());
//!
//! let probe = HardwareProbe::new(config, EncoderTable::standard(), ProcessInvoker::default());
//! let result = probe.probe(HardwareEncoder::NvidiaHevc).unwrap();
//! println!("{}: usable = {}", result.label, result.usable);
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod hardware_encode;
pub mod media;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use external::{ProcessInvoker, ToolInvoker, ToolOutput, resolve_tool};
#[cfg(any(test, feature = "test-mocks"))]
pub use external::MockToolInvoker;
pub use hardware_encode::{
    EncoderFamily, EncoderProfile, EncoderTable, HardwareEncoder, HardwareProbe,
    HardwareProbeResult,
};
pub use media::{
    AudioStream, MusicInfo, MusicInfoReader, StreamKind, SubtitleStream, VideoInfo,
    VideoInfoReader, VideoStream, parse_music_info, parse_video_info,
};
pub use utils::format_duration;
