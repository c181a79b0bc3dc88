//! Tag-oriented metadata for audio files.
//!
//! Music files carry most of their interesting data as container tags
//! (`title`, `album`, `track`, ...) which ffmpeg prints as `key : value`
//! lines under `Metadata:`. Unlike [`super::video_info`], this reader scans
//! line by line instead of per stream.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::StreamKind;
use super::extract::{BlockContext, CHANNELS};
use super::video_info::run_input_summary;
use crate::error::CoreResult;
use crate::external::ToolInvoker;
use crate::utils::parse_ffmpeg_duration;

static FREQUENCY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+) Hz").expect("valid frequency pattern"));

/// Metadata read from a music file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MusicInfo {
    pub language: String,
    pub track: Option<u32>,
    pub title: String,
    pub album: String,
    pub date: Option<NaiveDate>,
    pub genres: Vec<String>,
    pub encoder: String,
    /// Whole seconds.
    pub duration: Option<u64>,
    /// kb/s
    pub bitrate: Option<u64>,
    /// Sample rate in Hz.
    pub frequency: Option<u32>,
    pub channels: Option<f32>,
}

/// Reads [`MusicInfo`] for files using a given ffmpeg executable.
pub struct MusicInfoReader<I: ToolInvoker> {
    ffmpeg: PathBuf,
    invoker: I,
}

impl<I: ToolInvoker> MusicInfoReader<I> {
    pub fn new(ffmpeg: impl Into<PathBuf>, invoker: I) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            invoker,
        }
    }

    /// Reads the file, logging any hard failure and returning an empty
    /// [`MusicInfo`] in that case.
    pub fn read(&self, input: &Path) -> MusicInfo {
        self.try_read(input).unwrap_or_else(|e| {
            log::error!("Failed to read audio information for {}: {}", input.display(), e);
            MusicInfo::default()
        })
    }

    pub fn try_read(&self, input: &Path) -> CoreResult<MusicInfo> {
        let output = run_input_summary(&self.ffmpeg, &self.invoker, input)?;
        log::debug!("Music information for {}:\n{}", input.display(), output);
        Ok(parse_music_info(&output))
    }
}

/// Parses ffmpeg's input summary of an audio file.
///
/// The first occurrence of each tag wins, except that a `Retail Date`
/// always replaces a year-only `Date`.
#[must_use]
pub fn parse_music_info(output: &str) -> MusicInfo {
    let mut info = MusicInfo::default();

    for line in output.lines() {
        if let Some((key, value)) = split_tag(line) {
            apply_tag(&mut info, &key, value);
        }

        if info.bitrate.is_none() {
            info.bitrate = bitrate_fragment(line);
        }
        if info.frequency.is_none() {
            info.frequency = FREQUENCY
                .captures(line)
                .and_then(|caps| caps[1].parse().ok());
        }
        if info.channels.is_none() && line.contains(" Audio: ") {
            let header = line.trim();
            let ctx = BlockContext {
                kind: StreamKind::Audio,
                header,
                block: header,
                full_text: output,
            };
            info.channels = CHANNELS.extract(&ctx);
        }
    }

    info
}

/// Splits `key : value`; the colon must not be the first character.
fn split_tag(line: &str) -> Option<(String, &str)> {
    let colon = line.find(':')?;
    if colon < 1 {
        return None;
    }
    let key = line[..colon].trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_ascii_lowercase(), line[colon + 1..].trim()))
}

fn apply_tag(info: &mut MusicInfo, key: &str, value: &str) {
    match key {
        "language" => set_text(&mut info.language, value),
        "title" => set_text(&mut info.title, value),
        "album" => set_text(&mut info.album, value),
        "encoder" => set_text(&mut info.encoder, value),
        "track" => {
            if info.track.is_none() {
                info.track = leading_integer(value);
            }
        }
        "date" => {
            if info.date.is_none() {
                info.date = leading_integer(value)
                    .filter(|_| value.len() == 4)
                    .and_then(|year| NaiveDate::from_ymd_opt(year as i32, 1, 1))
                    .or_else(|| parse_full_date(value));
            }
        }
        "retail date" => {
            if let Some(date) = parse_full_date(value) {
                info.date = Some(date);
            }
        }
        "genre" => {
            if info.genres.is_empty() {
                info.genres = value
                    .split([';', '/', ','])
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }
        "duration" => {
            if info.duration.is_none() {
                let value = value.split(',').next().unwrap_or_default();
                info.duration = parse_ffmpeg_duration(value).map(|d| d.as_secs());
            }
        }
        _ => {}
    }
}

fn set_text(field: &mut String, value: &str) {
    if field.is_empty() {
        *field = value.to_string();
    }
}

/// "3/12" -> 3
fn leading_integer(value: &str) -> Option<u32> {
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn parse_full_date(value: &str) -> Option<NaiveDate> {
    let value = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// `bitrate: 320 kb/s` anywhere on the line.
fn bitrate_fragment(line: &str) -> Option<u64> {
    let start = line.find("bitrate:")? + "bitrate:".len();
    let rest = line[start..].trim();
    rest[..rest.find(' ')?].parse().ok()
}
