//! Splitting ffmpeg's input summary into per-stream blocks.
//!
//! A block starts at a line beginning with `Stream #<n>:<m>` and runs up to
//! the next such line or the end of the text, so a stream's `Metadata:`
//! section (title, DURATION, BPS tags) stays with its header.
//!
//! ```text
//!   Stream #0:0(eng): Video: h264 (High), yuv420p, 1920x1080 [SAR 1:1 DAR 16:9], 23.98 fps
//!     Metadata:
//!       DURATION        : 00:42:08.576000000
//!   Stream #0:1(eng): Audio: dts (DTS), 48000 Hz, stereo, fltp, 1536 kb/s (default)
//! ```

use once_cell::sync::Lazy;
use regex::{Match, Matches, Regex};
use std::iter::Peekable;

use super::StreamKind;

static STREAM_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*Stream #(\d+:\d+)").expect("valid stream header pattern"));

/// One stream's slice of the tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamBlock<'a> {
    /// Position of this header among every header in the text, including
    /// headers whose block was dropped as unknown.
    pub index: usize,
    /// Stream id as printed, e.g. "0:1".
    pub stream_id: &'a str,
    pub kind: StreamKind,
    /// The block text, starting at its header line.
    pub text: &'a str,
}

impl<'a> StreamBlock<'a> {
    /// The header line (`Stream #0:1(eng): Audio: ...`).
    #[must_use]
    pub fn header(&self) -> &'a str {
        self.text.lines().next().unwrap_or_default().trim()
    }
}

/// Lazy iterator over the classified blocks of a text.
///
/// Blocks that carry no video, audio or subtitle marker (data and
/// attachment streams, for instance) are skipped.
pub struct StreamBlocks<'a> {
    text: &'a str,
    headers: Peekable<Matches<'static, 'a>>,
    position: usize,
}

impl<'a> Iterator for StreamBlocks<'a> {
    type Item = StreamBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let header = self.headers.next()?;
            let end = self.headers.peek().map_or(self.text.len(), Match::start);
            let index = self.position;
            self.position += 1;

            let text = &self.text[header.start()..end];
            let kind = classify(text);
            if kind == StreamKind::Unknown {
                log::debug!("Skipping stream block without a known type: {}", first_line(text));
                continue;
            }

            let stream_id = STREAM_HEADER
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map_or("", |m| m.as_str());

            return Some(StreamBlock {
                index,
                stream_id,
                kind,
                text,
            });
        }
    }
}

/// Splits the full tool output into classified stream blocks, in order.
#[must_use]
pub fn segment(text: &str) -> StreamBlocks<'_> {
    StreamBlocks {
        text,
        headers: STREAM_HEADER.find_iter(text).peekable(),
        position: 0,
    }
}

/// Classifies a block by the first of ` Video: `, ` Audio: `, ` Subtitle: `
/// found on its header line.
///
/// Only the header line is inspected so that a metadata value such as
/// `title : Audio: Commentary` cannot re-classify a subtitle block.
#[must_use]
pub fn classify(block: &str) -> StreamKind {
    let header = first_line(block);
    if header.contains(" Video: ") {
        StreamKind::Video
    } else if header.contains(" Audio: ") {
        StreamKind::Audio
    } else if header.contains(" Subtitle: ") {
        StreamKind::Subtitle
    } else {
        StreamKind::Unknown
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
