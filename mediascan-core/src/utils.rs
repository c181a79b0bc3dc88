//! Utility functions for ffmpeg timestamps.
//!
//! ffmpeg prints durations as `HH:MM:SS.fraction` with a variable number of
//! fractional digits (`00:42:08.576000000` in Matroska tags, `00:42:08.58` on
//! the container line).

use std::time::Duration;

/// Parses an ffmpeg timestamp into a [`Duration`].
///
/// Fractional digits beyond nanosecond precision are ignored. An hour count
/// too large to represent yields `None`.
#[must_use]
pub fn parse_ffmpeg_duration(time: &str) -> Option<Duration> {
    let parts: Vec<&str> = time.trim().split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours = parts[0].parse::<u64>().ok()?;
    let minutes = parts[1].parse::<u64>().ok()?;
    let (whole, fraction) = match parts[2].split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (parts[2], ""),
    };
    let seconds = whole.parse::<u64>().ok()?;
    if minutes >= 60 || seconds >= 60 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let nanos = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(9)
        .fold(0u32, |acc, digit| acc * 10 + u32::from(digit - b'0'));

    let total = hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)?;
    Some(Duration::new(total, nanos))
}

/// Formats a duration as HH:MM:SS.mmm (e.g. 3725.5s -> "01:02:05.500").
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    let millis = duration.subsec_millis();
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ffmpeg_duration() {
        assert_eq!(parse_ffmpeg_duration("00:00:00"), Some(Duration::ZERO));
        assert_eq!(parse_ffmpeg_duration("01:02:03"), Some(Duration::from_secs(3723)));
        assert_eq!(parse_ffmpeg_duration("00:00:01.25"), Some(Duration::from_millis(1250)));
        assert_eq!(parse_ffmpeg_duration(" 00:01:00.50 "), Some(Duration::from_millis(60_500)));

        // Invalid formats
        assert_eq!(parse_ffmpeg_duration(""), None);
        assert_eq!(parse_ffmpeg_duration("N/A"), None);
        assert_eq!(parse_ffmpeg_duration("00:00"), None);
        assert_eq!(parse_ffmpeg_duration("00:61:00"), None);
        assert_eq!(parse_ffmpeg_duration("aa:bb:cc"), None);
    }

    #[test]
    fn test_parse_ffmpeg_duration_hour_overflow() {
        assert_eq!(parse_ffmpeg_duration("6000000000000000:00:00"), None);
        assert_eq!(parse_ffmpeg_duration("99999999999999999:00:00.000000000"), None);
        assert_eq!(
            parse_ffmpeg_duration("5124095576030431:00:15"),
            Some(Duration::from_secs(5_124_095_576_030_431 * 3600 + 15))
        );
    }

    #[test]
    fn test_parse_ffmpeg_duration_long_fraction() {
        let duration = parse_ffmpeg_duration("00:42:08.576000000").unwrap();
        assert_eq!(duration.as_millis(), 2_528_576);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00:00.000");
        assert_eq!(format_duration(Duration::from_millis(3_725_500)), "01:02:05.500");
        assert_eq!(format_duration(Duration::from_secs(90_061)), "25:01:01.000");
    }
}
