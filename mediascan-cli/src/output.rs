// mediascan-cli/src/output.rs
//
// Human-readable terminal rendering. JSON output bypasses this module and
// goes straight through serde_json in the commands.

use console::style;
use mediascan_core::{HardwareProbeResult, MusicInfo, VideoInfo, format_duration};
use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

/// Section header: dashes, cyan.
pub fn print_section(title: &str) {
    println!("\n{}\n", style(format!("----- {} -----", title.to_uppercase())).cyan().bold());
}

/// Group header for one file.
pub fn print_file_header(path: &Path) {
    println!("\n{}", style(format!("────▶ {} ────", path.display())).magenta().bold());
}

pub fn print_info<T: Display>(label: &str, value: T) {
    println!("  {:<18} {}", format!("{}:", label), value);
}

pub fn print_error(message: &str) {
    println!("  {} {}", style("✗").red().bold(), style(message).red());
}

fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn duration_text(value: Option<Duration>) -> String {
    value.map_or_else(|| "-".to_string(), format_duration)
}

fn non_empty(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

pub fn print_video_info(path: &Path, info: &VideoInfo) {
    print_file_header(path);
    print_info("Container", non_empty(info.container.as_deref().unwrap_or_default()));
    print_info("Duration", duration_text(info.duration));
    print_info("Bitrate", or_dash(info.bitrate.map(|b| format!("{} kb/s", b))));

    for stream in &info.video_streams {
        println!("\n  {}", style(format!("Video #{} ({})", stream.type_index, stream.stream_id)).bold());
        print_info("Codec", non_empty(&stream.codec));
        let resolution = match (stream.width, stream.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            _ => "-".to_string(),
        };
        print_info("Resolution", resolution);
        print_info("Frame rate", or_dash(stream.frames_per_second.map(|f| format!("{:.3} fps", f))));
        print_info("Duration", duration_text(stream.duration));
        print_info("Bitrate", or_dash(stream.bitrate.map(|b| format!("{} b/s", b))));
    }

    for stream in &info.audio_streams {
        println!("\n  {}", style(format!("Audio #{} ({})", stream.type_index, stream.stream_id)).bold());
        print_info("Codec", non_empty(&stream.codec));
        print_info("Language", non_empty(&stream.language));
        print_info("Channels", or_dash(stream.channels));
        print_info("Sample rate", or_dash(stream.sample_rate.map(|r| format!("{} Hz", r))));
        if !stream.title.is_empty() {
            print_info("Title", &stream.title);
        }
        print_info("Duration", duration_text(stream.duration));
    }

    for stream in &info.subtitle_streams {
        println!("\n  {}", style(format!("Subtitle #{} ({})", stream.type_index, stream.stream_id)).bold());
        print_info("Codec", non_empty(&stream.codec));
        print_info("Language", non_empty(&stream.language));
        if !stream.title.is_empty() {
            print_info("Title", &stream.title);
        }
        if stream.forced {
            print_info("Forced", style("yes").yellow());
        }
    }
}

pub fn print_music_info(path: &Path, info: &MusicInfo) {
    print_file_header(path);
    print_info("Title", non_empty(&info.title));
    print_info("Album", non_empty(&info.album));
    print_info("Track", or_dash(info.track));
    print_info("Date", or_dash(info.date));
    print_info("Genres", non_empty(&info.genres.join(", ")));
    print_info("Language", non_empty(&info.language));
    print_info("Encoder", non_empty(&info.encoder));
    print_info("Duration", or_dash(info.duration.map(|s| format!("{} s", s))));
    print_info("Bitrate", or_dash(info.bitrate.map(|b| format!("{} kb/s", b))));
    print_info("Frequency", or_dash(info.frequency.map(|f| format!("{} Hz", f))));
    print_info("Channels", or_dash(info.channels));
}

pub fn print_probe_results(results: &[HardwareProbeResult]) {
    print_section("Hardware encoders");
    let mut current_family = None;
    for result in results {
        let family = result.encoder.family();
        if current_family != Some(family) {
            println!("  {}", style(family.label()).bold());
            current_family = Some(family);
        }
        let verdict = if result.usable {
            style("usable").green().bold().to_string()
        } else {
            style("unavailable").yellow().to_string()
        };
        println!(
            "    {:<18} {:<12} {} {}",
            format!("{}:", result.label),
            result.encoder.name(),
            verdict,
            style(format!("({} attempt{})", result.attempts, if result.attempts == 1 { "" } else { "s" })).dim()
        );
    }
}
