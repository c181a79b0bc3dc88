//! Hardware encoder capability probing.
//!
//! Whether ffmpeg was built with `hevc_nvenc` says nothing about whether the
//! machine has a working GPU and driver for it. The only reliable answer is a
//! trial encode: one black frame through the encoder into the null muxer.
//! The encoder is usable iff ffmpeg exits 0 and prints nothing at
//! `-loglevel error`.
//!
//! AMD's AMF back-end reports failure on a cold first invocation and succeeds
//! right after. Encoders whose trial parameters carry one of the configured
//! transient family tags get exactly one retry after a fixed blocking delay;
//! every other encoder gets a single attempt.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::thread;

use crate::config::{CoreConfig, DEFAULT_TOOL_NAME};
use crate::error::{CoreError, CoreResult};
use crate::external::{ToolInvoker, resolve_tool};

/// Vendor back-end an encoder belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EncoderFamily {
    Nvidia,
    Amd,
    Qsv,
    Vaapi,
}

impl EncoderFamily {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            EncoderFamily::Nvidia => "NVIDIA",
            EncoderFamily::Amd => "AMD",
            EncoderFamily::Qsv => "Intel QSV",
            EncoderFamily::Vaapi => "VAAPI",
        }
    }
}

/// Hardware encoders that can be probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HardwareEncoder {
    NvidiaH264,
    NvidiaHevc,
    AmdH264,
    AmdHevc,
    QsvH264,
    QsvHevc,
    VaapiH264,
    VaapiHevc,
}

impl HardwareEncoder {
    pub const ALL: [HardwareEncoder; 8] = [
        HardwareEncoder::NvidiaH264,
        HardwareEncoder::NvidiaHevc,
        HardwareEncoder::AmdH264,
        HardwareEncoder::AmdHevc,
        HardwareEncoder::QsvH264,
        HardwareEncoder::QsvHevc,
        HardwareEncoder::VaapiH264,
        HardwareEncoder::VaapiHevc,
    ];

    #[must_use]
    pub fn family(self) -> EncoderFamily {
        match self {
            HardwareEncoder::NvidiaH264 | HardwareEncoder::NvidiaHevc => EncoderFamily::Nvidia,
            HardwareEncoder::AmdH264 | HardwareEncoder::AmdHevc => EncoderFamily::Amd,
            HardwareEncoder::QsvH264 | HardwareEncoder::QsvHevc => EncoderFamily::Qsv,
            HardwareEncoder::VaapiH264 | HardwareEncoder::VaapiHevc => EncoderFamily::Vaapi,
        }
    }

    /// Command-line name, e.g. `nvidia-hevc`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            HardwareEncoder::NvidiaH264 => "nvidia-h264",
            HardwareEncoder::NvidiaHevc => "nvidia-hevc",
            HardwareEncoder::AmdH264 => "amd-h264",
            HardwareEncoder::AmdHevc => "amd-hevc",
            HardwareEncoder::QsvH264 => "qsv-h264",
            HardwareEncoder::QsvHevc => "qsv-hevc",
            HardwareEncoder::VaapiH264 => "vaapi-h264",
            HardwareEncoder::VaapiHevc => "vaapi-hevc",
        }
    }

    /// ffmpeg encoder id, e.g. `hevc_nvenc`.
    #[must_use]
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            HardwareEncoder::NvidiaH264 => "h264_nvenc",
            HardwareEncoder::NvidiaHevc => "hevc_nvenc",
            HardwareEncoder::AmdH264 => "h264_amf",
            HardwareEncoder::AmdHevc => "hevc_amf",
            HardwareEncoder::QsvH264 => "h264_qsv",
            HardwareEncoder::QsvHevc => "hevc_qsv",
            HardwareEncoder::VaapiH264 => "h264_vaapi",
            HardwareEncoder::VaapiHevc => "hevc_vaapi",
        }
    }
}

impl fmt::Display for HardwareEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HardwareEncoder {
    type Err = CoreError;

    /// Accepts `nvidia-hevc`, `nvidia_hevc` or the ffmpeg id `hevc_nvenc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        HardwareEncoder::ALL
            .into_iter()
            .find(|e| e.name() == wanted || e.ffmpeg_encoder().replace('_', "-") == wanted)
            .ok_or_else(|| CoreError::UnknownEncoder(s.to_string()))
    }
}

/// Trial parameters for one encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncoderProfile {
    pub encoder: HardwareEncoder,
    pub label: String,
    pub family: EncoderFamily,
    /// Everything that follows `-c:v` in the trial command.
    pub params: Vec<String>,
}

impl EncoderProfile {
    pub fn new(encoder: HardwareEncoder, label: &str, params: &[&str]) -> Self {
        Self {
            encoder,
            label: label.to_string(),
            family: encoder.family(),
            params: params.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    /// True when any trial parameter contains any of `tags`.
    #[must_use]
    pub fn carries_tag(&self, tags: &[String]) -> bool {
        self.params
            .iter()
            .any(|param| tags.iter().any(|tag| param.contains(tag.as_str())))
    }
}

/// The encoder → trial parameter table handed to [`HardwareProbe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderTable {
    version: u32,
    profiles: Vec<EncoderProfile>,
}

impl EncoderTable {
    /// Version of the parameters in [`EncoderTable::standard`].
    pub const STANDARD_VERSION: u32 = 1;

    #[must_use]
    pub fn new(version: u32, profiles: Vec<EncoderProfile>) -> Self {
        Self { version, profiles }
    }

    /// The stock table covering every [`HardwareEncoder`].
    #[must_use]
    pub fn standard() -> Self {
        use HardwareEncoder::*;
        Self::new(
            Self::STANDARD_VERSION,
            vec![
                EncoderProfile::new(NvidiaH264, "NVIDIA H.264", &["h264_nvenc"]),
                EncoderProfile::new(NvidiaHevc, "NVIDIA H.265", &["hevc_nvenc"]),
                EncoderProfile::new(AmdH264, "AMD H.264", &["h264_amf"]),
                EncoderProfile::new(AmdHevc, "AMD H.265", &["hevc_amf"]),
                EncoderProfile::new(QsvH264, "Intel QSV H.264", &["h264_qsv"]),
                EncoderProfile::new(
                    QsvHevc,
                    "Intel QSV H.265",
                    &["hevc_qsv", "-global_quality", "28", "-load_plugin", "hevc_hw"],
                ),
                EncoderProfile::new(VaapiH264, "VAAPI H.264", &["h264_vaapi"]),
                EncoderProfile::new(VaapiHevc, "VAAPI H.265", &["hevc_vaapi"]),
            ],
        )
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn profiles(&self) -> &[EncoderProfile] {
        &self.profiles
    }

    #[must_use]
    pub fn get(&self, encoder: HardwareEncoder) -> Option<&EncoderProfile> {
        self.profiles.iter().find(|p| p.encoder == encoder)
    }
}

/// Outcome of probing one encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HardwareProbeResult {
    pub encoder: HardwareEncoder,
    pub label: String,
    pub usable: bool,
    /// What the last trial encode printed; kept for diagnostics.
    pub output: String,
    /// Trial encodes run: 0 when ffmpeg could not be resolved.
    pub attempts: u32,
}

/// Runs trial encodes to decide whether hardware encoders work here.
pub struct HardwareProbe<I: ToolInvoker> {
    config: CoreConfig,
    table: EncoderTable,
    invoker: I,
}

impl<I: ToolInvoker> HardwareProbe<I> {
    pub fn new(config: CoreConfig, table: EncoderTable, invoker: I) -> Self {
        Self {
            config,
            table,
            invoker,
        }
    }

    pub fn table(&self) -> &EncoderTable {
        &self.table
    }

    /// Probes one encoder. Fails only if the encoder has no table entry.
    pub fn probe(&self, encoder: HardwareEncoder) -> CoreResult<HardwareProbeResult> {
        let profile = self
            .table
            .get(encoder)
            .ok_or_else(|| CoreError::UnknownEncoder(encoder.to_string()))?;
        Ok(self.probe_profile(profile))
    }

    /// Probes every table entry in table order, one after another.
    pub fn probe_all(&self) -> Vec<HardwareProbeResult> {
        self.table
            .profiles()
            .iter()
            .map(|profile| self.probe_profile(profile))
            .collect()
    }

    fn probe_profile(&self, profile: &EncoderProfile) -> HardwareProbeResult {
        let mut result = HardwareProbeResult {
            encoder: profile.encoder,
            label: profile.label.clone(),
            usable: false,
            output: String::new(),
            attempts: 0,
        };

        let ffmpeg = match resolve_tool(self.config.ffmpeg_path.as_deref(), DEFAULT_TOOL_NAME) {
            Ok(path) => path,
            Err(e) => {
                log::error!("FFMpeg tool not found: {}", e);
                result.output = e.to_string();
                return result;
            }
        };

        let (mut usable, mut output) = self.trial_encode(&ffmpeg, profile);
        result.attempts = 1;

        if !usable && profile.carries_tag(&self.config.transient_family_tags) {
            log::info!(
                "{} failed its first trial encode, retrying once in {:?}",
                profile.label,
                self.config.retry_delay
            );
            thread::sleep(self.config.retry_delay);
            (usable, output) = self.trial_encode(&ffmpeg, profile);
            result.attempts = 2;
        }

        if usable {
            log::info!("{} ({}) is usable", profile.label, profile.encoder.ffmpeg_encoder());
        }
        result.usable = usable;
        result.output = output;
        result
    }

    /// One trial encode; returns (usable, captured text).
    fn trial_encode(&self, ffmpeg: &Path, profile: &EncoderProfile) -> (bool, String) {
        let args = trial_args(profile);
        match self.invoker.execute(ffmpeg, &args, true) {
            Ok(out) => {
                let usable = out.exit_code == 0 && !out.timed_out && out.output.trim().is_empty();
                if !usable {
                    log::warn!(
                        "Can't process '{}' (exit code {}): {}",
                        profile.params.join(" "),
                        out.exit_code,
                        out.output.trim()
                    );
                }
                (usable, out.output)
            }
            Err(e) => {
                log::warn!("Can't process '{}': {}", profile.params.join(" "), e);
                (false, e.to_string())
            }
        }
    }
}

/// `-loglevel error -f lavfi -i color=black:s=1080x1080 -vframes 1 -an -c:v <params> -f null -`
#[must_use]
pub fn trial_args(profile: &EncoderProfile) -> Vec<String> {
    let mut args: Vec<String> = [
        "-loglevel",
        "error",
        "-f",
        "lavfi",
        "-i",
        "color=black:s=1080x1080",
        "-vframes",
        "1",
        "-an",
        "-c:v",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect();
    args.extend(profile.params.iter().cloned());
    args.extend(["-f", "null", "-"].iter().map(|s| (*s).to_string()));
    args
}
