// mediascan-core/tests/hardware_probe_tests.rs

use mediascan_core::external::MockToolInvoker;
use mediascan_core::{
    CoreConfig, CoreConfigBuilder, CoreError, EncoderProfile, EncoderTable, HardwareEncoder,
    HardwareProbe,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::{TempDir, tempdir};

fn fake_ffmpeg() -> Result<(TempDir, PathBuf), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let ffmpeg = tmp.path().join("ffmpeg");
    std::fs::write(&ffmpeg, "")?;
    Ok((tmp, ffmpeg))
}

fn test_config(ffmpeg: PathBuf) -> CoreConfig {
    CoreConfigBuilder::new()
        .ffmpeg_path(ffmpeg)
        .retry_delay(Duration::from_millis(20))
        .build()
}

#[test]
fn test_non_flagged_failure_is_not_retried() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, ffmpeg) = fake_ffmpeg()?;
    let mock = MockToolInvoker::new();
    mock.push_output(1, "");

    let probe = HardwareProbe::new(test_config(ffmpeg.clone()), EncoderTable::standard(), &mock);
    let result = probe.probe(HardwareEncoder::NvidiaHevc)?;

    assert!(!result.usable);
    assert_eq!(result.attempts, 1);
    assert_eq!(mock.call_count(), 1);

    let call = &mock.get_received_calls()[0];
    assert_eq!(call.command, ffmpeg);
    assert!(call.silent);
    let c_v = call.args.iter().position(|a| a == "-c:v").unwrap();
    assert_eq!(call.args[c_v + 1], "hevc_nvenc");
    assert_eq!(call.args[c_v + 2..], ["-f", "null", "-"]);
    Ok(())
}

#[test]
fn test_amf_first_failure_is_retried_once() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, ffmpeg) = fake_ffmpeg()?;
    let mock = MockToolInvoker::new();
    mock.push_output(1, "[h264_amf @ 0x55] DLL amfrt64.dll failed to open\n");
    mock.push_output(0, "");

    let probe = HardwareProbe::new(test_config(ffmpeg), EncoderTable::standard(), &mock);
    let started = Instant::now();
    let result = probe.probe(HardwareEncoder::AmdH264)?;

    assert!(result.usable);
    assert_eq!(result.attempts, 2);
    assert_eq!(result.output, "");
    assert_eq!(mock.call_count(), 2);
    assert!(started.elapsed() >= Duration::from_millis(20));
    Ok(())
}

#[test]
fn test_amf_second_result_is_final() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, ffmpeg) = fake_ffmpeg()?;
    let mock = MockToolInvoker::new();
    mock.push_output(1, "first");
    mock.push_output(1, "second");

    let probe = HardwareProbe::new(test_config(ffmpeg), EncoderTable::standard(), &mock);
    let result = probe.probe(HardwareEncoder::AmdHevc)?;

    assert!(!result.usable);
    assert_eq!(result.attempts, 2);
    assert_eq!(result.output, "second");
    assert_eq!(mock.call_count(), 2);
    Ok(())
}

#[test]
fn test_amf_success_needs_no_retry() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, ffmpeg) = fake_ffmpeg()?;
    let mock = MockToolInvoker::new();
    mock.push_output(0, "  \n");

    let probe = HardwareProbe::new(test_config(ffmpeg), EncoderTable::standard(), &mock);
    let result = probe.probe(HardwareEncoder::AmdHevc)?;
    assert!(result.usable, "whitespace-only output counts as clean");
    assert_eq!(result.attempts, 1);
    Ok(())
}

#[test]
fn test_exit_zero_with_error_text_is_unusable() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, ffmpeg) = fake_ffmpeg()?;
    let mock = MockToolInvoker::new();
    mock.push_output(0, "Device creation failed: -12.\n");

    let probe = HardwareProbe::new(test_config(ffmpeg), EncoderTable::standard(), &mock);
    let result = probe.probe(HardwareEncoder::VaapiH264)?;
    assert!(!result.usable);
    assert_eq!(result.output, "Device creation failed: -12.\n");
    Ok(())
}

#[test]
fn test_unresolvable_tool_makes_no_invocation() {
    let mock = MockToolInvoker::new();
    let config = CoreConfigBuilder::new()
        .ffmpeg_path(PathBuf::from("/no/such/dir/ffmpeg"))
        .build();

    let probe = HardwareProbe::new(config, EncoderTable::standard(), &mock);
    let results = probe.probe_all();

    assert_eq!(results.len(), 8);
    assert!(results.iter().all(|r| !r.usable && r.attempts == 0));
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_start_error_counts_as_unusable_attempt() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, ffmpeg) = fake_ffmpeg()?;
    let mock = MockToolInvoker::new();
    mock.push_start_error("exec format error");

    let probe = HardwareProbe::new(test_config(ffmpeg), EncoderTable::standard(), &mock);
    let result = probe.probe(HardwareEncoder::QsvH264)?;
    assert!(!result.usable);
    assert_eq!(result.attempts, 1);
    assert!(result.output.contains("exec format error"));
    Ok(())
}

#[test]
fn test_probe_all_runs_in_table_order() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, ffmpeg) = fake_ffmpeg()?;
    let mock = MockToolInvoker::new();
    // nvenc x2, amf x2 (each retried), qsv x2, vaapi x2
    mock.push_output(0, "")
        .push_output(0, "")
        .push_output(1, "")
        .push_output(1, "")
        .push_output(1, "")
        .push_output(1, "")
        .push_output(1, "")
        .push_output(1, "")
        .push_output(0, "")
        .push_output(0, "");

    let probe = HardwareProbe::new(test_config(ffmpeg), EncoderTable::standard(), &mock);
    let results = probe.probe_all();

    let encoders: Vec<_> = results.iter().map(|r| r.encoder).collect();
    assert_eq!(encoders, HardwareEncoder::ALL.to_vec());
    let attempts: Vec<_> = results.iter().map(|r| r.attempts).collect();
    assert_eq!(attempts, vec![1, 1, 2, 2, 1, 1, 1, 1]);
    let usable: Vec<_> = results.iter().map(|r| r.usable).collect();
    assert_eq!(usable, vec![true, true, false, false, false, false, true, true]);
    assert_eq!(mock.call_count(), 10);
    Ok(())
}

#[test]
fn test_custom_table_and_tags() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, ffmpeg) = fake_ffmpeg()?;
    let mock = MockToolInvoker::new();
    mock.push_output(1, "").push_output(0, "");

    let config = CoreConfigBuilder::new()
        .ffmpeg_path(ffmpeg)
        .retry_delay(Duration::ZERO)
        .transient_family_tags(["vaapi"])
        .build();
    let table = EncoderTable::new(
        7,
        vec![EncoderProfile::new(
            HardwareEncoder::VaapiHevc,
            "VAAPI H.265",
            &["hevc_vaapi", "-qp", "30"],
        )],
    );
    let probe = HardwareProbe::new(config, table, &mock);

    assert_eq!(probe.table().version(), 7);
    let result = probe.probe(HardwareEncoder::VaapiHevc)?;
    assert!(result.usable);
    assert_eq!(result.attempts, 2);

    assert!(matches!(
        probe.probe(HardwareEncoder::NvidiaH264),
        Err(CoreError::UnknownEncoder(_))
    ));
    Ok(())
}
