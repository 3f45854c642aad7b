use assert_cmd::Command;
use predicates::prelude::*;
use quakewatch_rs::{IntensityRecord, SensorSample};
use std::io::Write;

fn quakewatch() -> Command {
    Command::cargo_bin("quakewatch").unwrap()
}

/// Capture with 3 sensor samples, one noise byte, 1 intensity record and a truncated tail.
fn write_capture() -> tempfile::NamedTempFile {
    let mut bytes = Vec::new();
    for i in 0..3u64 {
        bytes.extend(
            SensorSample {
                device_timestamp_ms: 1_000 + i * 10,
                x: i as f32,
                y: 0.5,
                z: -0.5,
            }
            .to_wire(),
        );
    }
    bytes.push(0x58);
    bytes.extend(
        IntensityRecord {
            device_timestamp_ms: 1_050,
            intensity: 2.5,
            pga: 10.0,
        }
        .to_wire(),
    );
    bytes.extend_from_slice(&[0x53, 0x01, 0x02]);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();
    file
}

// =============================================================================
// GENERAL
// =============================================================================

#[test]
fn test_no_args_shows_help() {
    quakewatch()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag() {
    quakewatch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quakewatch"));
}

#[test]
fn test_help_flag() {
    quakewatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("seismic sensor"));
}

// =============================================================================
// REPLAY SUBCOMMAND
// =============================================================================

#[test]
fn test_replay_json_statistics() {
    let capture = write_capture();

    let output = quakewatch()
        .arg("replay")
        .arg("--file")
        .arg(capture.path())
        .arg("--json")
        .assert()
        .success()
        .code(0);

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["sensor_count"], 3);
    assert_eq!(parsed["intensity_count"], 1);
    assert_eq!(parsed["error_count"], 1);
    assert_eq!(parsed["unknown_tag_count"], 1);
    assert_eq!(parsed["first_timestamp_ms"], 1_000);
    assert_eq!(parsed["last_timestamp_ms"], 1_050);
    assert_eq!(parsed["span_ms"], 50);
}

#[test]
fn test_replay_emits_frames() {
    let capture = write_capture();
    let stats_file = tempfile::NamedTempFile::new().unwrap();

    let output = quakewatch()
        .arg("replay")
        .arg("--file")
        .arg(capture.path())
        .arg("--frames")
        .arg("--output")
        .arg(stats_file.path())
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let frames: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(frames.len(), 5);
    assert_eq!(frames[0]["type"], "sensor");
    assert_eq!(frames[3]["type"], "error");
    assert_eq!(frames[3]["error"], "unknown_tag");
    assert_eq!(frames[3]["tag"], 0x58);
    assert_eq!(frames[4]["type"], "intensity");
    assert_eq!(frames[4]["pga"], 10.0);

    let stats = std::fs::read_to_string(stats_file.path()).unwrap();
    assert!(stats.contains("Sensor packets: 3"));
    assert!(stats.contains("Data time span: 0.05 s"));
}

#[test]
fn test_replay_window_out() {
    let capture = write_capture();
    let dir = tempfile::tempdir().unwrap();
    let window_path = dir.path().join("window.json");

    quakewatch()
        .arg("replay")
        .arg("--file")
        .arg(capture.path())
        .arg("--window-out")
        .arg(&window_path)
        .assert()
        .success();

    let window: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&window_path).unwrap()).unwrap();
    assert_eq!(window["sensor"]["x"].as_array().unwrap().len(), 3);
    assert_eq!(window["intensity"]["intensity"][0], 2.5);
    assert_eq!(window["first_device_timestamp_ms"], 1_000);
}

#[test]
fn test_replay_missing_file() {
    quakewatch()
        .arg("replay")
        .arg("--file")
        .arg("/nonexistent/capture.bin")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

// =============================================================================
// MONITOR SUBCOMMAND
// =============================================================================

#[test]
fn test_monitor_unopenable_port() {
    quakewatch()
        .arg("monitor")
        .arg("--port")
        .arg("/dev/quakewatch-does-not-exist")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to open serial port"));
}

#[test]
fn test_monitor_rejects_zero_frames_per_refresh() {
    quakewatch()
        .arg("monitor")
        .arg("--port")
        .arg("/dev/quakewatch-does-not-exist")
        .arg("--frames-per-refresh")
        .arg("0")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid parameter"));
}
