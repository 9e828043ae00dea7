//! Command-line behaviour of the binaries

use std::io::Write;
use std::process::Command;

#[test]
fn test_navigator_without_url_prints_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_navigator"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("You need to specify a gigapan URL to open"));
}

#[test]
fn test_zero_calibration_sample_is_rejected() {
    for bin in [
        env!("CARGO_BIN_EXE_navigator"),
        env!("CARGO_BIN_EXE_listen_telemetry"),
    ] {
        let output = Command::new(bin)
            .args(["--calibration-sample", "0"])
            .output()
            .unwrap();

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("calibration-sample"), "{stderr}");
    }
}

#[test]
fn test_listen_telemetry_replays_capture() {
    let mut capture = tempfile::NamedTempFile::new().unwrap();
    capture
        .write_all(b"Orientation: 1.0 0.0 2.0\r\nOrientation: 1.0 0.0 2.0\r\nPot: 850\r\n")
        .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_listen_telemetry"))
        .arg("--replay")
        .arg(capture.path())
        .args(["--calibration-sample", "2"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pitch=   -2.00"), "{stdout}");
    assert!(stdout.contains("-- Calibrated"), "{stdout}");
    assert!(stdout.contains("pot= 850 zoom_rate=-1.000"), "{stdout}");
}
