//! Binary startup tests: configuration failures must exit non-zero before
//! any socket is opened.

use std::io::Write;
use std::process::Command;

fn run_with_config(path: &std::path::Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_synthmon"))
        .arg(path)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run synthmon binary")
}

#[test]
fn test_malformed_config_exits_non_zero() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "monitoring_targets: [unclosed").unwrap();

    let output = run_with_config(file.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ParseError"), "stderr: {stderr}");
}

#[test]
fn test_invalid_config_exits_non_zero() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "monitoring_targets:\n  servers:\n    - name: dup\n      ip: 192.0.2.1\n    - name: dup\n      ip: 192.0.2.2"
    )
    .unwrap();

    let output = run_with_config(file.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate target name"), "stderr: {stderr}");
}

#[test]
fn test_missing_config_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_with_config(&dir.path().join("absent.yaml"));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("IoError"), "stderr: {stderr}");
}
