use std::{path::PathBuf, process::Command};

fn waves_file() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/waves.de")
}

#[test]
fn plays_first_wave_and_prints_json_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_defense-evolution"))
        .arg("--waves")
        .arg(waves_file())
        .args(["--waves-to-play", "1", "--place", "5:7", "--summary-json"])
        .output()
        .expect("failed to launch defense-evolution CLI binary");

    assert!(output.status.success(), "CLI should exit successfully");
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should hold a JSON summary");
    assert_eq!(summary["waves_cleared"], 1);
    assert_eq!(summary["era"], "Ancient");
    assert_eq!(summary["shooters"], 1);
    assert!(summary["building_health"].as_u64().unwrap_or(0) <= 100);
}

#[test]
fn missing_wave_file_is_not_fatal() {
    let output = Command::new(env!("CARGO_BIN_EXE_defense-evolution"))
        .args(["--waves", "no/such/waves.de", "--summary-json"])
        .output()
        .expect("failed to launch defense-evolution CLI binary");

    assert!(output.status.success(), "missing waves fall back to an empty book");
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should hold a JSON summary");
    assert_eq!(summary["waves_cleared"], 0);
    assert_eq!(summary["gold"], 500);
}

#[test]
fn unreadable_balance_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_defense-evolution"))
        .args(["--balance", "no/such/balance.toml"])
        .output()
        .expect("failed to launch defense-evolution CLI binary");

    assert!(!output.status.success());
}
