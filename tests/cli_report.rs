use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_monthly_csv(dir: &Path) -> String {
    let mut csv = String::from("지역,날짜,기준금리,평균가격\n");
    for month in 1..=12 {
        let rate = 0.5 + month as f64 * 0.25;
        csv.push_str(&format!("서울,2023-{month:02},{rate},{}\n", 900.0 - 40.0 * rate));
    }
    let path = dir.join("monthly.csv");
    fs::write(&path, csv).unwrap();
    path.to_string_lossy().into_owned()
}

fn ratedash(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ratedash").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_report_prints_prediction() {
    let home = TempDir::new().unwrap();
    let data = write_monthly_csv(home.path());
    let log = home.path().join("logs").join("ratedash.log");

    let output = ratedash(&home)
        .args(["--report", "--data", &data, "--granularity", "monthly"])
        .args(["--degree", "1", "--rate", "2.0"])
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["region"], "서울");
    let predicted = json["prediction"]["predicted_price"].as_f64().unwrap();
    assert!((predicted - 790.0).abs() < 1e-6);
    assert!(log.exists());
}

#[test]
fn test_report_survives_unwritable_log_file() {
    let home = TempDir::new().unwrap();
    let data = write_monthly_csv(home.path());
    // a regular file where the log directory should be
    let blocker = home.path().join("not-a-dir");
    fs::write(&blocker, "").unwrap();

    ratedash(&home)
        .args(["--report", "--data", &data, "--granularity", "monthly"])
        .arg("--log-file")
        .arg(blocker.join("ratedash.log"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"region\": \"서울\""))
        .stderr(predicate::str::contains("log file unavailable"));
}

#[test]
fn test_report_rejects_unknown_region() {
    let home = TempDir::new().unwrap();
    let data = write_monthly_csv(home.path());

    ratedash(&home)
        .args(["--report", "--data", &data, "--region", "제주"])
        .arg("--log-file")
        .arg(home.path().join("ratedash.log"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown region"));
}
