use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("covid-dash").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("covid-dash"))
        .stdout(predicate::str::contains("summary"));
}

#[test]
fn unreachable_api_fails_cleanly() {
    let mut cmd = Command::cargo_bin("covid-dash").unwrap();
    cmd.args(["--api-url", "http://127.0.0.1:9", "--timeout", "2", "table"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("data unavailable"));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn summary_online_germany() {
    let mut cmd = Command::cargo_bin("covid-dash").unwrap();
    cmd.args(["summary", "--country", "de", "--metric", "deaths"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Germany"));
}
