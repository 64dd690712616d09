//! Integration tests for the `ccsbridge` binary.
//!
//! Argument parsing, local commands, config handling, and one-shot device
//! access against a wiremock stand-in for the conference controller.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command with every `CCSBRIDGE_*` variable cleared and config
/// directories pointed at `home`, so tests never touch a real setup.
fn ccsbridge_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ccsbridge");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("CCSBRIDGE_PROFILE")
        .env_remove("CCSBRIDGE_HOST")
        .env_remove("CCSBRIDGE_USERNAME")
        .env_remove("CCSBRIDGE_PASSWORD")
        .env_remove("CCSBRIDGE_POLL_INTERVAL")
        .env_remove("CCSBRIDGE_TIMEOUT")
        .env_remove("CCSBRIDGE_OUTPUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn write_config(home: &Path, contents: &str) {
    let dir = home.join(".config").join("ccsbridge");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), contents).unwrap();
}

async fn mock_device(sid: &str, speakers: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sid": sid })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/speakers"))
        .and(header("cookie", format!("sid={sid}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(speakers))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = ccsbridge_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    ccsbridge_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("watch")
                .and(predicate::str::contains("speakers"))
                .and(predicate::str::contains("describe")),
        );
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    ccsbridge_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Local commands ──────────────────────────────────────────────────

#[test]
fn test_describe_json_lists_surface() {
    let home = tempfile::tempdir().unwrap();
    let output = ccsbridge_cmd(home.path())
        .args(["describe", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let surface: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(surface["variables"][0]["id"], "active_mic");
    assert_eq!(surface["actions"].as_array().unwrap().len(), 2);
    assert_eq!(surface["feedbacks"].as_array().unwrap().len(), 3);
    assert_eq!(surface["config"][3]["id"], "poll_interval_ms");
}

#[test]
fn test_config_path_honours_xdg() {
    let home = tempfile::tempdir().unwrap();
    ccsbridge_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ccsbridge").and(predicate::str::contains("config.toml")));
}

#[test]
fn test_config_show_redacts_passwords() {
    let home = tempfile::tempdir().unwrap();
    write_config(
        home.path(),
        "default_profile = \"hall\"\n\n[profiles.hall]\nhost = \"10.0.0.5\"\nusername = \"chair\"\npassword = \"hunter2\"\n",
    );

    let output = ccsbridge_cmd(home.path())
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let cfg: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(cfg["default_profile"], "hall");
    assert_eq!(cfg["profiles"]["hall"]["host"], "10.0.0.5");
    assert_eq!(cfg["profiles"]["hall"]["poll_interval_ms"], 250);
    assert_ne!(cfg["profiles"]["hall"]["password"], "hunter2");
}

// ── Config validation ───────────────────────────────────────────────

#[test]
fn test_speakers_without_host_is_bad_config() {
    let home = tempfile::tempdir().unwrap();
    let output = ccsbridge_cmd(home.path())
        .env("CCSBRIDGE_PASSWORD", "pw")
        .args(["speakers", "--username", "chair"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Server IP is required"), "{text}");
}

#[test]
fn test_watch_reports_bad_config_status() {
    let home = tempfile::tempdir().unwrap();
    let output = ccsbridge_cmd(home.path())
        .env("CCSBRIDGE_PASSWORD", "pw")
        .args(["watch", "--host", "10.0.0.5"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bad config: Username is required"), "{stdout}");
}

#[test]
fn test_unknown_profile_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = ccsbridge_cmd(home.path())
        .args(["speakers", "--profile", "lobby"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("lobby"));
}

// ── Device access ───────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_speakers_marks_main_speaker() {
    let server = mock_device(
        "sid-9",
        json!([
            { "id": 12, "name": "Delegate 12", "prio": false },
            { "id": 1, "name": "Chair", "prio": true }
        ]),
    )
    .await;
    let home = tempfile::tempdir().unwrap();

    let output = ccsbridge_cmd(home.path())
        .env("CCSBRIDGE_PASSWORD", "pw")
        .args(["speakers", "-o", "json", "--username", "chair", "--host"])
        .arg(server.address().to_string())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let speakers: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        speakers,
        json!([
            { "id": 12, "name": "Delegate 12", "priority": false, "main": false },
            { "id": 1, "name": "Chair", "priority": true, "main": true }
        ])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_speakers_uses_profile_from_config_file() {
    let server = mock_device("sid-3", json!([{ "id": 4, "name": "Seat 4", "prio": false }])).await;
    let home = tempfile::tempdir().unwrap();
    write_config(
        home.path(),
        &format!(
            "default_profile = \"hall\"\n\n[profiles.hall]\nhost = \"{}\"\nusername = \"chair\"\npassword_env = \"HALL_PW\"\n",
            server.address()
        ),
    );

    ccsbridge_cmd(home.path())
        .env("HALL_PW", "pw")
        .args(["speakers", "-o", "plain"])
        .assert()
        .success()
        .stdout("4\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_login_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let output = ccsbridge_cmd(home.path())
        .env("CCSBRIDGE_PASSWORD", "wrong")
        .args(["speakers", "--username", "chair", "--host"])
        .arg(server.address().to_string())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}
