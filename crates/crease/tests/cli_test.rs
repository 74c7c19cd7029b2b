//! Integration tests for the `crease` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a backend; resource commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `crease` binary with env isolation.
///
/// Clears all `CREASE_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn crease_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("crease");
    cmd.env("HOME", "/tmp/crease-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/crease-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/crease-cli-test-nonexistent")
        .env_remove("CREASE_PROFILE")
        .env_remove("CREASE_BASE_URL")
        .env_remove("CREASE_TOKEN")
        .env_remove("CREASE_OUTPUT")
        .env_remove("CREASE_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || crease_cmd().args(args).output().unwrap())
        .await
        .unwrap()
}

fn against(server: &MockServer, rest: &[&str]) -> Vec<String> {
    let mut args = vec![
        "--base-url".to_owned(),
        server.uri(),
        "--token".to_owned(),
        "cli-token".to_owned(),
        "--retries".to_owned(),
        "0".to_owned(),
    ];
    args.extend(rest.iter().map(|s| (*s).to_owned()));
    args
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = crease_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    crease_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("teams")
            .and(predicate::str::contains("tournaments"))
            .and(predicate::str::contains("fixtures"))
            .and(predicate::str::contains("voting")),
    );
}

#[test]
fn test_version_flag() {
    crease_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("crease"));
}

#[test]
fn test_resource_help_lists_operations() {
    crease_cmd().args(["teams", "--help"]).assert().success().stdout(
        predicate::str::contains("list")
            .and(predicate::str::contains("search"))
            .and(predicate::str::contains("create"))
            .and(predicate::str::contains("delete")),
    );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    crease_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    crease_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = crease_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_list_without_base_url() {
    let output = crease_cmd().args(["teams", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("No base URL configured"));
}

#[test]
fn test_create_requires_payload() {
    let output = crease_cmd().args(["teams", "create"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unreachable_backend() {
    let output = crease_cmd()
        .args([
            "--base-url",
            "http://127.0.0.1:9",
            "--token",
            "t",
            "--retries",
            "0",
            "teams",
            "list",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_config_path() {
    crease_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Against a backend ───────────────────────────────────────────────

#[tokio::test]
async fn test_list_json_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game/teams/"))
        .and(header("authorization", "Bearer cli-token"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"results": [{"id": 1, "name": "Falcons"}, {"id": 2, "name": "Owls"}], "count": 9}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(against(&server, &["-o", "json", "teams", "list", "--limit", "2"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let listed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        listed,
        json!([{"id": 1, "name": "Falcons"}, {"id": 2, "name": "Owls"}])
    );
}

#[tokio::test]
async fn test_list_table_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game/sponsor/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 4, "name": "Acme", "website": null}])),
        )
        .mount(&server)
        .await;

    let output = run(against(&server, &["sponsors", "list"])).await;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("NAME") && stdout.contains("Acme"), "{stdout}");
}

#[tokio::test]
async fn test_search_sends_term() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game/player/"))
        .and(query_param("search", "koh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 18}])))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(against(&server, &["-o", "plain", "players", "search", "koh"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "18");
}

#[tokio::test]
async fn test_short_search_is_rejected() {
    let server = MockServer::start().await;
    let output = run(against(&server, &["players", "search", "k"])).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game/teams/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let output = run(against(&server, &["teams", "get", "99"])).await;
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test]
async fn test_create_prints_server_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/game/tournament/"))
        .and(body_json(json!({"name": "Summer Cup"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 3, "name": "Summer Cup"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = run(against(
        &server,
        &["-o", "json-compact", "tournaments", "create", "--data", r#"{"name":"Summer Cup"}"#],
    ))
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r#"{"id":3,"name":"Summer Cup"}"#
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("Tournament created successfully"));
}

#[tokio::test]
async fn test_create_validates_before_request() {
    let server = MockServer::start().await;
    let output = run(against(&server, &["voting", "create", "--data", r#"{"options": []}"#])).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Poll question is required"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_requires_yes_without_terminal() {
    let server = MockServer::start().await;
    let output = run(against(&server, &["teams", "delete", "3"])).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_with_yes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/game/teams/3/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(against(&server, &["--yes", "teams", "delete", "3"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test]
async fn test_unauthorized_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = run(against(&server, &["users", "list"])).await;
    assert_eq!(output.status.code(), Some(3));
}

#[tokio::test]
async fn test_delete_keeps_id_text() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/game/teams/007/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(against(&server, &["--yes", "teams", "delete", "007"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}
