//! CLI integration tests using assert_cmd
//!
//! These tests run the varaudit binary end-to-end, against a mock GitLab
//! instance where a network is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Get a command instance for the varaudit binary with a clean environment
fn varaudit_cmd() -> Command {
    let mut cmd = Command::cargo_bin("varaudit").expect("Failed to find varaudit binary");
    for var in [
        "GITLAB_URL",
        "GITLAB_TOKEN",
        "GITLAB_PAT",
        "VARAUDIT_KEY",
        "VARAUDIT_SEARCH",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

async fn mount(server: &MockServer, api_path: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(api_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn infra_server() -> MockServer {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api/v4/groups",
        json!([{"id": 1, "name": "infra", "path": "infra", "full_path": "infra"}]),
    )
    .await;
    mount(&server, "/api/v4/projects", json!([])).await;
    mount(&server, "/api/v4/groups/1/variables", json!([])).await;
    mount(&server, "/api/v4/groups/1/subgroups", json!([])).await;
    mount(
        &server,
        "/api/v4/groups/1/projects",
        json!([{"id": 10, "name": "vault-config", "path_with_namespace": "infra/vault-config"}]),
    )
    .await;
    mount(
        &server,
        "/api/v4/projects/10/variables",
        json!([{"key": "VAULT_URL", "value": "https://vault.prod.example.com"}]),
    )
    .await;
    server
}

#[test]
fn test_help_command() {
    varaudit_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "varaudit - GitLab CI/CD variable auditor",
        ));
}

#[test]
fn test_version_command() {
    varaudit_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("varaudit"));
}

#[test]
fn test_audit_help() {
    varaudit_cmd()
        .arg("audit")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Search group and project variables for a value",
        ))
        .stdout(predicate::str::contains("--skip-group-variables"));
}

#[test]
fn test_audit_requires_search() {
    varaudit_cmd()
        .arg("audit")
        .arg("--token")
        .arg("t")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--search"));
}

#[test]
fn test_audit_requires_token() {
    varaudit_cmd()
        .arg("audit")
        .arg("--search")
        .arg("prod")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No access token"));
}

#[test]
fn test_audit_rejects_empty_search() {
    varaudit_cmd()
        .args(["audit", "--search", "", "--token", "t"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Search string cannot be empty"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_audit_text_output() {
    let server = infra_server().await;

    varaudit_cmd()
        .args(["--quiet", "audit", "--search", "prod", "--delay-ms", "0"])
        .arg("--url")
        .arg(server.uri())
        .env("GITLAB_TOKEN", "secret-token")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Found 1 instance(s) of 'VAULT_URL' containing 'prod':",
        ))
        .stdout(predicate::str::contains(
            "- Group: infra, Project: infra/vault-config, Level: Project, Variable: VAULT_URL, Value: https://vault.prod.example.com",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_audit_json_to_file_with_redaction() {
    let server = infra_server().await;
    let out_dir = TempDir::new().expect("Failed to create temp dir");
    let out_path = out_dir.path().join("report.json");

    varaudit_cmd()
        .args(["--quiet", "audit", "--search", "prod", "--delay-ms", "0"])
        .args(["--format", "json", "--redact-values"])
        .arg("--url")
        .arg(server.uri())
        .arg("--output")
        .arg(&out_path)
        .env("GITLAB_PAT", "secret-token")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = fs::read_to_string(&out_path).expect("Failed to read report");
    let report: serde_json::Value = serde_json::from_str(&content).expect("Invalid JSON");
    assert_eq!(report["matches"][0]["project_path"], "infra/vault-config");
    assert_eq!(report["matches"][0]["value"], "***");
    assert_eq!(report["warnings"], json!([]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_audit_fails_when_top_level_listing_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    varaudit_cmd()
        .args(["--quiet", "audit", "--search", "prod", "--delay-ms", "0"])
        .arg("--url")
        .arg(server.uri())
        .env("GITLAB_TOKEN", "bad-token")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to list top-level groups"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_time_limit_stops_audit_with_partial_report() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api/v4/groups",
        json!([{"id": 1, "name": "infra", "path": "infra", "full_path": "infra"}]),
    )
    .await;
    mount(&server, "/api/v4/projects", json!([])).await;
    mount(
        &server,
        "/api/v4/groups/1/variables",
        json!([{"key": "VAULT_URL", "value": "https://vault.prod.example.com"}]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups/1/projects"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(100))
                .set_body_json(json!([{"id": 10, "path_with_namespace": "infra/app"}])),
        )
        .mount(&server)
        .await;

    let started = Instant::now();
    varaudit_cmd()
        .args(["--quiet", "audit", "--search", "prod", "--delay-ms", "0"])
        .args(["--pagination", "page", "--max-duration-secs", "1"])
        .arg("--url")
        .arg(server.uri())
        .env("GITLAB_TOKEN", "secret-token")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "- Group: infra, Project: (group level), Level: Group, Variable: VAULT_URL",
        ))
        .stdout(predicate::str::contains("Audit was interrupted"));

    // 1000 pages at 100 ms each would take far longer
    assert!(started.elapsed() < Duration::from_secs(20));
}
