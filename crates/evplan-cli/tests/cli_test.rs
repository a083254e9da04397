//! End-to-end tests for the `evplan` binary.
//!
//! Each test runs the built binary with an isolated HOME and data directory,
//! pointing the generative endpoint at a local `MockEndpoint` when needed.

use std::path::Path;
use std::process::Output;

use tempfile::TempDir;
use tokio::process::Command;

use evplan_test_utils::{MIA_REPLY, MockEndpoint};

/// Run `evplan` with `args`, isolated under `home`.
async fn evplan(home: &Path, envs: &[(&str, &str)], args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_evplan"));
    cmd.env_clear()
        .env("HOME", home)
        .env("PATH", std::env::var("PATH").unwrap_or_default())
        .env("EVPLAN_DATA_DIR", home.join("data"))
        .args(args);
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd.output().await.expect("failed to run evplan binary")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[tokio::test]
async fn list_on_fresh_install_is_empty() {
    let home = TempDir::new().unwrap();
    let out = evplan(home.path(), &[], &["list"]).await;
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("No event plans yet"));
}

#[tokio::test]
async fn new_without_api_key_points_at_init() {
    let home = TempDir::new().unwrap();
    let out = evplan(
        home.path(),
        &[],
        &["new", "--name", "Mia", "--age", "7", "--event", "Birthday"],
    )
    .await;
    assert!(!out.status.success());
    assert!(stderr(&out).contains("evplan init"), "stderr: {}", stderr(&out));
}

#[tokio::test]
async fn new_with_blank_field_fails_before_network() {
    let home = TempDir::new().unwrap();
    let mock = MockEndpoint::with_text(MIA_REPLY).await;
    let base_url = mock.base_url();
    let out = evplan(
        home.path(),
        &[("EVPLAN_API_BASE_URL", &base_url)],
        &["--api-key", "k", "new", "--name", "Mia", "--age", " ", "--event", "Birthday"],
    )
    .await;
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Please fill in all fields."));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn new_then_list_show_delete() {
    let home = TempDir::new().unwrap();
    let mock = MockEndpoint::with_text(MIA_REPLY).await;
    let base_url = mock.base_url();
    let envs = [("EVPLAN_API_BASE_URL", base_url.as_str()), ("EVPLAN_API_KEY", "test-key")];

    let out = evplan(
        home.path(),
        &envs,
        &[
            "new", "--name", "Mia", "--age", "7", "--gender", "female", "--event", "Birthday",
        ],
    )
    .await;
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Cleanup"), "new prints the full card");
    assert_eq!(mock.request_count(), 1);
    let req = mock.last_request().unwrap();
    assert_eq!(req.query.as_deref(), Some("key=test-key"));

    let out = evplan(home.path(), &envs, &["list"]).await;
    let listing = stdout(&out);
    assert!(listing.contains("Mia ("));
    assert!(listing.contains("... 2 more"));

    // Pull the id out of "Mia (<id>)".
    let start = listing.find("Mia (").unwrap() + "Mia (".len();
    let end = start + listing[start..].find(')').unwrap();
    let id = &listing[start..end];

    let out = evplan(home.path(), &envs, &["show", id, "--expanded"]).await;
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Cleanup"));

    let out = evplan(home.path(), &envs, &["delete", id]).await;
    assert!(stdout(&out).contains(&format!("Deleted plan {id}")));
    let out = evplan(home.path(), &envs, &["delete", id]).await;
    assert!(out.status.success());
    assert!(stdout(&out).contains("nothing deleted"));

    let out = evplan(home.path(), &envs, &["list"]).await;
    assert!(stdout(&out).contains("No event plans yet"));
}

#[tokio::test]
async fn upstream_failure_reports_generic_message() {
    let home = TempDir::new().unwrap();
    let mock = MockEndpoint::with_status(500).await;
    let base_url = mock.base_url();
    let out = evplan(
        home.path(),
        &[("EVPLAN_API_BASE_URL", &base_url), ("EVPLAN_API_KEY", "k")],
        &["new", "--name", "Mia", "--age", "7", "--event", "Birthday"],
    )
    .await;
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Failed to generate plan. Please try again."));

    let out = evplan(home.path(), &[], &["list"]).await;
    assert!(stdout(&out).contains("No event plans yet"));
}

#[tokio::test]
async fn init_writes_config_used_by_later_commands() {
    let home = TempDir::new().unwrap();
    let out = evplan(home.path(), &[], &["init", "--api-key", "from-config-file"]).await;
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(home.path().join(".config/evplan/config.toml").exists());

    let out = evplan(home.path(), &[], &["init"]).await;
    assert!(!out.status.success());
    assert!(stderr(&out).contains("--force"));

    let mock = MockEndpoint::with_text(MIA_REPLY).await;
    let base_url = mock.base_url();
    let out = evplan(
        home.path(),
        &[("EVPLAN_API_BASE_URL", &base_url)],
        &["new", "--name", "Mia", "--age", "7", "--event", "Birthday"],
    )
    .await;
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        mock.last_request().unwrap().query.as_deref(),
        Some("key=from-config-file")
    );
}

#[tokio::test]
async fn completions_are_printed() {
    let home = TempDir::new().unwrap();
    let out = evplan(home.path(), &[], &["completions", "bash"]).await;
    assert!(out.status.success());
    assert!(stdout(&out).contains("evplan"));
}
