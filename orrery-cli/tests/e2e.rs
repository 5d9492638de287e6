//! End-to-end tests for the orrery binary
//!
//! These build and run the CLI, so they are gated behind the `integration`
//! feature flag. Run with:
//!
//! ```sh
//! cargo test -p orrery-cli --features integration
//! ```

#![cfg(feature = "integration")]

use std::process::{Command, Output};

use tempfile::TempDir;

/// Run orrery with an isolated project config containing `config`.
fn orrery(args: &[&str], config: &str) -> (Output, TempDir) {
    let project = TempDir::new().expect("failed to create temp dir");
    std::fs::write(project.path().join("config.toml"), config).expect("failed to write config");

    let output = Command::new(env!("CARGO_BIN_EXE_orrery"))
        .args(args)
        .env("ORRERY_PROJECT_CONFIG_DIR", project.path())
        .env("XDG_CONFIG_HOME", project.path().join("xdg"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .output()
        .expect("failed to run orrery");
    (output, project)
}

const INSTANT_MOCK: &str = "[mock]\ndelay_ms = 0\n";

#[test]
fn orrery_help_works() {
    let (output, _dir) = orrery(&["--help"], "");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Browse AI model catalogs"));
    assert!(stdout.contains("models"));
    assert!(stdout.contains("sources"));
}

#[test]
fn config_show_works_without_config() {
    let (output, _dir) = orrery(&["config", "show"], "");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[catalog]"));
    assert!(stdout.contains("default_source = \"mock\""));
    assert!(stdout.contains("sort = \"name\""));
}

#[test]
fn config_show_reflects_project_config() {
    let (output, _dir) = orrery(&["config", "show"], "[catalog]\nsort = \"newest\"\n");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("sort = \"newest\""));
}

#[test]
fn config_path_shows_paths() {
    let (output, _dir) = orrery(&["config", "path"], "");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("User config:"));
    assert!(stdout.contains("Project config:"));
    assert!(stdout.contains("config.toml"));
}

#[test]
fn models_list_shows_mock_fixtures() {
    let (output, _dir) = orrery(&["models", "list"], INSTANT_MOCK);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("gemini-2.5-pro"));
    assert!(stdout.contains("imagen-3.0-generate-002"));
}

#[test]
fn models_list_json_filters_by_query() {
    let (output, _dir) = orrery(
        &["models", "list", "--json", "--query", "embedding"],
        INSTANT_MOCK,
    );

    assert!(output.status.success());
    let records: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let ids: Vec<&str> = records
        .as_array()
        .expect("array of records")
        .iter()
        .filter_map(|r| r["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["gemini-embedding-001"]);
}

#[test]
fn models_info_prints_details() {
    let (output, _dir) = orrery(&["models", "info", "veo-2.0-generate-001"], INSTANT_MOCK);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Veo 2"));
    assert!(stdout.contains("Category: Vision"));
}

#[test]
fn failing_mock_exits_with_user_message() {
    let (output, _dir) = orrery(&["models", "list"], "[mock]\ndelay_ms = 0\nfail = true\n");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Simulated fetch failure."));
}

#[test]
fn unknown_source_is_rejected() {
    let (output, _dir) = orrery(&["models", "list", "--source", "nope"], INSTANT_MOCK);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("source not found: nope"));
}
