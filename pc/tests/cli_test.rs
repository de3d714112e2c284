//! CLI tests for the `pc` binary in template-only mode

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `pc` with no API key, isolated home/config/data directories and cwd
fn pc(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pc").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    pc(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("code-prompt"))
        .stdout(predicate::str::contains("build-prompt"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_code_prompt_uses_template_without_key() {
    let home = TempDir::new().unwrap();
    pc(&home)
        .args(["code-prompt", "A marketplace where users pay to rent camping gear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project Overview"))
        .stdout(predicate::str::contains("Stripe"));
}

#[test]
fn test_code_prompt_json_with_pitch_file() {
    let home = TempDir::new().unwrap();
    let pitch = home.path().join("pitch.json");
    std::fs::write(&pitch, r#"{"name": "CampShare", "elevator": "Airbnb for tents."}"#).unwrap();

    pc(&home)
        .args(["code-prompt", "A marketplace for renting camping gear", "--format", "json", "--pitch-file"])
        .arg(&pitch)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"summary\": \"Airbnb for tents.\""))
        .stdout(predicate::str::contains("\"generatedAt\""));
}

#[test]
fn test_pitch_file_is_validated() {
    let home = TempDir::new().unwrap();
    let pitch = home.path().join("pitch.json");
    std::fs::write(&pitch, r#"{"name": 5, "slides": "one"}"#).unwrap();

    pc(&home)
        .args(["code-prompt", "A marketplace for renting camping gear", "--pitch-file"])
        .arg(&pitch)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pitch name must be a string"))
        .stderr(predicate::str::contains("Slides must be an array"));
}

#[test]
fn test_build_prompt_reports_character_count() {
    let home = TempDir::new().unwrap();
    pc(&home)
        .args(["build-prompt", "A chat app for neighbours to share tools"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Setup steps:"))
        .stdout(predicate::str::contains("characters"));
}

#[test]
fn test_short_idea_fails_with_details() {
    let home = TempDir::new().unwrap();
    pc(&home)
        .args(["code-prompt", "Short"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Idea must be at least 10 characters long"));
}

#[test]
fn test_pitch_without_key_is_config_error() {
    let home = TempDir::new().unwrap();
    pc(&home)
        .args(["pitch", "A marketplace for renting camping gear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not configured"));
}

#[test]
fn test_history_requires_storage() {
    let home = TempDir::new().unwrap();
    pc(&home)
        .arg("history")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not enabled"));
}

#[test]
fn test_history_with_config_file() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("pc.yml");
    std::fs::write(
        &config,
        format!("storage:\n  enabled: true\n  path: {}\n", home.path().join("store").display()),
    )
    .unwrap();

    pc(&home)
        .arg("--config")
        .arg(&config)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Page 1 of 1 (0 pitches)"));
}
