use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn ytscribe(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ytscribe").unwrap();
    cmd.env_remove("YTSCRIBE_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config);
    cmd
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("ytscribe")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("download"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn invalid_url_aborts_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    let out = dir.path().join("out");

    ytscribe(&config)
        .args(["--quiet", "download", "https://example.com/nothing-here", "-o"])
        .arg(&out)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid URL"))
        .stderr(predicate::str::contains("Nothing downloaded"));

    assert!(!out.exists());
    assert!(config.exists());
}

#[test]
fn config_persists_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");

    ytscribe(&config)
        .args(["config", "--format", "vtt", "--on-conflict", "append", "-l", "DE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved defaults"));

    ytscribe(&config)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output Format: vtt"))
        .stdout(predicate::str::contains("If File Exists: append"))
        .stdout(predicate::str::contains("Language: de"));
}

#[test]
fn config_rejects_bad_language() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");

    ytscribe(&config)
        .args(["config", "--language", "english"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("two-letter"));
}

#[test]
fn history_lists_and_clears_entries() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    fs_err::write(
        dir.path().join("recent_downloads.json"),
        r#"[{"title": "My Title", "url": "https://www.youtube.com/watch?v=abc", "file_path": "downloads/my_title.txt"}]"#,
    )
    .unwrap();

    ytscribe(&config)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("My Title"))
        .stdout(predicate::str::contains("downloads/my_title.txt"));

    ytscribe(&config)
        .args(["history", "--clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared"));

    ytscribe(&config)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No recent downloads."));
}
