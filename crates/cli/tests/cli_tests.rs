//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("headliner")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn fixture_url(name: &str) -> String {
    let path = std::fs::canonicalize(get_fixture_path(name)).unwrap();
    format!("file://{}", path.display())
}

fn log_files(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.file_name().to_string_lossy().into_owned()).collect())
        .unwrap_or_default()
}

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--article-query"))
        .stdout(predicate::str::contains("--max-retries"));
}

#[test]
fn test_cli_version() {
    cmd().arg("--version").assert().success().stdout(predicate::str::contains("headliner"));
}

#[test]
fn test_cli_completions() {
    cmd()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("headliner"));
}

#[test]
fn test_cli_local_listing() {
    let tmp = TempDir::new().unwrap();
    let xlsx = tmp.path().join("articles.xlsx");
    let text = tmp.path().join("articles.txt");
    let logs = tmp.path().join("logs");

    cmd()
        .args(["--url", &fixture_url("listing.html")])
        .args(["--xlsx", xlsx.to_str().unwrap()])
        .args(["--text", text.to_str().unwrap()])
        .args(["--log-dir", logs.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Exported 3 articles"));

    assert!(xlsx.exists());
    let report = std::fs::read_to_string(&text).unwrap();
    assert!(report.contains("ID: 4801234"));
    assert!(report.contains("Title: Nga và Ukraine đàm phán"));

    let logs = log_files(&logs);
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("scraper_"));
    assert!(logs[0].ends_with(".log"));
}

#[test]
fn test_cli_log_file_records_run() {
    let tmp = TempDir::new().unwrap();
    let logs = tmp.path().join("logs");

    cmd()
        .args(["--url", &fixture_url("listing.html")])
        .args(["--xlsx", tmp.path().join("a.xlsx").to_str().unwrap()])
        .args(["--text", tmp.path().join("a.txt").to_str().unwrap()])
        .args(["--log-dir", logs.to_str().unwrap()])
        .arg("--verbose")
        .assert()
        .success();

    let name = log_files(&logs).pop().unwrap();
    let log = std::fs::read_to_string(logs.join(name)).unwrap();
    assert!(log.contains("Successfully parsed article"));
    assert!(log.contains("Skipping candidate"));
}

#[test]
fn test_cli_xpath_listing() {
    let tmp = TempDir::new().unwrap();
    let text = tmp.path().join("articles.txt");

    cmd()
        .args(["--url", &fixture_url("listing.xhtml"), "--syntax", "xpath"])
        .args(["--xlsx", tmp.path().join("articles.xlsx").to_str().unwrap()])
        .args(["--text", text.to_str().unwrap()])
        .args(["--log-dir", tmp.path().join("logs").to_str().unwrap()])
        .assert()
        .success();

    let report = std::fs::read_to_string(&text).unwrap();
    assert!(report.contains("ID: 4801235"));
}

#[test]
fn test_cli_bom_encoding() {
    let tmp = TempDir::new().unwrap();
    let text = tmp.path().join("articles.txt");

    cmd()
        .args(["--url", &fixture_url("listing.html"), "--encoding", "utf-8-sig"])
        .args(["--xlsx", tmp.path().join("articles.xlsx").to_str().unwrap()])
        .args(["--text", text.to_str().unwrap()])
        .args(["--log-dir", tmp.path().join("logs").to_str().unwrap()])
        .assert()
        .success();

    let bytes = std::fs::read(&text).unwrap();
    assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
}

#[test]
fn test_cli_unreachable_listing_fails() {
    let tmp = TempDir::new().unwrap();
    let text = tmp.path().join("articles.txt");

    cmd()
        .args(["--url", "http://127.0.0.1:9/the-gioi", "--max-retries", "1", "--timeout", "2"])
        .args(["--xlsx", tmp.path().join("articles.xlsx").to_str().unwrap()])
        .args(["--text", text.to_str().unwrap()])
        .args(["--log-dir", tmp.path().join("logs").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run aborted"));

    assert!(!text.exists());
}

#[test]
fn test_cli_invalid_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("headliner.toml");
    std::fs::write(&config, "[fetch]\nretries = 3\n").unwrap();

    cmd()
        .args(["--config", config.to_str().unwrap()])
        .args(["--log-dir", tmp.path().join("logs").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_cli_config_file_applies() {
    let tmp = TempDir::new().unwrap();
    let text = tmp.path().join("from-config.txt");
    let config = tmp.path().join("headliner.toml");
    std::fs::write(
        &config,
        format!(
            "listing_url = \"{}\"\n\n[export.spreadsheet]\npath = \"{}\"\n\n[export.text]\npath = \"{}\"\n",
            fixture_url("listing.html"),
            tmp.path().join("from-config.xlsx").display(),
            text.display()
        ),
    )
    .unwrap();

    cmd()
        .args(["--config", config.to_str().unwrap()])
        .args(["--log-dir", tmp.path().join("logs").to_str().unwrap()])
        .assert()
        .success();

    assert!(text.exists());
}

#[test]
fn test_cli_invalid_query() {
    let tmp = TempDir::new().unwrap();

    cmd()
        .args(["--article-query", "article["])
        .args(["--log-dir", tmp.path().join("logs").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_cli_invalid_syntax_value() {
    cmd().args(["--syntax", "jq"]).assert().failure();
}
