//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("blaze")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

#[test]
fn test_cli_file_input() {
    cmd()
        .arg(get_fixture_path("news_article.html"))
        .assert()
        .success()
        .stdout(predicate::str::contains("seismic retrofit"))
        .stdout(predicate::str::contains("cookie").not());
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(get_fixture_path("blog_scored.html")).unwrap();
    cmd()
        .arg("-")
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("Bulk fermentation"));
}

#[test]
fn test_cli_html_format_strips_attributes() {
    cmd()
        .args(["-f", "html", &get_fixture_path("news_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("<p>"))
        .stdout(predicate::str::contains("class=").not());
}

#[test]
fn test_cli_text_format() {
    cmd()
        .args(["-f", "text", &get_fixture_path("news_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("The Harbor Bridge reopened"))
        .stdout(predicate::str::contains("<p>").not());
}

#[test]
fn test_cli_markdown_format() {
    cmd()
        .args(["-f", "markdown", &get_fixture_path("news_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Harbor Bridge Reopens After Two-Year Retrofit"));
}

#[test]
fn test_cli_json_format() {
    let output = cmd()
        .args(["-f", "json", &get_fixture_path("blog_scored.html")])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["source"], "scored");
    assert_eq!(json["title"], "Notes on Sourdough (twitter)");
    assert!(json["length"].as_u64().unwrap() > 300);
}

#[test]
fn test_cli_invalid_format() {
    cmd()
        .args(["-f", "pdf", &get_fixture_path("news_article.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("output.html");

    cmd()
        .args(["-o", output.to_str().unwrap()])
        .arg(get_fixture_path("news_article.html"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Output written to"));

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("engineering report"));
}

#[test]
fn test_cli_invalid_file() {
    cmd()
        .arg("nonexistent.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_cli_empty_content() {
    cmd()
        .arg(get_fixture_path("empty_content.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not be simplified"));
}

#[test]
fn test_cli_base_url() {
    cmd()
        .args([
            "--base-url",
            "https://coastline.example/news/",
            &get_fixture_path("news_article.html"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://coastline.example/media/bridge.jpg"));
}

#[test]
fn test_cli_invalid_base_url() {
    cmd()
        .args(["--base-url", "not a url", &get_fixture_path("news_article.html")])
        .assert()
        .failure();
}

#[test]
fn test_cli_proxy() {
    cmd()
        .args([
            "--base-url",
            "https://coastline.example/news/",
            "--proxy",
            "/read",
            &get_fixture_path("news_article.html"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "/read?url=https%3A%2F%2Fcoastline.example%2Fnews%2Freports%2Fretrofit-2024.pdf",
        ));
}

#[test]
fn test_cli_semantic_min_chars() {
    cmd()
        .args(["--semantic-min-chars", "100000", "-f", "json", &get_fixture_path("news_article.html")])
        .assert()
        .failure();

    cmd()
        .args(["--semantic-min-chars", "10", "-f", "json", &get_fixture_path("news_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""source": "semantic""#));
}

#[test]
fn test_cli_min_candidate_chars() {
    cmd()
        .args(["--min-candidate-chars", "100000", &get_fixture_path("blog_scored.html")])
        .assert()
        .failure();
}

#[test]
fn test_cli_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("blaze.json");
    std::fs::write(&config, r#"{ "fallback_title": "Nameless", "title_sources": [] }"#).unwrap();

    cmd()
        .args(["-f", "json", "--config", config.to_str().unwrap(), &get_fixture_path("news_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""title": "Nameless""#));
}

#[test]
fn test_cli_invalid_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("blaze.json");
    std::fs::write(&config, "{ not json").unwrap();

    cmd()
        .args(["--config", config.to_str().unwrap(), &get_fixture_path("news_article.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", &get_fixture_path("news_article.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("Blaze"))
        .stderr(predicate::str::contains("Extraction Details"));
}
