//! CLI integration tests for all subcommands.
//!
//! Uses `assert_cmd` to spawn the `marquee` binary and verify exit
//! codes, stdout content, and stderr content. Fixtures are written to
//! temp directories, so no test depends on the working directory.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn marquee() -> Command {
    cargo_bin_cmd!("marquee")
}

fn write_fixture(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path.display().to_string()
}

/// A catalog with one inline prompt (fires at the top of the content)
/// and one generic overlay.
fn catalog_json() -> String {
    json!([
        {
            "id": 3,
            "placement": "inline",
            "markup": "<div>signup</div>",
            "options": { "frequency": "always", "trigger_scroll_progress": 0 }
        },
        {
            "id": 4,
            "placement": "overlay-generic",
            "markup": "<div>overlay</div>",
            "options": { "frequency": "once" }
        }
    ])
    .to_string()
}

const CONTENT: &str = "first paragraph\n\nsecond paragraph";

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    marquee()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Marquee prompt placement engine"));
}

#[test]
fn version_exits_0() {
    marquee()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("marquee"));
}

#[test]
fn render_help_exits_0() {
    marquee()
        .args(["render", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--catalog"));
}

// ──────────────────────────────────────────────
// 2. Render subcommand
// ──────────────────────────────────────────────

#[test]
fn render_injects_markers_and_overlays() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(dir.path(), "catalog.json", &catalog_json());
    let content = write_fixture(dir.path(), "post.txt", CONTENT);

    marquee()
        .args(["render", "--catalog", &catalog, &content])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "<!-- wp:html --><div>overlay</div><!-- /wp:html -->",
        ))
        .stdout(predicate::str::contains(
            r#"<!-- wp:shortcode -->[marquee-prompt id="3"]<!-- /wp:shortcode -->"#,
        ));
}

#[test]
fn render_admin_screen_passes_content_through() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(dir.path(), "catalog.json", &catalog_json());
    let content = write_fixture(dir.path(), "post.txt", CONTENT);
    let context = write_fixture(
        dir.path(),
        "context.json",
        &json!({ "is_admin_screen": true }).to_string(),
    );

    marquee()
        .args(["render", "--catalog", &catalog, "--context", &context, &content])
        .assert()
        .success()
        .stdout(predicate::str::contains("second paragraph"))
        .stdout(predicate::str::contains("marquee-prompt").not());
}

#[test]
fn render_nonexistent_catalog_exits_1() {
    let dir = TempDir::new().unwrap();
    let content = write_fixture(dir.path(), "post.txt", CONTENT);

    marquee()
        .args(["render", "--catalog", "no_such_catalog.json", &content])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading file"));
}

#[test]
fn render_malformed_catalog_exits_1() {
    let dir = TempDir::new().unwrap();
    // A record with no id fails validation.
    let catalog = write_fixture(
        dir.path(),
        "catalog.json",
        &json!([{ "placement": "inline" }]).to_string(),
    );
    let content = write_fixture(dir.path(), "post.txt", CONTENT);

    marquee()
        .args(["render", "--catalog", &catalog, &content])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid catalog"));
}

// ──────────────────────────────────────────────
// 3. Payload subcommand
// ──────────────────────────────────────────────

#[test]
fn payload_prints_access_script_tag() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(dir.path(), "catalog.json", &catalog_json());

    marquee()
        .args(["payload", "--catalog", &catalog])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<script id=\"amp-access\" type=\"application/json\">",
        ))
        .stdout(predicate::str::contains("\"namespace\":\"prompts\""))
        .stdout(predicate::str::contains("id_3"))
        .stdout(predicate::str::contains("id_4"));
}

#[test]
fn payload_folds_settings_into_authorization() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(dir.path(), "catalog.json", &catalog_json());
    let settings = write_fixture(
        dir.path(),
        "settings.json",
        &json!([{ "key": "best_priority", "value": "overlay" }]).to_string(),
    );

    marquee()
        .args(["payload", "--catalog", &catalog, "--settings", &settings])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "&settings={\\\"best_priority\\\":\\\"overlay\\\"}",
        ));
}

#[test]
fn payload_includes_shortcoded_prompts_from_content() {
    let dir = TempDir::new().unwrap();
    let catalog = write_fixture(dir.path(), "catalog.json", &catalog_json());
    // Prompt 4 is an overlay, never body-injected; reference it manually.
    let content = write_fixture(
        dir.path(),
        "post.txt",
        "intro\n\n[marquee-prompt id=\"4\"]\n\noutro",
    );
    let context = write_fixture(
        dir.path(),
        "context.json",
        &json!({ "post_id": 9, "non_interactive": true }).to_string(),
    );

    marquee()
        .args([
            "payload", "--catalog", &catalog, "--context", &context, "--content", &content,
        ])
        .assert()
        .success()
        // Non-interactive mode drops the overlay from selection, but the
        // shortcode reference still puts it in the payload.
        .stdout(predicate::str::contains("id_4"));
}

// ──────────────────────────────────────────────
// 4. Extract-ids subcommand
// ──────────────────────────────────────────────

#[test]
fn extract_ids_prints_one_id_per_line() {
    let dir = TempDir::new().unwrap();
    let file = write_fixture(
        dir.path(),
        "widget.txt",
        "[marquee-prompt id=\"42\"] and [marquee-prompt id=\"7\"]",
    );

    marquee()
        .args(["extract-ids", &file])
        .assert()
        .success()
        .stdout("7\n42\n");
}

#[test]
fn extract_ids_nonexistent_file_exits_1() {
    marquee()
        .args(["extract-ids", "no_such_file.txt"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading file"));
}
