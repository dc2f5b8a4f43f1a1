//! End-to-end tests for the omh CLI.
//!
//! Tests run the `omh` binary against a temporary vault and inspect the
//! generated Hugo tree.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn omh() -> Command {
    Command::new(env!("CARGO_BIN_EXE_omh"))
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn vault() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Note A.md", "---\ntags: [blog]\n---\nSee [[Note B]]\n");
    write(dir.path(), "Note B.md", "---\ntags: [draft]\n---\nHello\n");
    dir
}

fn run(vault: &Path, site: &Path, extra: &[&str]) -> Output {
    let output = omh()
        .arg("-O")
        .arg(vault)
        .arg("-H")
        .arg(site)
        .args(extra)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "omh failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn run_json(vault: &Path, site: &Path, extra: &[&str]) -> serde_json::Value {
    let mut args = vec!["--json"];
    args.extend_from_slice(extra);
    let output = run(vault, site, &args);
    serde_json::from_slice(&output.stdout).unwrap()
}

// === Filtering ===

#[test]
fn e2e_include_tag_keeps_only_tagged_notes() {
    let vault = vault();
    let site = TempDir::new().unwrap();
    run(vault.path(), site.path(), &["-i", "blog"]);

    let page = fs::read_to_string(site.path().join("content/posts/note-a.md")).unwrap();
    assert!(page.starts_with("---\n"));
    assert!(page.contains("- blog"));
    assert!(page.contains("title: Note A"));
    assert!(page.trim_end().ends_with("See [[Note B]]"));
    assert!(!site.path().join("content/posts/note-b.md").exists());
}

#[test]
fn e2e_exclude_tag_wins_over_include() {
    let vault = vault();
    write(vault.path(), "Both.md", "---\ntags: [blog, draft]\n---\nBoth\n");
    let site = TempDir::new().unwrap();
    let report = run_json(vault.path(), site.path(), &["-i", "blog", "-e", "draft"]);

    let slugs: Vec<&str> = report["notes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["note-a"]);
    assert_eq!(report["excluded"].as_array().unwrap().len(), 2);
}

#[test]
fn e2e_publish_field_requires_key() {
    let vault = vault();
    write(vault.path(), "Public.md", "---\npublish: true\n---\nOut\n");
    let site = TempDir::new().unwrap();
    run(vault.path(), site.path(), &["-f", "publish"]);

    assert!(site.path().join("content/posts/public.md").exists());
    assert!(!site.path().join("content/posts/note-a.md").exists());
}

// === Links and assets ===

#[test]
fn e2e_links_between_retained_notes_use_slugs() {
    let vault = vault();
    let site = TempDir::new().unwrap();
    run(vault.path(), site.path(), &[]);

    let page = fs::read_to_string(site.path().join("content/posts/note-a.md")).unwrap();
    assert!(page.contains("See [Note B](/posts/note-b/)"));
}

#[test]
fn e2e_recursive_copies_assets_under_sub_path() {
    let vault = vault();
    write(vault.path(), "Journal/Trip.md", "![[Photo.jpg]]\n");
    write(vault.path(), "Journal/Photo.jpg", "jpg");
    let site = TempDir::new().unwrap();
    let report = run_json(vault.path(), site.path(), &["-R", "-p", "notes"]);

    assert_eq!(
        fs::read_to_string(site.path().join("static/notes/journal/Photo.jpg")).unwrap(),
        "jpg"
    );
    let trip = fs::read_to_string(site.path().join("content/notes/trip.md")).unwrap();
    assert!(trip.contains("![Photo.jpg](/notes/journal/Photo.jpg)"));
    assert_eq!(report["assets"].as_array().unwrap().len(), 1);
}

#[test]
fn e2e_flat_run_ignores_subdirectories() {
    let vault = vault();
    write(vault.path(), "Journal/Trip.md", "Trip\n");
    let site = TempDir::new().unwrap();
    let report = run_json(vault.path(), site.path(), &[]);

    assert_eq!(report["notes"].as_array().unwrap().len(), 2);
    assert!(!site.path().join("content/posts/trip.md").exists());
}

// === Front matter ===

#[test]
fn e2e_extra_front_matter_and_time_zone() {
    let vault = TempDir::new().unwrap();
    write(
        vault.path(),
        "Post.md",
        "---\ndraft: true\ndate: 2024-03-01T12:00:00Z\n---\nBody\n",
    );
    let site = TempDir::new().unwrap();
    run(
        vault.path(),
        site.path(),
        &["-F", "draft:false", "-F", "author:Me", "-z", "+01:00"],
    );

    let page = fs::read_to_string(site.path().join("content/posts/post.md")).unwrap();
    assert!(page.contains("draft: false"));
    assert!(page.contains("author: Me"));
    assert!(page.contains("2024-03-01T13:00:00+01:00"));
}

#[test]
fn e2e_note_precedence_keeps_note_values() {
    let vault = TempDir::new().unwrap();
    write(vault.path(), "Post.md", "---\ndraft: true\n---\nBody\n");
    let site = TempDir::new().unwrap();
    run(
        vault.path(),
        site.path(),
        &["-F", "draft:false", "--front-matter-precedence", "note"],
    );

    let page = fs::read_to_string(site.path().join("content/posts/post.md")).unwrap();
    assert!(page.contains("draft: true"));
}

#[test]
fn e2e_custom_tags_key() {
    let vault = TempDir::new().unwrap();
    write(vault.path(), "Kept.md", "---\nlabels: \"#blog\"\n---\nKept\n");
    write(vault.path(), "Dropped.md", "---\ntags: [blog]\n---\nDropped\n");
    let site = TempDir::new().unwrap();
    run(vault.path(), site.path(), &["-t", "labels", "-i", "blog"]);

    assert!(site.path().join("content/posts/kept.md").exists());
    assert!(!site.path().join("content/posts/dropped.md").exists());
}

// === Naming ===

#[test]
fn e2e_colliding_names_get_distinct_stable_files() {
    let vault = TempDir::new().unwrap();
    write(vault.path(), "My Note.md", "one\n");
    write(vault.path(), "my-note.md", "two\n");

    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let a = run_json(vault.path(), first.path(), &[]);
    let b = run_json(vault.path(), second.path(), &[]);

    let slugs = |report: &serde_json::Value| -> Vec<String> {
        report["notes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["slug"].as_str().unwrap().to_string())
            .collect()
    };
    let names = slugs(&a);
    assert_eq!(names.len(), 2);
    assert_ne!(names[0], names[1]);
    assert_eq!(names, slugs(&b));
    assert_eq!(names[0], "my-note");
    assert!(names[1].starts_with("my-note-"));
}

// === Errors and output ===

#[test]
fn e2e_summary_is_printed() {
    let vault = vault();
    let site = TempDir::new().unwrap();
    let output = run(vault.path(), site.path(), &["-i", "blog"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 notes written"));
    assert!(stdout.contains("1 notes excluded"));
}

#[test]
fn e2e_missing_vault_fails() {
    let site = TempDir::new().unwrap();
    let output = omh()
        .args(["-O", "/nonexistent/vault", "-H"])
        .arg(site.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load vault"));
}

#[test]
fn e2e_malformed_front_matter_names_file() {
    let vault = vault();
    write(vault.path(), "Broken.md", "---\ntags: [oops\n---\nBody\n");
    let site = TempDir::new().unwrap();
    let output = omh()
        .arg("-O")
        .arg(vault.path())
        .arg("-H")
        .arg(site.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Broken.md"));
    assert!(!site.path().join("content").exists());
}

#[test]
fn e2e_invalid_sub_path_fails_before_output() {
    let vault = vault();
    let site = TempDir::new().unwrap();
    let output = omh()
        .arg("-O")
        .arg(vault.path())
        .arg("-H")
        .arg(site.path())
        .args(["-p", "../escape"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!site.path().join("content").exists());
}

#[test]
fn e2e_completions_need_no_roots() {
    let output = omh().args(["--completions", "bash"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("omh"));
}
