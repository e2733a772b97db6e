//! Integration tests for a full migration run

#![allow(deprecated)]

use predicates::prelude::*;
use std::fs;

mod common;
use common::{snapshot, LegacySite};

#[test]
fn test_only_live_and_sticky_posts_migrated() {
    let site = LegacySite::new();
    site.add_post("draft", "2012-01-01 10:00:00", 1, "d", "");
    site.add_post("hidden", "2012-01-02 10:00:00", 2, "h", "");
    site.add_post("pending", "2012-01-03 10:00:00", 3, "p", "");
    site.add_post("live", "2012-01-04 10:00:00", 4, "l", "");
    site.add_post("sticky", "2012-01-05 10:00:00", 5, "s", "");

    site.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Migrated 2 posts"));

    let mut files: Vec<String> = fs::read_dir(site.posts_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec!["2012-01-04-live.textile", "2012-01-05-sticky.textile"]
    );
}

#[test]
fn test_post_file_contents() {
    let site = LegacySite::new();
    site.add_post(
        "hello-world",
        "2012-01-05 10:30:00",
        4,
        "h2. Hello\n\nSome *textile*.",
        "rust, cms",
    );

    site.command().assert().success();

    assert_eq!(
        site.read_post("2012-01-05-hello-world.textile"),
        "---\nlayout: post\ntitle: Post hello-world\ntags:\n- rust\n- cms\n---\nh2. Hello\n\nSome *textile*.\n"
    );
}

#[test]
fn test_post_without_keywords_has_no_tags() {
    let site = LegacySite::new();
    site.add_post("plain", "2012-03-01 00:00:00", 4, "x", "");

    site.command().assert().success();

    let content = site.read_post("2012-03-01-plain.textile");
    assert!(!content.contains("tags"));
}

#[test]
fn test_image_tag_rewritten_and_file_copied() {
    let site = LegacySite::new();
    site.set_image_dir("images");
    site.add_image(7, "cat.jpg", ".jpg", "a cat", false);
    site.write_image_file("images", "7.jpg", b"jpeg-bytes");
    site.add_post(
        "cats",
        "2012-01-05 10:30:00",
        4,
        r#"Look: <txp:image id="7" alt="x"/>"#,
        "",
    );

    site.command_with_source()
        .assert()
        .success()
        .stdout(predicate::str::contains("1 converted"));

    let content = site.read_post("2012-01-05-cats.textile");
    assert!(content.contains(r#"Look: <img src="/images/import/cat.jpg" alt="x" />"#));
    assert!(!content.contains("<txp:"));
    assert_eq!(
        fs::read(site.images_dir().join("cat.jpg")).unwrap(),
        b"jpeg-bytes"
    );
}

#[test]
fn test_thumbnail_tag_uses_thumbnail_file() {
    let site = LegacySite::new();
    site.set_image_dir("images");
    site.add_image(7, "cat.jpg", ".jpg", "a cat", true);
    site.write_image_file("images", "7t.jpg", b"thumb");
    site.add_post("thumb", "2012-01-05 10:30:00", 4, r#"<txp:thumbnail id="7"/>"#, "");

    site.command_with_source().assert().success();

    let content = site.read_post("2012-01-05-thumb.textile");
    assert!(content.contains(r#"<img src="/images/import/cat_t.jpg" alt="a cat" />"#));
    assert!(site.images_dir().join("cat_t.jpg").exists());
}

#[test]
fn test_image_by_name() {
    let site = LegacySite::new();
    site.set_image_dir("images");
    site.add_image(3, "dog.png", ".png", "", false);
    site.write_image_file("images", "3.png", b"png");
    site.add_post("dog", "2012-01-05 10:30:00", 4, r#"<txp:image name="dog.png" />"#, "");

    site.command_with_source().assert().success();

    let content = site.read_post("2012-01-05-dog.textile");
    assert!(content.contains(r#"<img src="/images/import/dog.png" />"#));
}

#[test]
fn test_missing_image_file_leaves_tag_unchanged() {
    let site = LegacySite::new();
    site.set_image_dir("images");
    site.add_image(7, "cat.jpg", ".jpg", "", false);
    site.add_post("cats", "2012-01-05 10:30:00", 4, r#"<txp:image id="7"/>"#, "");

    site.command_with_source()
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed to convert image tag"));

    let content = site.read_post("2012-01-05-cats.textile");
    assert!(content.contains(r#"<txp:image id="7"/>"#));
    assert!(!site.images_dir().join("cat.jpg").exists());
}

#[test]
fn test_unknown_media_leaves_tag_unchanged() {
    let site = LegacySite::new();
    site.set_image_dir("images");
    site.add_post("cats", "2012-01-05 10:30:00", 4, r#"<txp:image id="99"/>"#, "");

    site.command_with_source().assert().success();

    assert!(site
        .read_post("2012-01-05-cats.textile")
        .contains(r#"<txp:image id="99"/>"#));
}

#[test]
fn test_unrecognized_tag_left_unchanged() {
    let site = LegacySite::new();
    site.set_image_dir("images");
    site.add_post(
        "form",
        "2012-01-05 10:30:00",
        4,
        r#"Before <txp:output_form form="x"/> after"#,
        "",
    );

    site.command_with_source().assert().success();

    assert!(site
        .read_post("2012-01-05-form.textile")
        .contains(r#"Before <txp:output_form form="x"/> after"#));
}

#[test]
fn test_tags_untouched_without_source_dir() {
    let site = LegacySite::new();
    site.set_image_dir("images");
    site.add_image(7, "cat.jpg", ".jpg", "", false);
    site.write_image_file("images", "7.jpg", b"jpeg");
    site.add_post("cats", "2012-01-05 10:30:00", 4, r#"<txp:image id="7"/>"#, "");

    site.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Image processing skipped"));

    assert!(site
        .read_post("2012-01-05-cats.textile")
        .contains(r#"<txp:image id="7"/>"#));
    assert!(!site.images_dir().exists());
}

#[test]
fn test_missing_image_directory_skips_images() {
    let site = LegacySite::new();
    site.add_post("cats", "2012-01-05 10:30:00", 4, r#"<txp:image id="7"/>"#, "");

    site.command_with_source()
        .assert()
        .success()
        .stdout(predicate::str::contains("Image processing skipped"));

    assert!(site.posts_dir().join("2012-01-05-cats.textile").exists());
}

#[test]
fn test_table_prefix_from_legacy_config() {
    let site = LegacySite::with_prefix("blog_");
    site.write_legacy_config("<?php\n$txpcfg['table_prefix'] = 'blog_';\n?>\n");
    site.add_post("prefixed", "2012-01-05 10:30:00", 4, "x", "");

    site.command_with_source().assert().success();

    assert!(site.posts_dir().join("2012-01-05-prefixed.textile").exists());
}

#[test]
fn test_prefixed_tables_without_config_fail() {
    let site = LegacySite::with_prefix("blog_");
    site.add_post("prefixed", "2012-01-05 10:30:00", 4, "x", "");

    site.command_with_source()
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Missing Textpattern config file"));
}

#[test]
fn test_invalid_table_prefix_is_fatal() {
    let site = LegacySite::new();
    site.write_legacy_config("$txpcfg['table_prefix'] = 'x; DROP';\n");

    site.command_with_source()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid table prefix"));
}

#[test]
fn test_second_run_is_identical() {
    let site = LegacySite::new();
    site.set_image_dir("images");
    site.add_image(7, "cat.jpg", ".jpg", "cat", true);
    site.write_image_file("images", "7.jpg", b"full");
    site.write_image_file("images", "7t.jpg", b"thumb");
    site.add_post(
        "one",
        "2012-01-05 10:30:00",
        4,
        r#"<txp:image id="7"/> and <txp:thumbnail id="7"/>"#,
        "a, b",
    );
    site.add_post("two", "2012-02-05 10:30:00", 5, "plain", "");

    site.command_with_source().assert().success();
    let first = snapshot(&site.site_dir());
    site.command_with_source().assert().success();
    let second = snapshot(&site.site_dir());

    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
}

#[test]
fn test_same_day_same_slug_collision() {
    let site = LegacySite::new();
    site.add_post("same", "2012-01-05 08:00:00", 4, "morning", "");
    site.add_post("same", "2012-01-05 20:00:00", 4, "evening", "");

    site.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("1 post(s) overwritten"));

    assert!(site
        .read_post("2012-01-05-same.textile")
        .ends_with("---\nevening\n"));
}

#[test]
fn test_slug_with_parent_segments_is_skipped() {
    let site = LegacySite::new();
    site.add_post("../x", "2012-01-05 10:30:00", 4, "escaped", "");
    site.add_post("../../escaped", "2012-01-05 11:30:00", 4, "escaped", "");
    site.add_post("fine", "2012-01-06 10:30:00", 4, "kept", "");

    site.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Migrated 1 post\n"))
        .stdout(predicate::str::contains("2 post(s) skipped"))
        .stderr(predicate::str::contains("Skipping post"));

    let files = snapshot(site.temp.path());
    let written: Vec<_> = files
        .iter()
        .filter(|(path, _)| path.extension().is_some_and(|e| e == "textile"))
        .map(|(path, _)| path.clone())
        .collect();
    assert_eq!(
        written,
        vec![std::path::PathBuf::from("site/_posts/2012-01-06-fine.textile")]
    );
}

#[test]
fn test_image_copy_failure_keeps_tag_and_finishes_run() {
    let site = LegacySite::new();
    site.set_image_dir("images");
    site.add_image(7, "cat.jpg", ".jpg", "", false);
    site.write_image_file("images", "7.jpg", b"jpeg");
    fs::create_dir_all(site.images_dir().join("cat.jpg")).unwrap();
    site.add_post("cats", "2012-01-05 10:30:00", 4, r#"<txp:image id="7"/>"#, "");
    site.add_post("plain", "2012-01-06 10:30:00", 4, "text", "");

    site.command_with_source()
        .assert()
        .success()
        .stdout(predicate::str::contains("Migrated 2 posts"))
        .stderr(predicate::str::contains("could not copy image"));

    assert!(site
        .read_post("2012-01-05-cats.textile")
        .contains(r#"<txp:image id="7"/>"#));
    assert!(site.posts_dir().join("2012-01-06-plain.textile").exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let site = LegacySite::new();
    site.set_image_dir("images");
    site.add_image(7, "cat.jpg", ".jpg", "", false);
    site.write_image_file("images", "7.jpg", b"jpeg");
    site.add_post("cats", "2012-01-05 10:30:00", 4, r#"<txp:image id="7"/>"#, "");

    site.command_with_source()
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Would migrate 1 post"));

    assert!(!site.posts_dir().exists());
    assert!(!site.images_dir().exists());
}
