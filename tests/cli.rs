//! Tests for the `ocrprep` binary: exit status and console contract.
//!
//! The binary is run as a child process with a controlled environment so an
//! ambient `WORKING_DIR` never leaks in.

use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn ocrprep(envs: &[(&str, &Path)], args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ocrprep"));
    cmd.env_remove("WORKING_DIR")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .args(args);
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd.output().expect("failed to run ocrprep")
}

fn stdout(o: &Output) -> String {
    String::from_utf8_lossy(&o.stdout).into_owned()
}

fn stderr(o: &Output) -> String {
    String::from_utf8_lossy(&o.stderr).into_owned()
}

fn write_jpeg(path: &Path) {
    RgbImage::from_pixel(4, 4, Rgb([50, 60, 70])).save(path).unwrap();
}

#[test]
fn unset_working_dir_exits_non_zero() {
    let out = ocrprep(&[], &["--no-progress"]);
    assert!(!out.status.success());
    assert!(
        stderr(&out).contains("WORKING_DIR is not set"),
        "stderr: {}",
        stderr(&out)
    );
    assert!(!stdout(&out).contains("Done."));
}

#[test]
fn missing_working_dir_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone");
    let out = ocrprep(&[("WORKING_DIR", &missing)], &["--no-progress"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("does not exist"), "stderr: {}", stderr(&out));
}

#[test]
fn verbose_run_prints_status_lines_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_jpeg(&root.join("a.jpg"));
    fs::write(root.join("b.png"), b"whatever").unwrap();

    let out = ocrprep(&[("WORKING_DIR", root)], &["--verbose", "--no-progress"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let text = stdout(&out);
    assert!(text.contains("Found 2 files; 2 candidate image files"), "{text}");
    assert!(text.contains("SKIP (already OCR-friendly): "), "{text}");
    assert!(text.contains("CONVERTED: "), "{text}");
    assert!(text.contains(" -> "), "{text}");
    assert_eq!(
        text.lines().last(),
        Some("Done. scanned=2, converted=1, already_ok=1")
    );
}

#[test]
fn quiet_default_prints_only_summary() {
    let dir = tempfile::tempdir().unwrap();
    write_jpeg(&dir.path().join("a.jpg"));

    let out = ocrprep(&[], &["--root", dir.path().to_str().unwrap(), "--no-progress"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "Done. scanned=1, converted=1, already_ok=0");
}

#[test]
fn failures_are_reported_and_exit_zero() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("broken.jpg"), b"\xFF\xD8\xFF").unwrap();

    let out = ocrprep(&[("WORKING_DIR", root)], &["--no-progress"]);
    assert!(out.status.success());
    assert!(stderr(&out).contains("FAILED (DecodeError): "), "{}", stderr(&out));
    assert!(stderr(&out).contains("broken.jpg"));
    assert_eq!(stderr(&out).matches("broken.jpg").count(), 1, "{}", stderr(&out));
    assert!(!stderr(&out).contains("WARN"), "{}", stderr(&out));
    assert_eq!(
        stdout(&out).trim(),
        "Done. scanned=1, converted=0, already_ok=0, failed=1"
    );
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_jpeg(&root.join("a.jpg"));

    let out = ocrprep(
        &[("WORKING_DIR", root)],
        &["--dry-run", "--verbose", "--no-progress", "--format", "tiff"],
    );
    assert!(out.status.success());
    assert!(stdout(&out).contains("CONVERT (dry-run): "));
    assert!(stdout(&out).contains("-> TIFF@300DPI"));
    assert_eq!(fs::read_dir(root).unwrap().count(), 1);
}

#[test]
fn json_summary() {
    let dir = tempfile::tempdir().unwrap();
    write_jpeg(&dir.path().join("a.jpg"));

    let out = ocrprep(&[("WORKING_DIR", dir.path())], &["--json"]);
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(v["scanned"], 1);
    assert_eq!(v["converted"], 1);
    assert_eq!(v["failed"], 0);
}

#[test]
fn json_with_verbose_keeps_stdout_parseable() {
    let dir = tempfile::tempdir().unwrap();
    write_jpeg(&dir.path().join("a.jpg"));

    let out = ocrprep(&[("WORKING_DIR", dir.path())], &["--json", "--verbose"]);
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_str(&stdout(&out))
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", stdout(&out)));
    assert_eq!(v["converted"], 1);
    assert!(dir.path().join("a.png").is_file());
}

#[test]
fn verbose_empty_tree_lists_supported_extensions() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), b"text").unwrap();

    let out = ocrprep(&[("WORKING_DIR", dir.path())], &["--verbose", "--no-progress"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Found 1 files; 0 candidate image files"), "{text}");
    let listed: Vec<&str> = text
        .lines()
        .find_map(|l| l.strip_prefix("No candidate images found. Supported input extensions: "))
        .unwrap_or_else(|| panic!("missing hint line: {text}"))
        .split(", ")
        .collect();
    for ext in [".jpg", ".jpeg", ".bmp", ".webp", ".png", ".tif", ".tiff"] {
        assert!(listed.contains(&ext), "{ext} missing: {listed:?}");
    }
    assert_eq!(
        text.lines().last(),
        Some("Done. scanned=0, converted=0, already_ok=0")
    );
}

#[test]
fn dpi_flag_reaches_the_written_tag() {
    let dir = tempfile::tempdir().unwrap();
    write_jpeg(&dir.path().join("a.jpg"));

    let out = ocrprep(&[("WORKING_DIR", dir.path())], &["--dpi", "600", "--no-progress"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let reader = png::Decoder::new(fs::File::open(dir.path().join("a.png")).unwrap())
        .read_info()
        .unwrap();
    let dims = reader.info().pixel_dims.expect("pHYs chunk present");
    assert_eq!(dims.unit, png::Unit::Meter);
    assert_eq!((f64::from(dims.xppu) * 0.0254).round(), 600.0);
    assert_eq!((f64::from(dims.yppu) * 0.0254).round(), 600.0);
}
