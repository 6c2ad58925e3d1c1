//! Running the `xq` binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// A scratch directory used as both home and working directory, so no real
/// `.xq` file is picked up.
fn sandbox() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn xq(dir: &Path, args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_xq"));
    let _ = command
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("XQ_LOG")
        .env_remove("PAGER");
    command
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.display().to_string()
}

fn run_with_stdin(mut command: Command, input: &str) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_formats_file() {
    let dir = sandbox();
    let file = write(dir.path(), "in.xml", "<a><b>1</b><c>2</c></a>");
    let output = xq(dir.path(), &[&file]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout(&output), "<a>\n  <b>1</b>\n  <c>2</c>\n</a>\n");
}

#[test]
fn test_formats_stdin() {
    let dir = sandbox();
    let output = run_with_stdin(xq(dir.path(), &["--tab"]), "<a><b/></a>");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "<a>\n\t<b/>\n</a>\n");
}

#[test]
fn test_last_file_wins() {
    let dir = sandbox();
    let first = write(dir.path(), "first.xml", "<first/>");
    let second = write(dir.path(), "second.xml", "<second/>");
    let output = xq(dir.path(), &[&first, &second]).output().unwrap();
    assert_eq!(stdout(&output), "<second/>\n");
}

#[test]
fn test_queries() {
    let dir = sandbox();
    let file = write(
        dir.path(),
        "in.xml",
        r#"<a><b id="x">1</b><b id="y">2</b></a>"#,
    );

    let multi = xq(dir.path(), &["-x", "//b[@id='y']", &file]).output().unwrap();
    assert_eq!(stdout(&multi), "<b id=\"y\">2</b>\n");

    let single = xq(dir.path(), &["-e", "//b", &file]).output().unwrap();
    assert_eq!(stdout(&single), "<b id=\"x\">1</b>\n");

    let css = xq(dir.path(), &["-q", "b#y", &file]).output().unwrap();
    assert_eq!(stdout(&css), "<b id=\"y\">2</b>\n");
}

#[test]
fn test_html_detection_and_flag() {
    let dir = sandbox();
    let page = write(dir.path(), "page.html", "<!DOCTYPE html><p>a<p>b");
    let output = xq(dir.path(), &[&page]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout(&output), "<!DOCTYPE html>\n<p>a</p>\n<p>b</p>\n");

    let fragment = write(dir.path(), "fragment.html", "<div><p>text");
    let as_xml = xq(dir.path(), &[&fragment]).output().unwrap();
    assert!(!as_xml.status.success());

    let as_html = xq(dir.path(), &["-m", &fragment]).output().unwrap();
    assert!(as_html.status.success());
    assert_eq!(stdout(&as_html), "<div>\n  <p>text</p>\n</div>\n");
}

#[test]
fn test_errors_exit_non_zero() {
    let dir = sandbox();
    let file = write(dir.path(), "in.xml", "<a/>");

    for args in [
        vec!["--indent", "0", file.as_str()],
        vec!["--indent", "9", file.as_str()],
        vec!["-e", "//missing", file.as_str()],
        vec!["-x", "//[", file.as_str()],
        vec!["missing.xml"],
    ] {
        let output = xq(dir.path(), &args).output().unwrap();
        assert!(!output.status.success(), "{args:?} should fail");
        assert!(!output.stderr.is_empty(), "{args:?} should explain");
    }
}

#[test]
fn test_empty_multi_match_succeeds() {
    let dir = sandbox();
    let file = write(dir.path(), "in.xml", "<a/>");
    let output = xq(dir.path(), &["-x", "//missing", &file]).output().unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_config_file_sets_defaults() {
    let dir = sandbox();
    let _ = write(dir.path(), ".xq", "indent = 4\n");
    let file = write(dir.path(), "in.xml", "<a><b/></a>");

    let output = xq(dir.path(), &[&file]).output().unwrap();
    assert_eq!(stdout(&output), "<a>\n    <b/>\n</a>\n");

    let flagged = xq(dir.path(), &["--indent", "1", &file]).output().unwrap();
    assert_eq!(stdout(&flagged), "<a>\n <b/>\n</a>\n");
}

#[test]
fn test_invalid_config_fails() {
    let dir = sandbox();
    let _ = write(dir.path(), ".xq", "indent = = 4\n");
    let file = write(dir.path(), "in.xml", "<a/>");
    let output = xq(dir.path(), &[&file]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_forced_color() {
    let dir = sandbox();
    let file = write(dir.path(), "in.xml", "<a/>");
    let output = xq(dir.path(), &["-c", &file]).output().unwrap();
    assert!(stdout(&output).contains("\x1b["));

    let plain = xq(dir.path(), &[&file]).output().unwrap();
    assert!(!stdout(&plain).contains("\x1b["));
}

#[test]
fn test_version() {
    let dir = sandbox();
    let output = xq(dir.path(), &["-V"]).output().unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("xq "));
}
