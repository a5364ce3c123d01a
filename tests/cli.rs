// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;
use std::process::{Command, Output, Stdio};

const APP_PATH: &str = env!("CARGO_BIN_EXE_svgflat");

fn run(args: &[&str]) -> Output {
    Command::new(APP_PATH).args(args).output().unwrap()
}

fn load_file(path: &str) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn file_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let file_out = dir.path().join("out.svg");
    let file_out = file_out.to_str().unwrap();

    let output = run(&["tests/files/qt-export.svg", file_out]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    assert!(load_file(file_out) == load_file("tests/files/qt-export-expected.svg"));
}

#[test]
fn file_to_stdout() {
    let output = run(&["tests/files/qt-export.svg"]);
    assert!(output.status.success());
    assert!(output.stdout == load_file("tests/files/qt-export-expected.svg").into_bytes());
}

#[test]
fn file_to_stdout_explicit() {
    let output = run(&["tests/files/qt-export.svg", "-c"]);
    assert!(output.status.success());
    assert!(output.stdout == load_file("tests/files/qt-export-expected.svg").into_bytes());
}

#[test]
fn stdin_to_stdout() {
    let mut child = Command::new(APP_PATH)
        .args(["--remove-gradients", "-", "-c"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(load_file("tests/files/qt-export.svg").as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert!(output.stdout == load_file("tests/files/qt-export-cleanup-expected.svg").into_bytes());
}

#[test]
fn stroke_option() {
    let output = run(&["--stroke", "tests/files/style-refs.svg", "-c"]);
    assert!(output.status.success());
    assert!(output.stdout == load_file("tests/files/style-refs-stroke-expected.svg").into_bytes());
}

#[test]
fn strategy_option() {
    let dir = tempfile::tempdir().unwrap();
    let file_in = dir.path().join("in.svg");
    std::fs::write(
        &file_in,
        "<svg xmlns='http://www.w3.org/2000/svg'>\
         <linearGradient id='lg1'><stop stop-color='red'/><stop stop-color='blue'/></linearGradient>\
         <rect fill='url(#lg1)'/></svg>",
    )
    .unwrap();

    let output = run(&["--strategy=last", file_in.to_str().unwrap(), "-c"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("<rect fill='blue'/>"));

    let output = run(&["--strategy", "average", file_in.to_str().unwrap(), "-c"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn indent_option() {
    let output = run(&["--indent=2", "tests/files/qt-export.svg", "-c"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("<?xml"));
    assert!(stdout.contains("\n  <title>"));
    assert!(stdout.contains("fill=\"#2a82da\""));
    assert!(!stdout.contains("url(#gradient1)"));
}

#[test]
fn malformed_input() {
    let dir = tempfile::tempdir().unwrap();
    let file_in = dir.path().join("in.svg");
    let file_out = dir.path().join("out.svg");
    std::fs::write(&file_in, "<svg xmlns='http://www.w3.org/2000/svg'><g></svg>").unwrap();

    let output = run(&[file_in.to_str().unwrap(), file_out.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8(output.stderr).unwrap().starts_with("Error: "));
    assert!(!file_out.exists());
}

#[test]
fn missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let file_in = dir.path().join("missing.svg");

    let output = run(&[file_in.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn help() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().starts_with("svgflat"));
}
