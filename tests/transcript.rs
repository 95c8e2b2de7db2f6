// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! File-backed end-to-end tests of the [`Transcript`] writer.

use std::{fs, time::Duration};

use debuglog::{Error, Level, Threshold, Transcript};

/// Strips the `<timestamp> - <level> - <thread> - ` prefix.
fn body(line: &str) -> &str {
    line.splitn(4, " - ").nth(3).unwrap()
}

fn is_separator(line: &str, ch: char) -> bool {
    line.len() == 78 && line.chars().all(|c| c == ch)
}

#[test]
fn writes_expected_transcript_to_file_and_auto_closes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("debug.log");

    let log = Transcript::create(Some(&path));
    assert!(!log.is_inert());

    log.start_suite("Root").unwrap();
    log.start_test("Case1").unwrap();
    log.log_message(Level::Info, "hello").unwrap();
    log.end_test("Case1", Duration::from_millis(10)).unwrap();
    log.end_suite("Root", Duration::from_millis(15)).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let lines = contents.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 11, "unexpected transcript:\n{contents}");
    assert!(is_separator(lines[0], '='));
    assert_eq!(body(lines[1]), "+ START SUITE: Root");
    assert!(is_separator(lines[2], '='));
    assert_eq!(body(lines[3]), "+- START TEST: Case1");
    assert!(is_separator(lines[4], '-'));
    assert_eq!(body(lines[5]), "hello");
    assert!(is_separator(lines[6], '-'));
    assert_eq!(body(lines[7]), "+- END TEST: Case1 (10ms)");
    assert!(is_separator(lines[8], '-'));
    assert_eq!(body(lines[9]), "+ END SUITE: Root (15ms)");
    assert!(is_separator(lines[10], '='));

    // Ending the outermost suite has closed the transcript.
    assert!(matches!(log.log_message(Level::Info, "late"), Err(Error::Closed)));
}

#[test]
fn threshold_filters_file_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("debug.log");

    let log = Transcript::create(Some(&path))
        .with_threshold(Threshold::at_least(Level::Info));
    log.start_suite("Root").unwrap();
    log.log_message(Level::Debug, "dropped").unwrap();
    log.log_message(Level::Info, "kept").unwrap();
    log.end_suite("Root", Duration::from_millis(1)).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("dropped"));
    assert!(contents.contains("kept"));
}

#[test]
fn missing_path_yields_inert_writer() {
    let log = Transcript::create(None::<&str>);
    assert!(log.is_inert());
    log.start_suite("S").unwrap();
    log.end_suite("S", Duration::from_millis(1)).unwrap();
    log.close().unwrap();
}

#[test]
fn empty_path_yields_inert_writer() {
    let log = Transcript::create(Some(""));
    assert!(log.is_inert());
}

#[test]
fn unopenable_path_degrades_to_inert_writer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-subdir").join("debug.log");

    let log = Transcript::create(Some(&path));
    assert!(log.is_inert());
    log.start_suite("S").unwrap();
    assert!(!path.exists());
}

#[test]
fn open_reports_unopenable_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-subdir").join("debug.log");

    let err = Transcript::open(&path, debuglog::writer::WriteLock::default())
        .unwrap_err();
    assert!(matches!(err, Error::Open { .. }));
    assert!(err.to_string().contains("debug.log"));
}

#[test]
fn explicit_close_before_outermost_end_is_respected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("debug.log");

    let log = Transcript::create(Some(&path));
    log.start_suite("Root").unwrap();
    log.close().unwrap();
    log.close().unwrap();
    assert!(matches!(
        log.end_suite("Root", Duration::from_millis(1)),
        Err(Error::Closed),
    ));

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("START SUITE: Root"));
    assert!(!contents.contains("END SUITE"));
}
