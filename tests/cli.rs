/*
Copyright 2021 Google LLC

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

     https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

/// Running without a log file positional prints the usage banner and exits
/// non-zero (clap's `ArgRequiredElseHelp`, per spec.md §6).
#[test]
fn no_args_prints_usage_and_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("llq")?;
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("USAGE").or(predicate::str::contains("llq")));
    Ok(())
}

/// An invalid filter expression passed via `--query` fails fast instead of
/// starting the interactive UI.
#[test]
fn invalid_query_expression_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut tmp = tempfile::NamedTempFile::new()?;
    writeln!(tmp, "{{\"msg\": \"hi\"}}")?;

    let mut cmd = Command::cargo_bin("llq")?;
    cmd.arg(tmp.path()).arg("--query").arg("(((");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid query expression"));
    Ok(())
}

/// `--query` runs a single filter over the whole file, newest match first,
/// and exits zero without ever touching the terminal UI.
#[test]
fn one_shot_query_prints_matches_newest_first() -> Result<(), Box<dyn std::error::Error>> {
    let mut tmp = tempfile::NamedTempFile::new()?;
    writeln!(tmp, "{{\"msg\": \"first message\", \"count\": 1}}")?;
    writeln!(tmp, "{{\"msg\": \"hi\", \"count\": 2}}")?;
    writeln!(tmp, "{{\"msg\": \"4th message\", \"count\": 4}}")?;
    tmp.flush()?;

    let mut cmd = Command::cargo_bin("llq")?;
    cmd.arg(tmp.path()).arg("--query").arg("msg");

    let expected = "msg: \"4th message\"\nmsg: \"hi\"\nmsg: \"first message\"\n";
    cmd.assert().success().stdout(predicate::eq(expected));
    Ok(())
}

/// `--max-matches` caps how many of the newest matches `--query` prints.
#[test]
fn one_shot_query_respects_max_matches() -> Result<(), Box<dyn std::error::Error>> {
    let mut tmp = tempfile::NamedTempFile::new()?;
    writeln!(tmp, "{{\"count\": 1}}")?;
    writeln!(tmp, "{{\"count\": 2}}")?;
    writeln!(tmp, "{{\"count\": 3}}")?;
    tmp.flush()?;

    let mut cmd = Command::cargo_bin("llq")?;
    cmd.arg(tmp.path())
        .arg("--query")
        .arg("count")
        .arg("--max-matches")
        .arg("2");

    cmd.assert()
        .success()
        .stdout(predicate::eq("count: 3\ncount: 2\n"));
    Ok(())
}

/// A query that matches nothing prints no lines but still exits zero.
#[test]
fn one_shot_query_with_no_matches_prints_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let mut tmp = tempfile::NamedTempFile::new()?;
    writeln!(tmp, "{{\"msg\": \"hi\"}}")?;
    tmp.flush()?;

    let mut cmd = Command::cargo_bin("llq")?;
    cmd.arg(tmp.path()).arg("--query").arg("nonexistent == 1");

    cmd.assert().success().stdout(predicate::eq(""));
    Ok(())
}

/// A missing log file fails with a readable error rather than panicking.
#[test]
fn missing_log_file_fails_cleanly() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("llq")?;
    cmd.arg("/nonexistent/path/to/log.ndjson")
        .arg("--query")
        .arg("msg");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to open log file"));
    Ok(())
}
