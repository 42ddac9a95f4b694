//! Integration tests for the `gomn` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to run the actual binary:
//! stdin and file input, key lookup, every output format, CBOR round trips
//! through a file, and error reporting.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

const CONFIG: &str = r#"
// service configuration
[name] := "web"
[1] := one
["port"] := 8080
[server] := |
    [host] := localhost
    [tls] := | [enabled] := true |
|
[tags] := { "a", 'b', c }
"#;

fn gomn() -> Command {
    Command::cargo_bin("gomn").unwrap()
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("gomn-cli-{}-{}", std::process::id(), name))
}

// ─────────────────────────────────────────────────────────────────────────────
// Input and validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn prints_document_from_stdin() {
    gomn()
        .write_stdin(CONFIG)
        .assert()
        .success()
        .stdout(predicate::str::contains("name: \"web\""))
        .stdout(predicate::str::contains("1: one"))
        .stdout(predicate::str::contains("\"port\": 8080"));
}

#[test]
fn reads_file_argument() {
    let path = temp_path("input.gomn");
    std::fs::write(&path, CONFIG).unwrap();

    gomn()
        .arg("-f")
        .arg(&path)
        .arg("name")
        .assert()
        .success()
        .stdout("\"web\"\n");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn check_accepts_valid_input() {
    gomn()
        .arg("--check")
        .write_stdin(CONFIG)
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn check_rejects_invalid_input_with_diagnostic() {
    gomn()
        .arg("--check")
        .write_stdin("[1] := {1, 2")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("expected ',' or '}' in array"))
        .stderr(predicate::str::contains("^"));
}

#[test]
fn missing_file_is_an_error() {
    gomn()
        .args(["-f", "/nonexistent/gomn/input.gomn"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error reading"));
}

#[test]
fn unknown_option_is_an_error() {
    gomn()
        .arg("--frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown option"));
}

#[test]
fn unknown_format_is_an_error() {
    gomn()
        .args(["-t", "json"])
        .write_stdin(CONFIG)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format: json"));
}

#[test]
fn version_and_help() {
    gomn()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("gomn "));
    gomn()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("USAGE:"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Key lookup
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn looks_up_integer_key() {
    gomn()
        .arg("1")
        .write_stdin(CONFIG)
        .assert()
        .success()
        .stdout("one\n");
}

#[test]
fn bare_word_falls_back_to_string_key() {
    gomn()
        .arg("port")
        .write_stdin(CONFIG)
        .assert()
        .success()
        .stdout("8080\n");
}

#[test]
fn quoted_key_does_not_match_identifier() {
    gomn()
        .arg("\"name\"")
        .write_stdin(CONFIG)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn follows_nested_path() {
    gomn()
        .args(["server", "tls", "enabled"])
        .write_stdin(CONFIG)
        .assert()
        .success()
        .stdout("true\n");
}

#[test]
fn missing_key_exits_quietly() {
    gomn()
        .args(["server", "nope"])
        .write_stdin(CONFIG)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn negative_key_after_double_dash() {
    gomn()
        .args(["--", "-1"])
        .write_stdin("[-1] := minus_one")
        .assert()
        .success()
        .stdout("minus_one\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Output formats
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn converts_to_yaml() {
    gomn()
        .args(["-t", "yaml", "server"])
        .write_stdin(CONFIG)
        .assert()
        .success()
        .stdout("host: localhost\ntls:\n  enabled: true\n");
}

#[test]
fn converts_to_toml() {
    gomn()
        .args(["-t", "toml", "server"])
        .write_stdin(CONFIG)
        .assert()
        .success()
        .stdout(predicate::str::contains("host = \"localhost\""))
        .stdout(predicate::str::contains("[tls]"));
}

#[test]
fn toml_rejects_integer_keys() {
    gomn()
        .args(["-t", "toml"])
        .write_stdin(CONFIG)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot convert to TOML"));
}

#[test]
fn cbor_diagnostic_notation() {
    gomn()
        .args(["-t", "diag"])
        .write_stdin("[a] := 1")
        .assert()
        .success()
        .stdout(predicate::str::contains("39(\"a\")"));
}

#[test]
fn cbor_requires_a_document() {
    gomn()
        .args(["-t", "cbor", "name"])
        .write_stdin(CONFIG)
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a document"));
}

#[test]
fn cbor_round_trip_through_file() {
    let path = temp_path("roundtrip.cbor");

    gomn()
        .args(["-t", "cbor", "-o"])
        .arg(&path)
        .write_stdin(CONFIG)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let bytes = std::fs::read(&path).unwrap();
    assert!(!bytes.is_empty());

    gomn()
        .args(["-F", "cbor", "-f"])
        .arg(&path)
        .args(["server", "host"])
        .assert()
        .success()
        .stdout("localhost\n");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn cbor_input_rejects_garbage() {
    gomn()
        .args(["-F", "cbor"])
        .write_stdin(&b"\xff\x00"[..])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn verbose_logs_to_stderr() {
    gomn()
        .args(["-v", "name"])
        .write_stdin(CONFIG)
        .assert()
        .success()
        .stdout("\"web\"\n")
        .stderr(predicate::str::contains("document loaded"));
}
