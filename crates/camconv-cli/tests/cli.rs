use std::fs;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const CLINES: &str = "\
# client lines
C: 192.168.1.1 12000 user1 pass1
C: 10.0.0.2 12x00 user2 pass2
C: box.lan 12001 user3 pass3 yes
";

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("camconv"))
}

fn write_input(temp: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = temp.path().join(name);
    fs::write(&path, contents).expect("write input");
    path
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("convert").and(contains("batch")).and(contains("protocols")));
    cmd().arg("convert").arg("--help").assert().success();
}

#[test]
fn protocols_are_listed() {
    cmd()
        .arg("protocols")
        .assert()
        .success()
        .stdout(
            contains("cccam")
                .and(contains("12000"))
                .and(contains("[reader]"))
                .and(contains(".server")),
        );
}

#[test]
fn convert_to_stdout_renders_document() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_input(&temp, "CCcam.cfg", CLINES);

    let assert = cmd()
        .arg("convert")
        .arg(&input)
        .args(["--from", "cccam", "--to", "mgcamd", "--no-timestamp"])
        .assert()
        .success()
        .stderr(contains("line 3:").and(contains("2 converted, 1 failed")));
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    assert_eq!(
        stdout,
        "# MGcamd configuration\n# Total records: 2\n\n\
         M: 192.168.1.1 12000 user1 pass1\nM: box.lan 12001 user3 pass3\n"
    );
}

#[test]
fn convert_reads_stdin() {
    cmd()
        .args(["convert", "-", "--from", "cccam", "--to", "newcamd"])
        .write_stdin("C: 192.168.1.1 12000 user1 pass1\n")
        .assert()
        .success()
        .stdout(
            contains("# Generated: ")
                .and(contains("N: 192.168.1.1 12000 user1 pass1 0102030405060708091011121314")),
        )
        .stderr(contains("warning (des_key)"));
}

#[test]
fn convert_writes_output_file() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_input(&temp, "CCcam.cfg", CLINES);
    let output = temp.path().join("out").join("oscam.server");

    cmd()
        .arg("convert")
        .arg(&input)
        .args(["--from", "cccam", "--to", "oscam", "--quiet", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout("")
        .stderr(contains("line 3:").and(contains("warning").not()));

    let written = fs::read_to_string(&output).expect("read output");
    assert!(written.starts_with("# OSCam configuration\n"));
    assert!(written.contains("label = user1_192_168_1_1\n"));
    assert!(written.contains("device = box.lan,12001\n"));
}

#[test]
fn json_output_lists_every_entry() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_input(&temp, "CCcam.cfg", CLINES);

    let assert = cmd()
        .arg("convert")
        .arg(&input)
        .args(["--from", "cccam", "--to", "cccam", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["succeeded"], 2);
    assert_eq!(value["failed"], 1);
    assert_eq!(value["entries"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["entries"][1]["result"]["Err"]["field"], "port");
}

#[test]
fn pretty_and_compact_conflict() {
    cmd()
        .args(["convert", "-", "--from", "cccam", "--to", "oscam", "--pretty", "--compact"])
        .assert()
        .failure();
}

#[test]
fn stdout_and_output_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_input(&temp, "CCcam.cfg", CLINES);

    cmd()
        .arg("convert")
        .arg(&input)
        .args(["--from", "cccam", "--to", "oscam", "--stdout", "-o"])
        .arg(temp.path().join("out.server"))
        .assert()
        .failure();
}

#[test]
fn strict_fails_when_records_fail() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_input(&temp, "CCcam.cfg", CLINES);

    cmd()
        .arg("convert")
        .arg(&input)
        .args(["--from", "cccam", "--to", "newcamd", "--strict"])
        .assert()
        .code(2)
        .stderr(contains("error: 1 of 3 records failed").and(contains("hint:")));
}

#[test]
fn unknown_protocol_shows_error_and_hint() {
    cmd()
        .args(["convert", "-", "--from", "cccam", "--to", "Foo"])
        .write_stdin("C: h 1 u p\n")
        .assert()
        .code(2)
        .stdout("")
        .stderr(contains("error: unsupported protocol 'Foo'").and(contains("hint:")));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.cfg");

    cmd()
        .arg("convert")
        .arg(missing)
        .args(["--from", "cccam", "--to", "oscam"])
        .assert()
        .code(2)
        .stderr(contains("error: input file not found").and(contains("hint:")));
}

#[test]
fn output_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_input(&temp, "CCcam.cfg", CLINES);

    cmd()
        .arg("convert")
        .arg(&input)
        .args(["--from", "cccam", "--to", "cccam", "-o"])
        .arg(&input)
        .assert()
        .code(2)
        .stderr(contains("output path must differ from input"));
    assert_eq!(fs::read_to_string(&input).expect("read input"), CLINES);
}

#[test]
fn glob_matching_several_files_is_rejected_for_convert() {
    let temp = TempDir::new().expect("tempdir");
    write_input(&temp, "a.cfg", CLINES);
    write_input(&temp, "b.cfg", CLINES);
    let pattern = temp.path().join("*.cfg");

    cmd()
        .arg("convert")
        .arg(pattern)
        .args(["--from", "cccam", "--to", "oscam"])
        .assert()
        .code(2)
        .stderr(contains("multiple files match pattern").and(contains("camconv batch")));
}

#[test]
fn batch_converts_every_matching_file() {
    let temp = TempDir::new().expect("tempdir");
    write_input(&temp, "east.cfg", "C: 10.0.0.1 12000 a pa\n");
    write_input(&temp, "west.cfg", CLINES);
    write_input(&temp, "notes.txt", "not a config\n");
    let out_dir = temp.path().join("converted");
    let pattern = temp.path().join("*.cfg");

    cmd()
        .arg("batch")
        .arg(pattern.to_string_lossy().as_ref())
        .args(["--from", "cccam", "--to", "mgcamd", "--no-timestamp", "--out-dir"])
        .arg(&out_dir)
        .assert()
        .success()
        .stderr(contains("east.cfg").and(contains("west.cfg")));

    let east = fs::read_to_string(out_dir.join("east.list")).expect("read east.list");
    assert_eq!(
        east,
        "# MGcamd configuration\n# Total records: 1\n\nM: 10.0.0.1 12000 a pa\n"
    );
    let west = fs::read_to_string(out_dir.join("west.list")).expect("read west.list");
    assert!(west.contains("# Total records: 2\n"));
    assert!(!out_dir.join("notes.list").exists());
}

#[test]
fn batch_strict_reports_failures() {
    let temp = TempDir::new().expect("tempdir");
    write_input(&temp, "west.cfg", CLINES);
    let pattern = temp.path().join("*.cfg");

    cmd()
        .arg("batch")
        .arg(pattern.to_string_lossy().as_ref())
        .args(["--from", "cccam", "--to", "oscam", "--strict", "--quiet", "--out-dir"])
        .arg(temp.path().join("out"))
        .assert()
        .code(2)
        .stderr(contains("west.cfg: line 3:").and(contains("1 of 3 records failed")));
}

#[test]
fn batch_without_matches_fails() {
    let temp = TempDir::new().expect("tempdir");
    let pattern = temp.path().join("*.cfg");

    cmd()
        .arg("batch")
        .arg(pattern.to_string_lossy().as_ref())
        .args(["--from", "cccam", "--to", "oscam", "--out-dir"])
        .arg(temp.path().join("out"))
        .assert()
        .code(2)
        .stderr(contains("no files match pattern"));
}

#[test]
fn auto_source_converts_mixed_input() {
    let mixed = "\
# mixed list
C: 192.168.1.1 12000 user1 pass1
n: box.lan 15000 user2 pass2 0102030405060708091011121314

[reader]
label = remote
device = 10.0.0.9,988
user = user3
password = pass3
caid = 0500

host 1 u p
";

    let assert = cmd()
        .args(["convert", "-", "--from", "auto", "--to", "mgcamd", "--no-timestamp"])
        .write_stdin(mixed)
        .assert()
        .success()
        .stderr(contains("line 12:").and(contains("3 converted, 1 failed")));
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    assert_eq!(
        stdout,
        "# MGcamd configuration\n# Total records: 3\n\n\
         M: 192.168.1.1 12000 user1 pass1\n\
         M: box.lan 15000 user2 pass2 0102030405060708091011121314\n\
         M: 10.0.0.9 988 user3 pass3\n"
    );
}

#[test]
fn auto_source_json_has_no_fixed_source() {
    let assert = cmd()
        .args(["convert", "-", "--from", "Auto", "--to", "cccam", "--json"])
        .write_stdin("M: h 15000 u p\nC: i 12000 v q\n")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["source"], Value::Null);
    assert_eq!(value["succeeded"], 2);
    assert_eq!(
        value["entries"][0]["result"]["Ok"]["record"]["source_protocol"],
        "mgcamd"
    );
}

#[test]
fn auto_is_rejected_as_target() {
    cmd()
        .args(["convert", "-", "--from", "cccam", "--to", "auto"])
        .write_stdin("C: h 1 u p\n")
        .assert()
        .code(2)
        .stderr(contains("unsupported protocol 'auto'"));
}
