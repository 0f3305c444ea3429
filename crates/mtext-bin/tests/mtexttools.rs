use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn plain_strips_formatting() {
    let mut cmd = Command::cargo_bin("mtexttools").unwrap();
    cmd.args(["plain", r"{\C1;Red} Normal"]);
    cmd.assert().success().stdout("Red Normal\n");
}

#[test]
fn fonts_are_lowercased_and_stripped() {
    let mut cmd = Command::cargo_bin("mtexttools").unwrap();
    cmd.args(["fonts", r"\fArial.ttf|b1;x\FISOCP;y"]);
    cmd.assert().success().stdout("arial\nisocp\n");
}

#[test]
fn tokenize_prints_one_token_per_line() {
    let mut cmd = Command::cargo_bin("mtexttools").unwrap();
    cmd.args(["tokenize", "Hello World"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Word(\"Hello\")").and(predicate::str::contains("Space")));
}

#[test]
fn tokenize_json_includes_the_state() {
    let mut cmd = Command::cargo_bin("mtexttools").unwrap();
    cmd.args(["tokenize", "--json", r"\C1;Hi"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"Word\"").and(predicate::str::contains("\"state\"")));
}

#[test]
fn missing_input_fails() {
    let mut cmd = Command::cargo_bin("mtexttools").unwrap();
    cmd.args(["plain"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("provide MTEXT content or --path"));
}
