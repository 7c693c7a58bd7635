use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    Command::cargo_bin("bfrun").unwrap()
}

fn infinite_bf() -> &'static str {
    "+[]" // increments to 1, then [] does nothing forever (infinite loop)
}

fn program_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn step_limit_flag_aborts_infinite_program() {
    let tf = program_file(infinite_bf());
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env_remove("BF_TIMEOUT_MS")
        .arg("--max-steps")
        .arg("50")
        .arg("-f")
        .arg(tf.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (50)"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn step_limit_env_fallback_aborts_infinite_program() {
    let tf = program_file(infinite_bf());
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env_remove("BF_TIMEOUT_MS")
        .env("BF_MAX_STEPS", "50")
        .arg("-f")
        .arg(tf.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn timeout_flag_aborts_infinite_program() {
    let tf = program_file(infinite_bf());
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env_remove("BF_MAX_STEPS")
        .arg("--timeout")
        .arg("100")
        .arg("-f")
        .arg(tf.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn timeout_env_fallback_aborts_infinite_program() {
    let tf = program_file(infinite_bf());
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .env_remove("BF_MAX_STEPS")
        .env("BF_TIMEOUT_MS", "100")
        .arg("-f")
        .arg(tf.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Execution aborted").and(predicate::str::contains("timeout")));
}

#[test]
fn generous_step_limit_leaves_terminating_programs_alone() {
    let tf = program_file("+++[-].");
    cargo_bin()
        .timeout(Duration::from_secs(5))
        .arg("--max-steps")
        .arg("10000")
        .arg("-f")
        .arg(tf.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("\u{0}"));
}
