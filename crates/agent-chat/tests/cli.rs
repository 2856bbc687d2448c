//! End-to-end checks of the `agent-chat` binary.
//!
//! Each test runs the built binary in an empty temp directory with a cleared
//! environment, so no `.env` file or ambient credential leaks in. None of
//! these reach the network.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run(args: &[&str], envs: &[(&str, &str)], stdin: &str) -> Output {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_agent-chat"))
        .args(args)
        .current_dir(dir.path())
        .env_clear()
        .envs(envs.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child.stdin.take().unwrap().write_all(stdin.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_exit_command_ends_shell_cleanly() {
    let output = run(&["chat"], &[("OPENAI_API_KEY", "sk-test")], "/exit\n");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr);
    assert!(stdout.contains("Goodbye!"));
    assert!(!stdout.contains("Agent:"));
    assert!(!stdout.contains("You:"));
}

#[test]
fn test_end_of_input_ends_shell_cleanly() {
    let output = run(&[], &[("OPENAI_API_KEY", "sk-test")], "");

    assert_eq!(output.status.code(), Some(0));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Agent:"));
}

#[test]
fn test_missing_api_key_is_fatal() {
    let output = run(&["chat"], &[], "/exit\n");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("OPENAI_API_KEY is not set"), "stderr: {}", stderr);
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Goodbye!"));
}

#[test]
fn test_ask_without_api_key_is_fatal() {
    let output = run(&["ask", "What's 2+2 times 3?"], &[], "");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("OPENAI_API_KEY"));
}
