use jeka_util::process::CommandBuilder;

#[test]
fn test_builder_simple_command() {
    let output = CommandBuilder::new("echo").arg("hello").exec().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "hello");
}

#[cfg(unix)]
#[test]
fn test_builder_with_env() {
    let output = CommandBuilder::new("sh")
        .arg("-c")
        .arg("echo $MY_TEST_VAR")
        .env("MY_TEST_VAR", "jeka_test_value")
        .exec()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "jeka_test_value");
}

#[cfg(unix)]
#[test]
fn test_builder_with_cwd() {
    let tmp = tempfile::TempDir::new().unwrap();
    std::fs::write(tmp.path().join("jeka_cwd_test.marker"), "ok").unwrap();
    let output = CommandBuilder::new("ls")
        .arg("jeka_cwd_test.marker")
        .cwd(tmp.path())
        .exec()
        .unwrap();
    assert!(output.status.success());
}

#[test]
fn test_builder_nonexistent_program() {
    assert!(CommandBuilder::new("nonexistent_program_xyz_123").exec().is_err());
}

#[cfg(unix)]
#[test]
fn test_exec_checked_reports_failure() {
    let err = CommandBuilder::new("sh")
        .args(["-c", "echo boom >&2; exit 3"])
        .exec_checked()
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("boom"), "got: {message}");
}

#[test]
fn test_display_joins_program_and_args() {
    let cmd = CommandBuilder::new("jeka").args(["tree", "--scope", "compile"]);
    assert_eq!(cmd.to_string(), "jeka tree --scope compile");
}
