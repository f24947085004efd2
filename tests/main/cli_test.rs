//! CLI startup contract: configuration is checked before any network call.

use assert_cmd::Command;

struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// Command with a clean environment pointing at files inside the sandbox.
    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::cargo_bin("homework-bot").expect("binary should build");
        cmd.env_clear()
            .current_dir(self.dir.path())
            .env("HOMEWORK_BOT_CONFIG", self.dir.path().join("absent.toml"))
            .env("HOMEWORK_BOT_LOG_DIR", self.dir.path().join("logs"))
            .arg("--env-file")
            .arg(self.dir.path().join(".env"))
            .args(args);
        cmd
    }
}

#[test]
fn start_without_secrets_fails() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .command(&["start"])
        .timeout(std::time::Duration::from_secs(30))
        .output()
        .expect("process should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("PRACTICUM_TOKEN"),
        "stderr should name the missing variable: {stderr}"
    );
}

#[test]
fn start_with_empty_chat_id_fails() {
    let sandbox = Sandbox::new();
    std::fs::write(
        sandbox.dir.path().join(".env"),
        "PRACTICUM_TOKEN=token\nTELEGRAM_TOKEN=123:bot\nTELEGRAM_CHAT_ID=\n",
    )
    .expect("write .env");

    let output = sandbox
        .command(&["start"])
        .timeout(std::time::Duration::from_secs(30))
        .output()
        .expect("process should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TELEGRAM_CHAT_ID"), "stderr: {stderr}");
}

#[test]
fn check_with_empty_endpoint_fails() {
    let sandbox = Sandbox::new();
    std::fs::write(
        sandbox.dir.path().join(".env"),
        "PRACTICUM_TOKEN=token\nTELEGRAM_TOKEN=123:bot\nTELEGRAM_CHAT_ID=1\nHOMEWORK_BOT_ENDPOINT=\n",
    )
    .expect("write .env");

    let output = sandbox
        .command(&["check"])
        .timeout(std::time::Duration::from_secs(30))
        .output()
        .expect("process should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("HOMEWORK_BOT_ENDPOINT"), "stderr: {stderr}");
}

#[test]
fn help_lists_subcommands() {
    let output = Command::cargo_bin("homework-bot")
        .expect("binary should build")
        .arg("--help")
        .output()
        .expect("process should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("start"));
    assert!(stdout.contains("check"));
}
