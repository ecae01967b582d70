use std::path::Path;
use std::process::Command;

/// Spawn the CLI binary with `args`, returning (exit code, stdout, stderr).
pub fn run_cli(args: &[&str]) -> (i32, String, String) {
    let bin = env!("CARGO_BIN_EXE_codeloc");
    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to spawn codeloc");
    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

/// "haystack contains needle" with context on failure.
pub fn assert_contains_with_context(haystack: &str, needle: &str, context_msg: &str) {
    if haystack.contains(needle) {
        return;
    }
    let head = haystack.lines().take(10).collect::<Vec<_>>().join("\n");
    panic!(
        "{}\n--- needle ---\n{}\n--- head(10) ---\n{}",
        context_msg, needle, head
    );
}

/// Run the CLI and require a zero exit code.
pub fn run_ok(args: &[&str]) -> (String, String) {
    let (code, stdout, stderr) = run_cli(args);
    assert!(
        code == 0,
        "command {:?} failed with code {}.\nstdout:\n{}\nstderr:\n{}",
        args,
        code,
        stdout,
        stderr
    );
    (stdout, stderr)
}

pub fn path_str(path: &Path) -> String {
    path.display().to_string()
}
