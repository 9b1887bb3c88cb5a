//! Helpers for the external tools Reelsmith shells out to.

use std::process::Command;

/// Whether `binary` resolves on `PATH`.
///
/// The name is passed as a positional argument, never spliced into the script.
pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(r#"command -v "$1" >/dev/null 2>&1"#)
        .arg("sh")
        .arg(binary)
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Decode captured process output, replacing invalid UTF-8.
pub fn lossy_output(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}
