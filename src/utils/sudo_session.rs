use std::process::{Command, Output};
use std::sync::{LazyLock, Mutex, MutexGuard};

use thiserror::Error;

use crate::utils::askpass;

/// Error type for elevated command execution.
#[derive(Debug, Error)]
pub enum ElevatedError {
    #[error("User cancelled the password dialog")]
    UserCancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// The OS authorization subsystem is process-wide; at most one prompt may be
/// outstanding at a time.
static AUTHORIZATION_GATE: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Block until no other elevation request is pending in this process.
pub fn authorization_guard() -> MutexGuard<'static, ()> {
    AUTHORIZATION_GATE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Run a compound shell expression with elevated privileges.
///
/// 1. Tries `sudo -A sh -c "..."` when an askpass helper is configured
///    (no dialog if the sudo timestamp is still warm).
/// 2. Falls back to `osascript ... with administrator privileges` when no
///    helper is configured or sudo itself could not authenticate.
///
/// A non-zero exit of the elevated command is returned as `Ok(output)`; only
/// cancellation and spawn failures are errors.
pub fn run_elevated_shell(shell_cmd: &str) -> Result<Output, ElevatedError> {
    if let Some(ap) = askpass::askpass_path() {
        let output = Command::new("sudo")
            .current_dir("/tmp")
            .env("SUDO_ASKPASS", ap)
            .args(["-A", "sh", "-c", shell_cmd])
            .output()?;

        if output.status.success() {
            return Ok(output);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_cancellation(&stderr) {
            return Err(ElevatedError::UserCancelled);
        }
        if !is_sudo_auth_failure(&stderr) {
            // The command itself ran as root and failed; don't run it twice.
            return Ok(output);
        }
        log::debug!("sudo -A could not authenticate ({}), falling back to osascript", stderr.trim());
    }

    run_osascript_elevated(shell_cmd)
}

fn is_cancellation(stderr: &str) -> bool {
    stderr.contains("cancelled")
        || stderr.contains("dialog was dismissed")
        || stderr.contains("User canceled")
        || stderr.contains("(-128)")
}

/// sudo's own authentication errors, as opposed to the wrapped command's.
fn is_sudo_auth_failure(stderr: &str) -> bool {
    stderr.lines().any(|line| {
        line.starts_with("sudo:")
            && (line.contains("a password is required")
                || line.contains("no askpass program")
                || line.contains("incorrect password")
                || line.contains("a terminal is required"))
    })
}

/// Escape a string for use inside a shell command.
pub fn shell_escape(s: &str) -> String {
    if !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '/' || c == '.' || c == '-' || c == '_')
    {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}

/// Escape a string for use inside an AppleScript string literal.
pub fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Run a shell command via osascript with administrator privileges.
fn run_osascript_elevated(shell_cmd: &str) -> Result<Output, ElevatedError> {
    let output = Command::new("osascript")
        .current_dir("/tmp")
        .args([
            "-e",
            &format!(
                "do shell script \"{}\" with administrator privileges",
                applescript_escape(shell_cmd)
            ),
        ])
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_cancellation(&stderr) {
            return Err(ElevatedError::UserCancelled);
        }
    }

    Ok(output)
}
