pub mod privileged_executor;
pub mod trash_executor;

use std::path::Path;
use std::process::{Command, Output};

use crate::utils::sudo_session::{self, applescript_escape, ElevatedError};
use crate::utils::{AppError, AppResult};

pub use privileged_executor::PrivilegedExecutor;
pub use trash_executor::TrashExecutor;

/// Moves one path to the recoverable trash with the current user's rights.
pub trait Trasher: Send + Sync {
    fn trash(&self, path: &Path) -> AppResult<()>;
}

/// Runs a shell command behind an authorization prompt.
pub trait ElevatedRunner: Send + Sync {
    fn run_elevated_shell(&self, shell_cmd: &str) -> Result<Output, ElevatedError>;
}

/// Move to Trash via Finder AppleScript (reversible, "Put Back" works).
#[derive(Debug, Clone, Copy, Default)]
pub struct FinderTrash;

impl Trasher for FinderTrash {
    fn trash(&self, path: &Path) -> AppResult<()> {
        let output = Command::new("osascript")
            .current_dir("/tmp")
            .args(["-e", &finder_trash_script(&[path])])
            .output()
            .map_err(|e| AppError::CommandFailed(format!("Failed to run osascript: {}", e)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(AppError::CommandFailed(format!("Finder trash failed: {}", stderr.trim())))
        }
    }
}

/// `sudo -A` with an osascript administrator-privileges fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct SudoRunner;

impl ElevatedRunner for SudoRunner {
    fn run_elevated_shell(&self, shell_cmd: &str) -> Result<Output, ElevatedError> {
        sudo_session::run_elevated_shell(shell_cmd)
    }
}

/// One Finder `move ... to trash` statement covering every path.
pub fn finder_trash_script<P: AsRef<Path>>(paths: &[P]) -> String {
    let files: Vec<String> = paths
        .iter()
        .map(|p| format!("POSIX file \"{}\"", applescript_escape(&p.as_ref().to_string_lossy())))
        .collect();
    format!("tell application \"Finder\" to move {{{}}} to trash", files.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_lists_every_path() {
        let script = finder_trash_script(&["/Applications/Foo.app", "/Users/me/Library/Caches/com.x"]);
        assert_eq!(
            script,
            "tell application \"Finder\" to move {POSIX file \"/Applications/Foo.app\", \
             POSIX file \"/Users/me/Library/Caches/com.x\"} to trash"
        );
    }

    #[test]
    fn script_escapes_quotes() {
        let script = finder_trash_script(&[r#"/tmp/a "quoted" app.app"#]);
        assert!(script.contains(r#"POSIX file "/tmp/a \"quoted\" app.app""#));
    }
}
