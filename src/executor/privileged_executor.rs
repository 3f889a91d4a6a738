use std::path::PathBuf;
use std::sync::Arc;

use super::{finder_trash_script, ElevatedRunner};
use crate::models::ElevationOutcome;
use crate::utils::sudo_session::{authorization_guard, shell_escape, ElevatedError};

/// Elevated pass for whatever the unprivileged pass could not move.
///
/// All paths go into one batch behind a single authorization prompt.
/// Paths inside the sandbox-container root are skipped: no privilege level
/// available to us can remove them and the OS cleans them up itself.
#[derive(Clone)]
pub struct PrivilegedExecutor {
    container_root: PathBuf,
    runner: Arc<dyn ElevatedRunner>,
}

impl PrivilegedExecutor {
    pub fn new(container_root: PathBuf, runner: Arc<dyn ElevatedRunner>) -> Self {
        Self { container_root, runner }
    }

    pub fn escalate_and_remove(&self, paths: &[PathBuf]) -> ElevationOutcome {
        let (protected, remaining): (Vec<&PathBuf>, Vec<&PathBuf>) =
            paths.iter().partition(|p| p.starts_with(&self.container_root));

        for path in &protected {
            log::debug!("Skipping sandbox container {}", path.display());
        }
        if remaining.is_empty() {
            log::info!("Nothing left to remove with elevation");
            return ElevationOutcome::AllRemoved;
        }

        let shell_cmd = format!("osascript -e {}", shell_escape(&finder_trash_script(&remaining)));

        let _gate = authorization_guard();
        log::info!("Requesting authorization to remove {} paths", remaining.len());
        match self.runner.run_elevated_shell(&shell_cmd) {
            Ok(output) if output.status.success() => ElevationOutcome::AllRemoved,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
                let diagnostics = if !stderr.is_empty() {
                    stderr
                } else if !stdout.is_empty() {
                    stdout
                } else {
                    format!("elevated removal exited with {}", output.status)
                };
                log::warn!("Elevated removal failed: {}", diagnostics);
                ElevationOutcome::PartialOrAuthFailure(diagnostics)
            }
            Err(ElevatedError::UserCancelled) => {
                log::info!("Authorization cancelled by user");
                ElevationOutcome::Cancelled
            }
            Err(e) => {
                log::warn!("Elevation failed: {}", e);
                ElevationOutcome::PartialOrAuthFailure(e.to_string())
            }
        }
    }
}
