use std::path::PathBuf;
use std::sync::OnceLock;

static ASKPASS_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Resolve the askpass helper used by `sudo -A`, ensure it is executable, and
/// cache its path. The configured helper wins over `$SUDO_ASKPASS`.
/// Only the first call has any effect.
pub fn init_askpass_path(configured: Option<PathBuf>) {
    ASKPASS_PATH.get_or_init(|| {
        let script = configured.or_else(|| std::env::var_os("SUDO_ASKPASS").map(PathBuf::from))?;
        if !script.exists() {
            log::warn!("askpass helper not found at {}", script.display());
            return None;
        }

        // The executable bit may be lost when the helper is copied around.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(meta) = std::fs::metadata(&script) {
                let mut perms = meta.permissions();
                let mode = perms.mode();
                if mode & 0o111 == 0 {
                    perms.set_mode(mode | 0o755);
                    let _ = std::fs::set_permissions(&script, perms);
                }
            }
        }

        log::info!("askpass helper ready at {}", script.display());
        Some(script)
    });
}

/// Returns the cached path to the askpass helper, if available.
pub fn askpass_path() -> Option<&'static PathBuf> {
    ASKPASS_PATH.get().and_then(|p| p.as_ref())
}
