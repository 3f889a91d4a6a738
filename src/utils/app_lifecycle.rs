use std::path::Path;
use std::process::{Command, Stdio};

/// Check if an app is currently running by its bundle path.
pub fn is_app_running(app_path: &Path) -> bool {
    let output = Command::new("pgrep")
        .current_dir("/tmp")
        .arg("-f")
        .arg(app_path)
        .output();
    match output {
        Ok(o) => o.status.success(),
        Err(_) => false,
    }
}

/// Open a bundle with the default application handler. Fire-and-forget.
pub fn open_app(app_path: &Path) {
    let spawned = Command::new("open")
        .current_dir("/tmp")
        .arg(app_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    if let Err(e) = spawned {
        log::warn!("Failed to open {}: {}", app_path.display(), e);
    }
}
