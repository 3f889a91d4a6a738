use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::app::DEFAULT_ICON_SIZE;
use crate::utils::paths::expand_tilde;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub scan_locations: Vec<String>,
    pub icon_size: u32,
    /// Base of the per-user support locations; `~/Library` when unset.
    pub library_root: Option<String>,
    pub include_web_data: bool,
    pub protected_prefixes: Vec<String>,
    pub refuse_running: bool,
    pub askpass_helper: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            scan_locations: vec!["/Applications".into(), "/System/Applications".into()],
            icon_size: DEFAULT_ICON_SIZE,
            library_root: None,
            include_web_data: false,
            protected_prefixes: vec!["/System/Applications/".into(), "/System/Library/".into()],
            refuse_running: true,
            askpass_helper: None,
        }
    }
}

impl AppSettings {
    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unparsable.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid settings at {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("Failed to read settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("appdeck").join("settings.json"))
    }

    pub fn scan_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for loc in &self.scan_locations {
            let expanded = expand_tilde(loc);
            if !roots.contains(&expanded) {
                roots.push(expanded);
            }
        }
        roots
    }

    pub fn library_root(&self) -> PathBuf {
        match &self.library_root {
            Some(root) => expand_tilde(root),
            None => dirs::home_dir()
                .map(|h| h.join("Library"))
                .unwrap_or_else(|| PathBuf::from("~/Library")),
        }
    }

    pub fn askpass_helper(&self) -> Option<PathBuf> {
        self.askpass_helper.as_deref().map(expand_tilde)
    }

    pub fn is_protected(&self, app_path: &Path) -> bool {
        let path = app_path.to_string_lossy();
        self.protected_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}
