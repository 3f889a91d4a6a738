use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::imageops::FilterType;

use crate::models::AppIcon;
use crate::utils::{plist_parser, AppError, AppResult};

/// Resolves a bundle's icon as a square bitmap.
pub trait IconResolver: Send + Sync {
    /// Edge length icons are normalized to.
    fn icon_size(&self) -> u32;

    fn resolve(&self, app_path: &Path, size: u32) -> AppResult<AppIcon>;
}

/// Extracts icons with the macOS command-line tools, trying in order:
///
/// 1. `sips` with `CFBundleIconFile` (traditional `.icns` files)
/// 2. Any `.icns` in `Contents/Resources/`
/// 3. `qlmanage` thumbnail (asset catalogs and everything else)
#[derive(Debug, Clone)]
pub struct SystemIconResolver {
    size: u32,
}

impl SystemIconResolver {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }
}

impl IconResolver for SystemIconResolver {
    fn icon_size(&self) -> u32 {
        self.size
    }

    fn resolve(&self, app_path: &Path, size: u32) -> AppResult<AppIcon> {
        let tmp_dir = tempfile::tempdir()?;
        let output_path = tmp_dir.path().join("icon.png");

        let png = try_sips_cfbundle_icon_file(app_path, &output_path, size)
            .or_else(|| try_glob_icns(app_path, &output_path, size))
            .or_else(|| try_qlmanage(app_path, tmp_dir.path(), size))
            .ok_or_else(|| {
                AppError::NotFound(format!("no icon for {}", app_path.display()))
            })?;

        load_normalized(&png, size)
    }
}

/// Decode `png` and scale it to exactly `size`×`size`.
pub fn load_normalized(png: &Path, size: u32) -> AppResult<AppIcon> {
    let decoded = image::open(png)?;
    let resized = if decoded.width() == size && decoded.height() == size {
        decoded
    } else {
        decoded.resize_exact(size, size, FilterType::Lanczos3)
    };
    Ok(AppIcon::new(resized.to_rgba8()))
}

/// Only `CFBundleIconFile` names a `.icns`; `CFBundleIconName` refers to an
/// asset catalog entry.
fn try_sips_cfbundle_icon_file(app_path: &Path, output_path: &Path, size: u32) -> Option<PathBuf> {
    let dict = plist_parser::read_info_plist(app_path).ok()?;
    let icon_name = plist_parser::get_string(&dict, "CFBundleIconFile")?;

    let mut icon_path = app_path.join("Contents/Resources").join(&icon_name);
    if icon_path.extension().is_none() {
        icon_path.set_extension("icns");
    }

    if !icon_path.exists() {
        log::debug!("CFBundleIconFile '{}' not found at {}", icon_name, icon_path.display());
        return None;
    }

    convert_icns_with_sips(&icon_path, output_path, size)
}

/// Prefer AppIcon.icns, otherwise the first `.icns` found.
fn try_glob_icns(app_path: &Path, output_path: &Path, size: u32) -> Option<PathBuf> {
    let resources_dir = app_path.join("Contents/Resources");
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(&resources_dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("icns"))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    let icns_path = candidates
        .iter()
        .find(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().eq_ignore_ascii_case("AppIcon.icns"))
                .unwrap_or(false)
        })
        .or_else(|| candidates.first())?;

    convert_icns_with_sips(icns_path, output_path, size)
}

fn try_qlmanage(app_path: &Path, output_dir: &Path, size: u32) -> Option<PathBuf> {
    let output = Command::new("qlmanage")
        .arg("-t")
        .arg("-s")
        .arg(size.to_string())
        .arg("-o")
        .arg(output_dir)
        .arg(app_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(output) if output.status.success() => {
            // qlmanage writes <input_name>.png into the output dir
            let png = std::fs::read_dir(output_dir)
                .ok()?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .find(|p| {
                    p.extension().map(|ext| ext == "png").unwrap_or(false)
                        && p.file_name().map(|n| n != "icon.png").unwrap_or(false)
                });
            if png.is_none() {
                log::debug!("qlmanage succeeded but wrote no PNG for {}", app_path.display());
            }
            png
        }
        Ok(_) => {
            log::debug!("qlmanage exited with non-zero status for {}", app_path.display());
            None
        }
        Err(e) => {
            log::debug!("qlmanage failed to execute: {}", e);
            None
        }
    }
}

fn convert_icns_with_sips(icns_path: &Path, output_path: &Path, size: u32) -> Option<PathBuf> {
    let size = size.to_string();
    let output = Command::new("sips")
        .args(["-s", "format", "png", "-z", &size, &size])
        .arg(icns_path)
        .arg("--out")
        .arg(output_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(output) if output.status.success() && output_path.exists() => {
            Some(output_path.to_path_buf())
        }
        Ok(_) => {
            log::debug!("sips failed for {}", icns_path.display());
            None
        }
        Err(e) => {
            log::debug!("sips command error: {}", e);
            None
        }
    }
}
