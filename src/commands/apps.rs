use std::path::Path;

use serde::Serialize;

use crate::detection::AppScanner;
use crate::models::ApplicationRecord;
use crate::platform::icon_extractor::IconResolver;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSummary {
    pub display_name: String,
    pub app_path: String,
    pub bundle_id: Option<String>,
}

impl From<&ApplicationRecord> for AppSummary {
    fn from(app: &ApplicationRecord) -> Self {
        Self {
            display_name: app.display_name().to_string(),
            app_path: app.identity().to_string_lossy().to_string(),
            bundle_id: app.bundle_identifier().map(String::from),
        }
    }
}

/// Rescan and return the freshly published list.
pub async fn get_all_apps(scanner: &AppScanner) -> Vec<AppSummary> {
    scanner.scan().await.iter().map(AppSummary::from).collect()
}

/// Resolve `query` (bundle path or display name) against a fresh scan.
pub async fn find_app(scanner: &AppScanner, query: &str) -> AppResult<ApplicationRecord> {
    scanner.scan().await;
    scanner
        .find(query)
        .ok_or_else(|| AppError::NotFound(format!("No application matching '{}'", query)))
}

pub fn open_app(app: &ApplicationRecord) {
    app.launch();
}

/// Write the record's normalized icon to `out` as PNG.
pub fn export_icon(app: &ApplicationRecord, resolver: &dyn IconResolver, out: &Path) -> AppResult<bool> {
    let icon = app.icon(resolver);
    std::fs::write(out, icon.to_png()?)?;
    Ok(!icon.placeholder)
}
