use plist::Value;
use std::path::Path;

use crate::utils::{AppError, AppResult};

/// Descriptor location inside an application bundle.
pub const INFO_PLIST: &str = "Contents/Info.plist";

pub fn read_info_plist(app_path: &Path) -> AppResult<plist::Dictionary> {
    let plist_path = app_path.join(INFO_PLIST);
    let val = Value::from_file(&plist_path)?;
    val.into_dictionary()
        .ok_or_else(|| AppError::Custom("Info.plist is not a dictionary".into()))
}

pub fn get_string(dict: &plist::Dictionary, key: &str) -> Option<String> {
    dict.get(key)?.as_string().map(String::from)
}
