use std::fs;
use std::path::Path;

use super::bundle_reader;
use crate::models::{ApplicationRecord, BUNDLE_SUFFIX};

/// List the immediate `*.app` entries of `dir` in directory order.
///
/// Missing or unreadable roots contribute nothing.
pub fn scan_directory(dir: &Path) -> Vec<ApplicationRecord> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("Skipping {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut apps = Vec::new();
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(display_name) = name.strip_suffix(BUNDLE_SUFFIX) else {
            continue;
        };

        let app_path = entry.path();
        let bundle_id = bundle_reader::read_identifier(&app_path);
        if let Some(record) = ApplicationRecord::new(app_path, display_name.to_string(), bundle_id) {
            apps.push(record);
        }
    }
    apps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::bundle_reader::fixtures::make_bundle;

    #[test]
    fn only_exact_suffix_matches() {
        let dir = tempfile::tempdir().unwrap();
        make_bundle(dir.path(), "Foo.app", None);
        make_bundle(dir.path(), "Shout.APP", None);
        make_bundle(dir.path(), "Helper.appex", None);
        std::fs::write(dir.path().join("README.txt"), "x").unwrap();

        let apps = scan_directory(dir.path());
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].display_name(), "Foo");
        assert_eq!(apps[0].identity(), dir.path().join("Foo.app"));
    }

    #[test]
    fn strips_only_the_trailing_suffix() {
        let dir = tempfile::tempdir().unwrap();
        make_bundle(dir.path(), "My.app Builder.app", None);

        let apps = scan_directory(dir.path());
        assert_eq!(apps[0].display_name(), "My.app Builder");
    }

    #[test]
    fn missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_directory(&dir.path().join("nowhere")).is_empty());
    }
}
