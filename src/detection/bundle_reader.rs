use std::path::Path;

use crate::utils::plist_parser::{get_string, read_info_plist};

/// Read the bundle's declared `CFBundleIdentifier`.
///
/// A missing, unreadable or malformed descriptor is an expected outcome and
/// yields `None`. Nothing is cached.
pub fn read_identifier(app_path: &Path) -> Option<String> {
    match read_info_plist(app_path) {
        Ok(dict) => get_string(&dict, "CFBundleIdentifier").filter(|id| !id.is_empty()),
        Err(e) => {
            log::debug!("No bundle identifier for {}: {}", app_path.display(), e);
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::make_bundle;
    use super::*;

    #[test]
    fn reads_declared_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = make_bundle(dir.path(), "Bar.app", Some("com.acme.bar"));
        assert_eq!(read_identifier(&bundle).as_deref(), Some("com.acme.bar"));
    }

    #[test]
    fn missing_descriptor_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = make_bundle(dir.path(), "Foo.app", None);
        assert_eq!(read_identifier(&bundle), None);
        assert_eq!(read_identifier(&dir.path().join("Ghost.app")), None);
    }

    #[test]
    fn malformed_descriptor_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = make_bundle(dir.path(), "Bad.app", None);
        std::fs::write(bundle.join("Contents/Info.plist"), "{{ not a plist").unwrap();
        assert_eq!(read_identifier(&bundle), None);
    }

    #[test]
    fn non_dictionary_descriptor_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = make_bundle(dir.path(), "Odd.app", None);
        std::fs::write(
            bundle.join("Contents/Info.plist"),
            r#"<?xml version="1.0" encoding="UTF-8"?><plist version="1.0"><string>x</string></plist>"#,
        )
        .unwrap();
        assert_eq!(read_identifier(&bundle), None);
    }
}
