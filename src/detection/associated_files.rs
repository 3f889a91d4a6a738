use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{AppSettings, ApplicationRecord, PathKind, PlanEntry, RemovalPlan};
use crate::utils::paths::path_size;

/// Enumerates everything an application left under the user's Library.
///
/// Planning only reads the filesystem.
#[derive(Debug, Clone)]
pub struct RemovalPlanner {
    library: PathBuf,
    include_web_data: bool,
}

impl RemovalPlanner {
    pub fn new(library: PathBuf) -> Self {
        Self { library, include_web_data: false }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            library: settings.library_root(),
            include_web_data: settings.include_web_data,
        }
    }

    pub fn with_web_data(mut self, include: bool) -> Self {
        self.include_web_data = include;
        self
    }

    /// Root of per-app sandbox containers, which the OS protects.
    pub fn container_root(&self) -> PathBuf {
        self.library.join("Containers")
    }

    pub fn plan(&self, record: &ApplicationRecord) -> RemovalPlan {
        let mut entries = vec![PlanEntry {
            path: record.identity().to_path_buf(),
            kind: PathKind::Bundle,
            size_bytes: path_size(record.identity()),
        }];

        let Some(bundle_id) = record.bundle_identifier() else {
            return RemovalPlan { entries };
        };

        let mut candidates: Vec<(PathBuf, PathKind)> = vec![
            (self.library.join("Application Support").join(bundle_id), PathKind::ApplicationSupport),
            (self.library.join("Caches").join(bundle_id), PathKind::Caches),
            (
                self.library.join("Preferences").join(format!("{}.plist", bundle_id)),
                PathKind::Preferences,
            ),
            (self.container_root().join(bundle_id), PathKind::Containers),
        ];

        candidates.extend(
            self.group_containers(bundle_id)
                .into_iter()
                .map(|p| (p, PathKind::GroupContainers)),
        );

        if self.include_web_data {
            candidates.push((self.library.join("HTTPStorages").join(bundle_id), PathKind::HttpStorages));
            candidates.push((self.library.join("WebKit").join(bundle_id), PathKind::Webkit));
        }

        candidates.push((
            self.library
                .join("Saved Application State")
                .join(format!("{}.savedState", bundle_id)),
            PathKind::SavedState,
        ));

        for (path, kind) in candidates {
            if !exists(&path) || entries.iter().any(|e| e.path == path) {
                continue;
            }
            let size_bytes = path_size(&path);
            entries.push(PlanEntry { path, kind, size_bytes });
        }

        log::debug!(
            "Planned {} paths for {}",
            entries.len(),
            record.identity().display()
        );
        RemovalPlan { entries }
    }

    /// Group containers are matched by substring. This is best-effort: it can
    /// miss differently named groups and catch unrelated ones.
    fn group_containers(&self, bundle_id: &str) -> Vec<PathBuf> {
        let root = self.library.join("Group Containers");
        let Ok(entries) = fs::read_dir(&root) else {
            return Vec::new();
        };
        let mut matches: Vec<PathBuf> = entries
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().contains(bundle_id))
            .map(|e| e.path())
            .collect();
        matches.sort();
        matches
    }
}

fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: PathBuf, bundle_id: Option<&str>) -> ApplicationRecord {
        ApplicationRecord::new(path, "Bar".into(), bundle_id.map(String::from)).unwrap()
    }

    fn populate(library: &Path, id: &str) {
        for dir in [
            format!("Application Support/{id}"),
            format!("Caches/{id}"),
            format!("Containers/{id}"),
            format!("Group Containers/TEAM123.{id}"),
            format!("Group Containers/group.{id}.shared"),
            "Group Containers/group.com.other".to_string(),
            format!("HTTPStorages/{id}"),
            format!("Saved Application State/{id}.savedState"),
        ] {
            fs::create_dir_all(library.join(dir)).unwrap();
        }
        fs::create_dir_all(library.join("Preferences")).unwrap();
        fs::write(library.join(format!("Preferences/{id}.plist")), "x").unwrap();
    }

    #[test]
    fn bundle_only_without_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let library = dir.path().join("Library");
        populate(&library, "com.acme.bar");
        let app = record(dir.path().join("Bar.app"), None);

        let plan = RemovalPlanner::new(library).plan(&app);
        assert_eq!(plan.paths(), vec![dir.path().join("Bar.app")]);
    }

    #[test]
    fn bundle_is_first_even_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let app = record(dir.path().join("Gone.app"), Some("com.acme.gone"));

        let plan = RemovalPlanner::new(dir.path().join("Library")).plan(&app);
        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.primary(), Some(dir.path().join("Gone.app").as_path()));
        assert_eq!(plan.entries[0].kind, PathKind::Bundle);
    }

    #[test]
    fn enumerates_existing_support_paths_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let library = dir.path().join("Library");
        let id = "com.acme.bar";
        populate(&library, id);
        let bundle = dir.path().join("Bar.app");
        fs::create_dir_all(&bundle).unwrap();

        let plan = RemovalPlanner::new(library.clone()).plan(&record(bundle.clone(), Some(id)));

        assert_eq!(
            plan.paths(),
            vec![
                bundle,
                library.join("Application Support").join(id),
                library.join("Caches").join(id),
                library.join("Preferences").join(format!("{id}.plist")),
                library.join("Containers").join(id),
                library.join("Group Containers").join(format!("TEAM123.{id}")),
                library.join("Group Containers").join(format!("group.{id}.shared")),
                library.join("Saved Application State").join(format!("{id}.savedState")),
            ]
        );
        let kinds: Vec<_> = plan.entries.iter().map(|e| e.kind).collect();
        assert_eq!(kinds[1], PathKind::ApplicationSupport);
        assert_eq!(kinds[7], PathKind::SavedState);
        assert_eq!(plan.total_size_bytes(), 1);
    }

    #[test]
    fn web_data_is_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        let library = dir.path().join("Library");
        populate(&library, "com.acme.bar");
        let app = record(dir.path().join("Bar.app"), Some("com.acme.bar"));

        let plan = RemovalPlanner::new(library.clone()).with_web_data(true).plan(&app);
        assert!(plan.paths().contains(&library.join("HTTPStorages/com.acme.bar")));
        assert_eq!(plan.entries.last().map(|e| e.kind), Some(PathKind::SavedState));
    }

    #[test]
    fn replanning_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let library = dir.path().join("Library");
        populate(&library, "com.acme.bar");
        let app = record(dir.path().join("Bar.app"), Some("com.acme.bar"));
        let planner = RemovalPlanner::new(library);

        assert_eq!(planner.plan(&app), planner.plan(&app));
    }

    #[test]
    fn planning_does_not_touch_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let library = dir.path().join("Library");
        let app = record(dir.path().join("Bar.app"), Some("com.acme.bar"));

        RemovalPlanner::new(library.clone()).plan(&app);
        assert!(!library.exists());
    }
}
