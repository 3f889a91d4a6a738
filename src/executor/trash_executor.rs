use std::sync::Arc;

use super::Trasher;
use crate::models::{RemovalPlan, TrashPartition};

/// Unprivileged pass: every planned path is attempted, and any failure defers
/// the path to elevation rather than dropping it.
#[derive(Clone)]
pub struct TrashExecutor {
    trasher: Arc<dyn Trasher>,
}

impl TrashExecutor {
    pub fn new(trasher: Arc<dyn Trasher>) -> Self {
        Self { trasher }
    }

    pub fn attempt_trash(&self, plan: &RemovalPlan) -> TrashPartition {
        let mut partition = TrashPartition::default();
        for entry in &plan.entries {
            match self.trasher.trash(&entry.path) {
                Ok(()) => {
                    log::debug!("Trashed {}", entry.path.display());
                    partition.succeeded.push(entry.path.clone());
                }
                Err(e) => {
                    log::warn!("Trash failed for {} ({}); deferring to elevation", entry.path.display(), e);
                    partition.needs_elevation.push(entry.path.clone());
                }
            }
        }
        partition
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use crate::executor::Trasher;
    use crate::utils::{AppError, AppResult};

    /// Removes paths from disk, refusing the ones marked as root-owned.
    #[derive(Default)]
    pub struct FakeTrash {
        pub root_owned: HashSet<PathBuf>,
        pub attempts: Mutex<Vec<PathBuf>>,
    }

    impl FakeTrash {
        pub fn refusing(paths: &[PathBuf]) -> Self {
            Self {
                root_owned: paths.iter().cloned().collect(),
                attempts: Mutex::new(Vec::new()),
            }
        }

        pub fn attempts(&self) -> Vec<PathBuf> {
            self.attempts.lock().unwrap().clone()
        }
    }

    impl Trasher for FakeTrash {
        fn trash(&self, path: &Path) -> AppResult<()> {
            self.attempts.lock().unwrap().push(path.to_path_buf());
            if self.root_owned.contains(path) {
                return Err(AppError::CommandFailed("Operation not permitted".into()));
            }
            let meta = std::fs::symlink_metadata(path)?;
            if meta.is_dir() {
                std::fs::remove_dir_all(path)?;
            } else {
                std::fs::remove_file(path)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::PathBuf;

    use super::fakes::FakeTrash;
    use super::*;
    use crate::models::{PathKind, PlanEntry};

    fn plan_of(paths: &[PathBuf]) -> RemovalPlan {
        RemovalPlan {
            entries: paths
                .iter()
                .map(|p| PlanEntry { path: p.clone(), kind: PathKind::Caches, size_bytes: 0 })
                .collect(),
        }
    }

    #[test]
    fn partitions_every_path_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = ["a", "b", "c", "d"].iter().map(|n| dir.path().join(n)).collect();
        for p in &paths[..3] {
            std::fs::create_dir_all(p).unwrap();
        }
        // b is root-owned, d never existed
        let trash = Arc::new(FakeTrash::refusing(&[paths[1].clone()]));
        let partition = TrashExecutor::new(trash.clone()).attempt_trash(&plan_of(&paths));

        assert_eq!(partition.succeeded, vec![paths[0].clone(), paths[2].clone()]);
        assert_eq!(partition.needs_elevation, vec![paths[1].clone(), paths[3].clone()]);

        let succeeded: HashSet<_> = partition.succeeded.iter().collect();
        let deferred: HashSet<_> = partition.needs_elevation.iter().collect();
        assert!(succeeded.is_disjoint(&deferred));
        assert_eq!(succeeded.len() + deferred.len(), paths.len());
    }

    #[test]
    fn keeps_going_after_failures() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = ["x", "y", "z"].iter().map(|n| dir.path().join(n)).collect();
        let trash = Arc::new(FakeTrash::refusing(&paths));

        let partition = TrashExecutor::new(trash.clone()).attempt_trash(&plan_of(&paths));
        assert_eq!(trash.attempts(), paths);
        assert!(partition.succeeded.is_empty());
        assert_eq!(partition.needs_elevation, paths);
    }
}
