pub mod associated_files;
pub mod bundle_reader;
pub mod directory_scan;

use std::cmp::Ordering as CmpOrdering;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::{Collator, CollatorBorrowed};
use tokio::sync::{watch, Mutex};

use crate::models::{AppSettings, ApplicationRecord};

pub use associated_files::RemovalPlanner;

/// Immutable result of one completed scan.
pub type Snapshot = Arc<[ApplicationRecord]>;

type RootLister = Arc<dyn Fn(&Path) -> Vec<ApplicationRecord> + Send + Sync>;

/// Root collation at secondary strength: accents matter, case does not.
static NAME_COLLATOR: LazyLock<Option<CollatorBorrowed<'static>>> = LazyLock::new(|| {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Secondary);
    Collator::try_new(Default::default(), options)
        .map_err(|e| log::warn!("Collator unavailable, sorting by lowercase: {}", e))
        .ok()
});

/// Locale-aware, case-insensitive ascending order; equal names keep
/// encounter order.
pub fn sort_by_display_name(apps: &mut [ApplicationRecord]) {
    apps.sort_by(|a, b| compare_names(a.display_name(), b.display_name()));
}

fn compare_names(a: &str, b: &str) -> CmpOrdering {
    match NAME_COLLATOR.as_ref() {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// Clears the scanning flag however the scan future ends.
struct ScanningFlag<'a>(&'a AtomicBool);

impl<'a> ScanningFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for ScanningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns the published application list.
///
/// At most one scan runs at a time. Each completed scan replaces the
/// snapshot wholesale, so readers never see a partially built list.
pub struct AppScanner {
    roots: Vec<PathBuf>,
    list_root: RootLister,
    published: watch::Sender<Snapshot>,
    gate: Mutex<()>,
    scanning: AtomicBool,
}

impl AppScanner {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self::with_lister(roots, Arc::new(directory_scan::scan_directory))
    }

    pub(crate) fn with_lister(roots: Vec<PathBuf>, list_root: RootLister) -> Self {
        let (published, _) = watch::channel(Snapshot::from(Vec::new()));
        Self {
            roots,
            list_root,
            published,
            gate: Mutex::new(()),
            scanning: AtomicBool::new(false),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.scan_roots())
    }

    /// Run a full scan off the calling task and publish the result.
    ///
    /// Roots are read concurrently; their results are concatenated in root
    /// order before sorting.
    pub async fn scan(&self) -> Snapshot {
        let _guard = self.gate.lock().await;
        let _flag = ScanningFlag::raise(&self.scanning);
        let start = std::time::Instant::now();

        let handles: Vec<_> = self
            .roots
            .iter()
            .cloned()
            .map(|root| {
                let list_root = self.list_root.clone();
                tokio::task::spawn_blocking(move || list_root(&root))
            })
            .collect();
        let results = futures::future::join_all(handles).await;

        let mut apps = Vec::new();
        for (root, result) in self.roots.iter().zip(results) {
            match result {
                Ok(found) => {
                    log::debug!("{} apps in {}", found.len(), root.display());
                    apps.extend(found);
                }
                Err(e) => log::warn!("Scan of {} failed: {}", root.display(), e),
            }
        }
        sort_by_display_name(&mut apps);

        let snapshot = Snapshot::from(apps);
        self.published.send_replace(snapshot.clone());

        log::info!(
            "Scan complete: {} apps from {} roots in {:?}",
            snapshot.len(),
            self.roots.len(),
            start.elapsed()
        );
        snapshot
    }

    /// The last published snapshot (empty before the first scan).
    pub fn snapshot(&self) -> Snapshot {
        self.published.borrow().clone()
    }

    /// Receive every future snapshot as it is published.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.published.subscribe()
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Look up a record in the current snapshot by bundle path or by
    /// case-insensitive display name.
    pub fn find(&self, query: &str) -> Option<ApplicationRecord> {
        let snapshot = self.snapshot();
        let by_path = Path::new(query);
        snapshot
            .iter()
            .find(|app| app.identity() == by_path)
            .or_else(|| {
                let wanted = query.strip_suffix(crate::models::BUNDLE_SUFFIX).unwrap_or(query);
                snapshot
                    .iter()
                    .find(|app| compare_names(app.display_name(), wanted) == CmpOrdering::Equal)
            })
            .cloned()
    }
}
