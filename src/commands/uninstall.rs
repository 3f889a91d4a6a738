use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;

use crate::detection::RemovalPlanner;
use crate::executor::{FinderTrash, PrivilegedExecutor, SudoRunner, TrashExecutor};
use crate::models::{
    AppSettings, ApplicationRecord, ElevationOutcome, RemovalState, UninstallOutcome,
    UninstallProgress, UninstallReport,
};
use crate::utils::app_lifecycle::is_app_running;

type ProgressFn<'a> = &'a (dyn Fn(UninstallProgress) + Send + Sync);

/// Runs plan → trash → (elevate) for one record and always returns a terminal
/// result. Calls for the same bundle path are serialized.
pub struct RemovalCoordinator {
    planner: RemovalPlanner,
    trash: TrashExecutor,
    privileged: PrivilegedExecutor,
    in_flight: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl RemovalCoordinator {
    pub fn new(planner: RemovalPlanner, trash: TrashExecutor, privileged: PrivilegedExecutor) -> Self {
        Self {
            planner,
            trash,
            privileged,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Finder trash for the free tier, sudo/osascript for elevation.
    pub fn from_settings(settings: &AppSettings) -> Self {
        let planner = RemovalPlanner::from_settings(settings);
        let privileged = PrivilegedExecutor::new(planner.container_root(), Arc::new(SudoRunner));
        Self::new(planner, TrashExecutor::new(Arc::new(FinderTrash)), privileged)
    }

    pub fn planner(&self) -> &RemovalPlanner {
        &self.planner
    }

    pub async fn uninstall(&self, record: &ApplicationRecord) -> UninstallReport {
        self.uninstall_with_progress(record, &|_| {}).await
    }

    pub async fn uninstall_with_progress(
        &self,
        record: &ApplicationRecord,
        on_progress: ProgressFn<'_>,
    ) -> UninstallReport {
        let lock = self.record_lock(record);
        let report = {
            let _serial = lock.lock().await;
            self.run(record, on_progress).await
        };
        self.release_record_lock(record, lock);

        log::info!(
            "Uninstall of {} finished: {:?}",
            record.display_name(),
            report.outcome
        );
        report
    }

    async fn run(&self, record: &ApplicationRecord, on_progress: ProgressFn<'_>) -> UninstallReport {
        let report_state = |state: RemovalState, percent: u8| on_progress(UninstallProgress { state, percent });

        report_state(RemovalState::Planning, 10);
        let planner = self.planner.clone();
        let target = record.clone();
        let plan = match tokio::task::spawn_blocking(move || planner.plan(&target)).await {
            Ok(plan) => plan,
            Err(e) => return failed(format!("Planning task failed: {}", e), on_progress),
        };

        report_state(RemovalState::TrashAttempt, 30);
        let trash = self.trash.clone();
        let trash_plan = plan.clone();
        let partition =
            match tokio::task::spawn_blocking(move || trash.attempt_trash(&trash_plan)).await {
                Ok(partition) => partition,
                Err(e) => return failed(format!("Trash task failed: {}", e), on_progress),
            };

        if partition.needs_elevation.is_empty() {
            report_state(RemovalState::Done, 100);
            return UninstallReport {
                outcome: UninstallOutcome::Success,
                plan: Some(plan),
                trashed: partition.succeeded,
                elevated: Vec::new(),
            };
        }

        report_state(RemovalState::Escalating, 70);
        let privileged = self.privileged.clone();
        let leftover = partition.needs_elevation.clone();
        let elevation =
            match tokio::task::spawn_blocking(move || privileged.escalate_and_remove(&leftover)).await {
                Ok(outcome) => outcome,
                Err(e) => ElevationOutcome::PartialOrAuthFailure(format!("Elevation task failed: {}", e)),
            };

        let elevated = if elevation == ElevationOutcome::AllRemoved {
            partition.needs_elevation
        } else {
            Vec::new()
        };
        report_state(RemovalState::Done, 100);
        UninstallReport {
            outcome: elevation.into(),
            plan: Some(plan),
            trashed: partition.succeeded,
            elevated,
        }
    }

    fn record_lock(&self, record: &ApplicationRecord) -> Arc<AsyncMutex<()>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        in_flight
            .entry(record.identity().to_path_buf())
            .or_default()
            .clone()
    }

    fn release_record_lock(&self, record: &ApplicationRecord, lock: Arc<AsyncMutex<()>>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        drop(lock);
        // Only the map's reference left: nobody holds or waits on this record.
        let idle = in_flight
            .get(record.identity())
            .is_some_and(|entry| Arc::strong_count(entry) == 1);
        if idle {
            in_flight.remove(record.identity());
        }
    }
}

fn failed(reason: String, on_progress: ProgressFn<'_>) -> UninstallReport {
    log::warn!("{}", reason);
    on_progress(UninstallProgress { state: RemovalState::Done, percent: 100 });
    UninstallReport {
        outcome: UninstallOutcome::Failed(reason),
        plan: None,
        trashed: Vec::new(),
        elevated: Vec::new(),
    }
}

fn refused(reason: String) -> UninstallReport {
    log::info!("{}", reason);
    UninstallReport {
        outcome: UninstallOutcome::Failed(reason),
        plan: None,
        trashed: Vec::new(),
        elevated: Vec::new(),
    }
}

/// Uninstall entry point for front ends.
///
/// Refuses system apps and running apps without touching the filesystem,
/// then hands off to the coordinator.
pub async fn uninstall_app(
    coordinator: &RemovalCoordinator,
    settings: &AppSettings,
    record: &ApplicationRecord,
    on_progress: ProgressFn<'_>,
) -> UninstallReport {
    if settings.is_protected(record.identity()) {
        return refused("System apps cannot be uninstalled.".to_string());
    }

    if settings.refuse_running {
        let app_path = record.identity().to_path_buf();
        let running = tokio::task::spawn_blocking(move || is_app_running(&app_path))
            .await
            .unwrap_or(false);
        if running {
            return refused(format!(
                "{} is currently running. Quit it first, then try again.",
                record.display_name()
            ));
        }
    }

    coordinator.uninstall_with_progress(record, on_progress).await
}
