use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where a planned path lives in an application's footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Bundle,
    ApplicationSupport,
    Caches,
    Preferences,
    Containers,
    GroupContainers,
    HttpStorages,
    Webkit,
    SavedState,
}

impl PathKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathKind::Bundle => "bundle",
            PathKind::ApplicationSupport => "application_support",
            PathKind::Caches => "caches",
            PathKind::Preferences => "preferences",
            PathKind::Containers => "containers",
            PathKind::GroupContainers => "group_containers",
            PathKind::HttpStorages => "http_storages",
            PathKind::Webkit => "webkit",
            PathKind::SavedState => "saved_state",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub path: PathBuf,
    pub kind: PathKind,
    pub size_bytes: u64,
}

/// Ordered, deduplicated footprint of one application. The bundle is always
/// the first entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalPlan {
    pub entries: Vec<PlanEntry>,
}

impl RemovalPlan {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }

    pub fn primary(&self) -> Option<&Path> {
        self.entries.first().map(|e| e.path.as_path())
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size_bytes).sum()
    }
}

/// Result of the unprivileged trash pass. Every planned path lands in exactly
/// one of the two lists, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashPartition {
    pub succeeded: Vec<PathBuf>,
    pub needs_elevation: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ElevationOutcome {
    AllRemoved,
    PartialOrAuthFailure(String),
    Cancelled,
}

/// Terminal result of one uninstall call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum UninstallOutcome {
    Success,
    Cancelled,
    Failed(String),
}

impl UninstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UninstallOutcome::Success)
    }
}

impl From<ElevationOutcome> for UninstallOutcome {
    fn from(outcome: ElevationOutcome) -> Self {
        match outcome {
            ElevationOutcome::AllRemoved => UninstallOutcome::Success,
            ElevationOutcome::Cancelled => UninstallOutcome::Cancelled,
            ElevationOutcome::PartialOrAuthFailure(reason) => UninstallOutcome::Failed(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalState {
    Idle,
    Planning,
    TrashAttempt,
    Escalating,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallProgress {
    pub state: RemovalState,
    pub percent: u8,
}

/// Everything the caller learns about one uninstall call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UninstallReport {
    pub outcome: UninstallOutcome,
    pub plan: Option<RemovalPlan>,
    pub trashed: Vec<PathBuf>,
    pub elevated: Vec<PathBuf>,
}
