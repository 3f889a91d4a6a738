//! Application inventory and removal for macOS app bundles.
//!
//! [`detection::AppScanner`] discovers `*.app` bundles and publishes sorted
//! [`models::ApplicationRecord`] snapshots. [`commands::RemovalCoordinator`]
//! removes an application and its per-user footprint, moving everything to
//! the Trash and asking for administrator rights only for what is left.

pub mod commands;
pub mod detection;
pub mod executor;
pub mod models;
pub mod platform;
pub mod utils;

pub use commands::RemovalCoordinator;
pub use detection::{AppScanner, RemovalPlanner};
pub use models::{AppSettings, ApplicationRecord, UninstallOutcome};
