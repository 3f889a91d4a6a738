pub mod apps;
pub mod uninstall;

pub use uninstall::{uninstall_app, RemovalCoordinator};
