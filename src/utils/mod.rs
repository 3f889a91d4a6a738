pub mod app_lifecycle;
pub mod askpass;
pub mod error;
pub mod paths;
pub mod plist_parser;
pub mod sudo_session;

pub use error::{AppError, AppResult};
