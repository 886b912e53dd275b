//! Application configuration module.
//!
//! Manages the TOML config file (backend URL, page size) and the
//! persisted session cookies.

#[allow(clippy::module_inception)]
mod config;
mod paths;
mod session_store;

#[allow(clippy::module_name_repetitions)]
pub use config::AppConfig;
pub use paths::{resolve_config_path, resolve_session_path};
pub use session_store::{clear_cookies, restore_cookies, save_cookies};
