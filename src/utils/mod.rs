//! Utility modules for error handling, configuration and platform paths

pub mod config;
pub mod error;
pub mod filename;
pub mod platform;

// Re-export for convenience
pub use config::AppSettings;
pub use error::{Result, TubegrabError};
pub use filename::sanitize_filename;
pub use platform::{config_dir, default_download_dir, find_tool, scratch_dir};
