//! Platform-specific directories and external tool lookup
//!
//! - Configuration: `~/.config/tubegrab`, `~/Library/Application Support/tubegrab`, `%APPDATA%\tubegrab`
//! - Downloads: the platform Downloads folder, never a relative path
//! - Tools: explicit path, then PATH, then common install locations

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_DIR: &str = "tubegrab";

/// Returns the configuration directory
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Returns the default download directory
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| {
            warn!("Could not determine Downloads directory, using ./downloads");
            PathBuf::from("downloads")
        })
}

/// Directory for short-lived files served by the web front end
pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(APP_DIR)
}

/// Locate an external tool
///
/// Search order:
/// 1. Explicitly configured path
/// 2. System PATH
/// 3. Common installation paths (Homebrew, system, user local)
pub fn find_tool(name: &str, configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if is_executable(path) {
            debug!("Using configured {}: {}", name, path.display());
            return Some(path.to_path_buf());
        }
        warn!(
            "Configured {} at {} is missing or not executable",
            name,
            path.display()
        );
    }

    if let Ok(path) = which::which(name) {
        debug!("Using {} from PATH: {}", name, path.display());
        return Some(path);
    }

    let found = common_locations(name)
        .into_iter()
        .find(|candidate| is_executable(candidate));
    if let Some(path) = &found {
        debug!("Using {} from common path: {}", name, path.display());
    }
    found
}

fn common_locations(name: &str) -> Vec<PathBuf> {
    let mut locations = vec![
        // macOS Homebrew (Apple Silicon)
        PathBuf::from("/opt/homebrew/bin").join(name),
        // macOS Homebrew (Intel), manual installs
        PathBuf::from("/usr/local/bin").join(name),
        PathBuf::from("/usr/bin").join(name),
    ];
    // pip --user installs
    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".local").join("bin").join(name));
    }
    locations
}

/// Check if a file is executable
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
