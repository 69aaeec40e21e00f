//! Centralized path resolution for the subnet monitor
//!
//! All file and directory paths are resolved through this module so the
//! service, the CLI commands and the tests agree on where state lives.
//!
//! ## Directory Structure
//!
//! ```text
//! <base>/
//! ├── data/
//! │   ├── config.toml
//! │   └── storage/
//! │       ├── symbolNotes.json
//! │       └── dailyAlphaUsdHistory.json
//! └── logs/
//!     └── subnet_monitor_*.log
//! ```
//!
//! The base directory is the platform data directory (`dirs::data_local_dir`)
//! joined with `SubnetMonitor`, unless `SUBNET_MONITOR_HOME` overrides it.

use once_cell::sync::Lazy;
use std::path::PathBuf;

const APP_DIR: &str = "SubnetMonitor";
const HOME_ENV: &str = "SUBNET_MONITOR_HOME";

static BASE_DIRECTORY: Lazy<PathBuf> = Lazy::new(resolve_base_directory);

fn resolve_base_directory() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(dir) = dirs::data_local_dir() {
        return dir.join(APP_DIR);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(APP_DIR);
    }

    PathBuf::from(APP_DIR)
}

/// Returns the base directory for all monitor data
pub fn get_base_directory() -> PathBuf {
    BASE_DIRECTORY.clone()
}

/// Returns the data directory path (config + persisted stores)
pub fn get_data_directory() -> PathBuf {
    BASE_DIRECTORY.join("data")
}

/// Returns the directory backing the key-value storage
pub fn get_storage_directory() -> PathBuf {
    get_data_directory().join("storage")
}

/// Returns the logs directory path
pub fn get_logs_directory() -> PathBuf {
    BASE_DIRECTORY.join("logs")
}

/// Returns today's log file path
pub fn get_log_file_path() -> PathBuf {
    get_logs_directory().join(crate::logger::daily_log_file_name())
}

/// Returns the main configuration file path
pub fn get_config_path() -> PathBuf {
    get_data_directory().join("config.toml")
}

/// Create every directory the monitor writes into
pub fn ensure_all_directories() -> Result<(), String> {
    for dir in [get_data_directory(), get_storage_directory(), get_logs_directory()] {
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create directory {}: {}", dir.display(), e))?;
    }
    Ok(())
}
