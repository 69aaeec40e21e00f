/// Configuration utilities - loading and access helpers
///
/// This module provides utility functions for working with the configuration system:
/// - Loading configuration from disk
/// - Validating loaded values
/// - Thread-safe access helpers
use super::schemas::{
    ApiConfig, Config, HistoryConfig, NotificationsConfig, PollingConfig, WebserverConfig,
};
use crate::logger::{self, LogTag};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::path::Path;

/// Longest chart window accepted (one year)
pub const MAX_WINDOW_HOURS: u64 = 24 * 365;

/// Global configuration instance
///
/// Falls back to defaults when read before `load_config_from_path` runs.
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Parse a TOML document into a validated configuration
pub fn parse_config(contents: &str) -> Result<Config, String> {
    let config = toml::from_str::<Config>(contents)
        .map_err(|e| format!("Failed to parse config: {}", e))?;
    validate_config(&config)?;

    if let Ok(raw) = contents.parse::<toml::Table>() {
        for key in unknown_keys(&raw) {
            logger::warning(
                LogTag::Config,
                &format!("Unknown config key '{}' ignored", key),
            );
        }
    }
    Ok(config)
}

fn section_fields(section: &str) -> Option<&'static [&'static str]> {
    match section {
        "api" => Some(ApiConfig::FIELDS),
        "polling" => Some(PollingConfig::FIELDS),
        "history" => Some(HistoryConfig::FIELDS),
        "notifications" => Some(NotificationsConfig::FIELDS),
        "webserver" => Some(WebserverConfig::FIELDS),
        _ => None,
    }
}

/// Dotted paths of keys serde silently skipped
pub fn unknown_keys(raw: &toml::Table) -> Vec<String> {
    let mut unknown = Vec::new();
    for (section, value) in raw {
        let Some(fields) = section_fields(section) else {
            unknown.push(section.clone());
            continue;
        };
        if let Some(table) = value.as_table() {
            unknown.extend(
                table
                    .keys()
                    .filter(|key| !fields.contains(&key.as_str()))
                    .map(|key| format!("{}.{}", section, key)),
            );
        }
    }
    unknown
}

/// Load configuration from a specific file path and install it globally
///
/// A missing file is not an error: defaults are used and a warning is logged.
pub fn load_config_from_path(path: &Path) -> Result<(), String> {
    let config = if path.exists() {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        parse_config(&contents).map_err(|e| format!("{} ('{}')", e, path.display()))?
    } else {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path.display()),
        );
        Config::default()
    };

    install_config(config);
    Ok(())
}

/// Replace the global configuration
pub fn install_config(config: Config) {
    match CONFIG.get() {
        Some(lock) => *lock.write() = config,
        None => {
            if let Err(rejected) = CONFIG.set(RwLock::new(config)) {
                // Lost an initialization race, overwrite with our value
                if let Some(lock) = CONFIG.get() {
                    *lock.write() = rejected.into_inner();
                }
            }
        }
    }
}

/// Access configuration with a closure
///
/// # Example
/// ```
/// use subnet_monitor::config::with_config;
///
/// let interval = with_config(|cfg| cfg.polling.interval_secs);
/// assert!(interval > 0);
/// ```
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    let lock = CONFIG.get_or_init(|| RwLock::new(Config::default()));
    let config = lock.read();
    f(&config)
}

/// Get a clone of the entire configuration
///
/// Useful when values must be held across await points.
pub fn get_config_clone() -> Config {
    with_config(|cfg| cfg.clone())
}

/// Reject values that would make the monitor misbehave
pub fn validate_config(config: &Config) -> Result<(), String> {
    url::Url::parse(&config.api.base_url)
        .map_err(|e| format!("Invalid api.base_url '{}': {}", config.api.base_url, e))?;

    if config.polling.interval_secs == 0 {
        return Err("polling.interval_secs must be greater than zero".to_string());
    }
    if config.polling.notification_interval_secs == 0 {
        return Err("polling.notification_interval_secs must be greater than zero".to_string());
    }
    if config.history.max_points_per_series == 0 {
        return Err("history.max_points_per_series must be greater than zero".to_string());
    }
    if config.history.window_hours == 0 || config.history.window_hours > MAX_WINDOW_HOURS {
        return Err(format!(
            "history.window_hours must be between 1 and {}",
            MAX_WINDOW_HOURS
        ));
    }
    if config.history.fallback_points == 0 {
        return Err("history.fallback_points must be greater than zero".to_string());
    }
    if config.history.max_rendered_points < 2 {
        return Err("history.max_rendered_points must be at least 2".to_string());
    }
    if config.notifications.telegram_enabled
        && (config.notifications.telegram_bot_token.is_empty()
            || config.notifications.telegram_chat_id.is_empty())
    {
        return Err(
            "notifications.telegram_enabled requires telegram_bot_token and telegram_chat_id"
                .to_string(),
        );
    }

    Ok(())
}
