/// Logger configuration (levels, per-tag debug switches, file output)
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Messages above this level are dropped (Verbose means "show everything")
    pub min_level: LogLevel,
    /// Tags with DEBUG output enabled
    pub debug_tags: HashSet<LogTag>,
    /// Plain-text log file, `None` disables file output
    pub log_file: Option<PathBuf>,
    /// Write to stdout
    pub console: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Debug,
            debug_tags: HashSet::new(),
            log_file: None,
            console: true,
        }
    }
}

impl LoggerConfig {
    /// Build a config from CLI switches
    ///
    /// Unknown debug keys are ignored so a typo never aborts startup.
    pub fn from_flags(debug_keys: &[String], verbose: bool, quiet: bool) -> Self {
        let debug_tags = debug_keys
            .iter()
            .flat_map(|key| {
                if key.trim().eq_ignore_ascii_case("all") {
                    LogTag::all().to_vec()
                } else {
                    LogTag::from_debug_key(key).into_iter().collect()
                }
            })
            .collect();

        let min_level = if quiet {
            LogLevel::Error
        } else if verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Debug
        };

        Self {
            min_level,
            debug_tags,
            ..Self::default()
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

pub(super) fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    LOGGER_CONFIG.read().debug_tags.contains(tag)
}
