/// Core logging implementation with automatic filtering
///
/// This module contains the central logging logic that:
/// - Checks if a log should be displayed based on level and tag
/// - Delegates to the format module for formatting/writing
use super::config::{get_logger_config, is_debug_enabled_for_tag};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Check if a log message should be displayed
///
/// Filtering rules:
/// 1. Errors are always shown
/// 2. Check against minimum log level threshold
/// 3. Debug level requires `--debug <tag>` for that tag
/// 4. Verbose level requires `--verbose`
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    let config = get_logger_config();

    if level > config.min_level {
        return false;
    }

    match level {
        LogLevel::Debug => is_debug_enabled_for_tag(tag),
        LogLevel::Verbose => config.min_level == LogLevel::Verbose,
        _ => true,
    }
}

/// Internal logging function with automatic filtering
pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(tag, level, message);
}

#[cfg(test)]
mod tests {
    use super::super::config::{set_logger_config, LoggerConfig};
    use super::*;

    #[test]
    fn test_filtering_rules() {
        set_logger_config(LoggerConfig::from_flags(&["poller".to_string()], false, false));

        assert!(should_log(&LogTag::Api, LogLevel::Error));
        assert!(should_log(&LogTag::Api, LogLevel::Info));
        assert!(should_log(&LogTag::Poller, LogLevel::Debug));
        assert!(!should_log(&LogTag::Api, LogLevel::Debug));
        assert!(!should_log(&LogTag::Poller, LogLevel::Verbose));

        set_logger_config(LoggerConfig::from_flags(&[], false, true));
        assert!(should_log(&LogTag::Api, LogLevel::Error));
        assert!(!should_log(&LogTag::Api, LogLevel::Warning));

        set_logger_config(LoggerConfig::default());
    }
}
