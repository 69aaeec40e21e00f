/// Configuration schemas - all config structures defined once with defaults
///
/// Each struct is defined using the config_struct! macro which provides:
/// - Single-source definition (no repetition)
/// - Embedded defaults
/// - Serde support
use crate::config_struct;

// ============================================================================
// BACKEND API CONFIGURATION
// ============================================================================

config_struct! {
    /// Backend REST API the monitor polls
    pub struct ApiConfig {
        /// Origin + base path, every endpoint is appended to this
        base_url: String = "https://hotkey-monitoring-backend.onrender.com/api".to_string(),
        /// Per-request timeout
        timeout_secs: u64 = 20,
    }
}

// ============================================================================
// POLLING CONFIGURATION
// ============================================================================

config_struct! {
    /// Poll timers
    pub struct PollingConfig {
        /// Data refresh period (subnet, settings, coldkeys, miners, prices)
        interval_secs: u64 = 60,
        /// Notification feed period, runs independently of the data timer
        notification_interval_secs: u64 = 60,
    }
}

// ============================================================================
// HISTORY / CHART CONFIGURATION
// ============================================================================

config_struct! {
    /// Time-series retention and chart shaping
    pub struct HistoryConfig {
        /// Retention cap per series, oldest points are dropped first
        max_points_per_series: usize = 2880,
        /// Chart window measured back from the current time
        window_hours: u64 = 24,
        /// Points shown when the window is empty
        fallback_points: usize = 1440,
        /// Downsampling threshold for a rendered series
        max_rendered_points: usize = 200,
    }
}

// ============================================================================
// NOTIFICATIONS CONFIGURATION
// ============================================================================

config_struct! {
    /// Deregistration alert delivery
    pub struct NotificationsConfig {
        enabled: bool = true,
        telegram_enabled: bool = false,
        telegram_bot_token: String = String::new(),
        telegram_chat_id: String = String::new(),
    }
}

// ============================================================================
// WEBSERVER CONFIGURATION
// ============================================================================

config_struct! {
    /// Embedded dashboard server
    pub struct WebserverConfig {
        enabled: bool = true,
        host: String = "127.0.0.1".to_string(),
        port: u16 = 8080,
    }
}

// ============================================================================
// ROOT
// ============================================================================

config_struct! {
    /// Root configuration, one section per concern
    pub struct Config {
        api: ApiConfig = ApiConfig::default(),
        polling: PollingConfig = PollingConfig::default(),
        history: HistoryConfig = HistoryConfig::default(),
        notifications: NotificationsConfig = NotificationsConfig::default(),
        webserver: WebserverConfig = WebserverConfig::default(),
    }
}
