/// Log tags identify the subsystem a message comes from
///
/// Each tag has a display name for console output and a debug key used by
/// `--debug <key>` to enable DEBUG output for that subsystem only.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Api,
    Poller,
    Storage,
    Charts,
    Table,
    Notifications,
    Webserver,
}

impl LogTag {
    /// Every tag, in display order
    pub fn all() -> &'static [LogTag] {
        &[
            LogTag::System,
            LogTag::Config,
            LogTag::Api,
            LogTag::Poller,
            LogTag::Storage,
            LogTag::Charts,
            LogTag::Table,
            LogTag::Notifications,
            LogTag::Webserver,
        ]
    }

    /// Plain tag name used in log files
    pub fn to_plain_string(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Api => "API",
            LogTag::Poller => "POLLER",
            LogTag::Storage => "STORAGE",
            LogTag::Charts => "CHARTS",
            LogTag::Table => "TABLE",
            LogTag::Notifications => "NOTIFY",
            LogTag::Webserver => "WEBSERVER",
        }
    }

    /// Key accepted by `--debug <key>`
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::Notifications => "notifications".to_string(),
            other => other.to_plain_string().to_lowercase(),
        }
    }

    /// Resolve a `--debug` key back to its tag
    pub fn from_debug_key(key: &str) -> Option<LogTag> {
        let key = key.trim().to_lowercase();
        LogTag::all()
            .iter()
            .copied()
            .find(|tag| tag.to_debug_key() == key || (key == "notify" && *tag == LogTag::Notifications))
    }
}
