//! Configuration system
//!
//! TOML file with embedded defaults, loaded once at startup into a global
//! and read through `with_config`.

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{
    ApiConfig, Config, HistoryConfig, NotificationsConfig, PollingConfig, WebserverConfig,
};
pub use utils::{
    get_config_clone, install_config, load_config_from_path, parse_config, unknown_keys,
    validate_config, with_config,
};
