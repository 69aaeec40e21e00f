//! Subnet miner registry monitor
//!
//! Polls the registry backend on a fixed timer, derives per-miner USD
//! figures and totals, keeps a bounded local history of daily earnings and
//! serves the result as a table, charts and alerts.

pub mod apis;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod logger;
pub mod miners;
pub mod notifications;
pub mod paths;
pub mod services;
pub mod storage;
pub mod views;
#[cfg(feature = "web")]
pub mod webserver;
