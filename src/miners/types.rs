// Core types for the miner registry view

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Current (subnet token, base asset) price pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Prices {
    pub subnet_price: f64,
    pub base_price: f64,
}

impl Prices {
    pub fn new(subnet_price: f64, base_price: f64) -> Self {
        Self {
            subnet_price,
            base_price,
        }
    }
}

/// Display-ready miner, rebuilt from scratch on every poll
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinerRecord {
    pub coldkey: String,
    pub hotkey: String,
    pub uid: Option<u64>,
    pub ranking: Option<u64>,
    pub stake: f64,
    pub daily_alpha: f64,
    pub immune: bool,
    pub registered: bool,
    pub in_danger: bool,
    pub deregistered_at: Option<DateTime<Utc>>,
    pub symbol: Option<String>,
    /// Stake valued in the base currency, rounded to a whole unit
    pub stake_usd: f64,
    /// Daily emission valued in the base currency, two decimals
    pub daily_alpha_usd: f64,
}

impl MinerRecord {
    /// Key shared by notes and history: symbol, else UID, else hotkey
    pub fn symbol_key(&self) -> String {
        if let Some(symbol) = self.symbol.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return symbol.to_string();
        }
        if let Some(uid) = self.uid {
            return uid.to_string();
        }
        self.hotkey.clone()
    }

    pub fn stake_display(&self) -> String {
        format!("{:.2}", self.stake)
    }

    pub fn daily_alpha_display(&self) -> String {
        format!("{:.2}", self.daily_alpha)
    }

    pub fn stake_usd_display(&self) -> String {
        format!("{:.0}", self.stake_usd)
    }

    pub fn uid_display(&self) -> String {
        self.uid.map(|u| u.to_string()).unwrap_or_default()
    }

    pub fn ranking_display(&self) -> String {
        self.ranking.map(|r| r.to_string()).unwrap_or_default()
    }

    pub fn immune_display(&self) -> &'static str {
        yes_no(self.immune)
    }

    pub fn registered_display(&self) -> &'static str {
        yes_no(self.registered)
    }

    pub fn in_danger_display(&self) -> &'static str {
        yes_no(self.in_danger)
    }

    /// Deregistration date, or `No` when the miner was never deregistered
    pub fn deregistered_display(&self) -> String {
        self.deregistered_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "No".to_string())
    }
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Totals recomputed by a full scan on every poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Aggregates {
    pub total_daily_alpha: f64,
    pub total_staking_alpha: f64,
    pub total_miner_num: usize,
    pub registered_miner_num: usize,
    pub deregistered_miner_num: usize,
    pub daily_earn_usd: f64,
    pub total_staking_usd: f64,
}
