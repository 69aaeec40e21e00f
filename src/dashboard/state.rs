// Mutable dashboard state owned by the polling controller

use crate::apis::backend::types::{RawMiner, SettingsResponse};
use crate::miners::{format_immune_period, Aggregates, MinerRecord, Prices};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Settings as last reported by the backend plus the tracked subnet
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsSnapshot {
    pub subnet_id: Option<String>,
    pub alpha_price: f64,
    pub reg_cost: f64,
    pub reg_allowed: bool,
    pub immune_period: u64,
}

impl SettingsSnapshot {
    pub fn apply(&mut self, settings: SettingsResponse) {
        self.alpha_price = settings.alpha_price;
        self.reg_cost = settings.reg_cost;
        self.reg_allowed = settings.reg_allowed;
        self.immune_period = settings.immune_period;
    }

    pub fn immune_period_display(&self) -> String {
        format_immune_period(self.immune_period)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub settings: SettingsSnapshot,
    pub coldkeys: Vec<String>,
    pub raw_miners: Vec<RawMiner>,
    pub records: Vec<MinerRecord>,
    pub prices: Prices,
    pub aggregates: Aggregates,
    pub error: Option<String>,
    pub success: Option<String>,
    pub loading: bool,
    pub miners_received_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl DashboardState {
    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            settings: self.settings.clone(),
            immune_period_display: self.settings.immune_period_display(),
            coldkeys: self.coldkeys.clone(),
            prices: self.prices,
            aggregates: self.aggregates,
            miner_count: self.records.len(),
            error: self.error.clone(),
            success: self.success.clone(),
            loading: self.loading,
            last_updated: self.last_updated,
        }
    }
}

/// Serializable view of the header cards, banners and watchlist
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub settings: SettingsSnapshot,
    pub immune_period_display: String,
    pub coldkeys: Vec<String>,
    pub prices: Prices,
    pub aggregates: Aggregates,
    pub miner_count: usize,
    pub error: Option<String>,
    pub success: Option<String>,
    pub loading: bool,
    pub last_updated: Option<DateTime<Utc>>,
}
