/// Wire types for the monitoring backend
///
/// The backend is loose about types: numbers sometimes arrive as strings
/// (`"10.00"`), ids as numbers or strings, flags as 0/1. Every field is
/// decoded leniently and falls back to a neutral default.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// GET /subnet
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubnetResponse {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub subnet: Option<String>,
}

/// GET /settings
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsResponse {
    /// Subnet token price as reported by the backend (emission based)
    #[serde(rename = "alphaPrice", default, deserialize_with = "lenient_f64")]
    pub alpha_price: f64,
    #[serde(rename = "regCost", default, deserialize_with = "lenient_f64")]
    pub reg_cost: f64,
    #[serde(default = "default_true", deserialize_with = "lenient_bool_default_true")]
    pub reg_allowed: bool,
    #[serde(rename = "immunePeriod", default, deserialize_with = "lenient_u64")]
    pub immune_period: u64,
}

impl Default for SettingsResponse {
    fn default() -> Self {
        Self {
            alpha_price: 0.0,
            reg_cost: 0.0,
            reg_allowed: true,
            immune_period: 0,
        }
    }
}

/// One entry of GET /miners
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMiner {
    #[serde(default, deserialize_with = "lenient_string")]
    pub coldkey: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hotkey: String,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub uid: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub ranking: Option<u64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub staking: f64,
    #[serde(rename = "dailyAlpha", default, deserialize_with = "lenient_f64")]
    pub daily_alpha: f64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub immune: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub deregistered: bool,
    #[serde(rename = "inDanger", default, deserialize_with = "lenient_bool")]
    pub in_danger: bool,
    /// RFC 3339 string or epoch milliseconds
    #[serde(rename = "deregisteredAt", default)]
    pub deregistered_at: Option<Value>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub symbol: Option<String>,
}

/// GET /price and GET /taoPrice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceResponse {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
}

/// GET /notifications
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationsResponse {
    #[serde(default)]
    pub messages: Vec<String>,
}

/// POST /coldkeys
#[derive(Debug, Clone, Serialize)]
pub struct AddColdkeyRequest<'a> {
    pub coldkey: &'a str,
}

/// POST /subnet
#[derive(Debug, Clone, Serialize)]
pub struct SetSubnetRequest<'a> {
    pub subnet: &'a str,
}

// =============================================================================
// LENIENT DECODERS
// =============================================================================

pub fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn default_true() -> bool {
    true
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(value_to_f64).unwrap_or(0.0))
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(lenient_opt_u64(d)?.unwrap_or(0))
}

fn lenient_opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value
        .as_ref()
        .and_then(value_to_f64)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u64))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(d)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(value_to_string))
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(value_to_bool).unwrap_or(false))
}

fn lenient_bool_default_true<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(value_to_bool).unwrap_or(true))
}
