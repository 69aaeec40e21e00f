/// Derived metrics: raw backend miners + prices -> display records and totals
///
/// Everything here is pure. Missing or non-positive prices never fail a
/// computation; USD figures simply come out as zero.
use super::types::{Aggregates, MinerRecord, Prices};
use crate::apis::backend::types::{value_to_f64, RawMiner};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

/// Blocks per hour / per minute used for the immunity period display
const BLOCKS_PER_HOUR: u64 = 300;
const BLOCKS_PER_MINUTE: u64 = 5;

/// Multiplier from subnet-token amounts to the base currency
///
/// `Some` only when both prices are finite and strictly positive. History
/// points are gated on this so startup races never record zeros.
pub fn usd_factor(prices: &Prices) -> Option<f64> {
    let valid = |p: f64| p.is_finite() && p > 0.0;
    if valid(prices.subnet_price) && valid(prices.base_price) {
        Some(prices.subnet_price * prices.base_price)
    } else {
        None
    }
}

/// Stake value in the base currency, rounded to the nearest whole unit
pub fn stake_usd(stake: f64, prices: &Prices) -> f64 {
    usd_factor(prices)
        .map(|factor| (stake * factor).round())
        .unwrap_or(0.0)
}

/// Daily emission value in the base currency, two decimals
pub fn daily_alpha_usd(daily_alpha: f64, prices: &Prices) -> f64 {
    usd_factor(prices)
        .map(|factor| round2(daily_alpha * factor))
        .unwrap_or(0.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn derive_record(raw: &RawMiner, prices: &Prices) -> MinerRecord {
    MinerRecord {
        coldkey: raw.coldkey.clone(),
        hotkey: raw.hotkey.clone(),
        uid: raw.uid,
        ranking: raw.ranking,
        stake: raw.staking,
        daily_alpha: raw.daily_alpha,
        immune: raw.immune,
        registered: !raw.deregistered,
        in_danger: raw.in_danger,
        deregistered_at: raw.deregistered_at.as_ref().and_then(parse_timestamp),
        symbol: raw.symbol.clone(),
        stake_usd: stake_usd(raw.staking, prices),
        daily_alpha_usd: daily_alpha_usd(raw.daily_alpha, prices),
    }
}

pub fn derive_records(raw: &[RawMiner], prices: &Prices) -> Vec<MinerRecord> {
    raw.iter().map(|miner| derive_record(miner, prices)).collect()
}

/// Full linear scan over the current snapshot
pub fn aggregate(records: &[MinerRecord], prices: &Prices) -> Aggregates {
    let mut totals = Aggregates::default();

    for record in records {
        totals.total_daily_alpha += record.daily_alpha;
        totals.total_staking_alpha += record.stake;
        totals.total_miner_num += 1;
        if record.registered {
            totals.registered_miner_num += 1;
        } else {
            totals.deregistered_miner_num += 1;
        }
    }

    totals.total_daily_alpha = round2(totals.total_daily_alpha);
    totals.total_staking_alpha = round2(totals.total_staking_alpha);

    if let Some(factor) = usd_factor(prices) {
        totals.daily_earn_usd = round2(totals.total_daily_alpha * factor);
        totals.total_staking_usd = round2(totals.total_staking_alpha * factor);
    }

    totals
}

/// `"<blocks> (<h>h, <m>m)"`
pub fn format_immune_period(blocks: u64) -> String {
    format!(
        "{} ({}h, {}m)",
        blocks,
        blocks / BLOCKS_PER_HOUR,
        (blocks % BLOCKS_PER_HOUR) / BLOCKS_PER_MINUTE
    )
}

/// Accepts RFC 3339, a plain date, or epoch milliseconds (number or string)
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(at) = DateTime::parse_from_rfc3339(s) {
                return Some(at.with_timezone(&Utc));
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
            }
            value_to_f64(value).and_then(millis_to_datetime)
        }
        Value::Number(_) => value_to_f64(value).and_then(millis_to_datetime),
        _ => None,
    }
}

fn millis_to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    if ms <= 0.0 {
        return None;
    }
    Utc.timestamp_millis_opt(ms as i64).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(staking: f64, daily_alpha: f64, deregistered: bool) -> RawMiner {
        RawMiner {
            staking,
            daily_alpha,
            deregistered,
            ..RawMiner::default()
        }
    }

    #[test]
    fn test_scenario_totals() {
        let miners: Vec<RawMiner> = serde_json::from_value(json!([
            {"staking": "10.00", "dailyAlpha": "5.00", "deregistered": false},
            {"staking": "0.00", "dailyAlpha": "0.00", "deregistered": true}
        ]))
        .unwrap();

        let prices = Prices::default();
        let records = derive_records(&miners, &prices);
        let totals = aggregate(&records, &prices);

        assert_eq!(totals.total_staking_alpha, 10.0);
        assert_eq!(totals.total_daily_alpha, 5.0);
        assert_eq!(totals.total_miner_num, 2);
        assert_eq!(totals.registered_miner_num, 1);
        assert_eq!(totals.deregistered_miner_num, 1);
        assert_eq!(format!("{:.2}", totals.total_staking_alpha), "10.00");
    }

    #[test]
    fn test_stake_usd_scenario() {
        let prices = Prices::new(0.5, 20.0);
        assert_eq!(stake_usd(10.0, &prices), 100.0);

        let record = derive_record(&raw(10.0, 1.234, false), &prices);
        assert_eq!(record.stake_usd, 100.0);
        assert_eq!(record.daily_alpha_usd, 12.34);
    }

    #[test]
    fn test_unknown_prices_yield_zero_usd() {
        for prices in [
            Prices::new(0.0, 20.0),
            Prices::new(0.5, 0.0),
            Prices::new(f64::NAN, 20.0),
            Prices::new(0.5, f64::INFINITY),
            Prices::new(-1.0, 20.0),
        ] {
            assert_eq!(usd_factor(&prices), None);
            let record = derive_record(&raw(10.0, 5.0, false), &prices);
            assert_eq!(record.stake_usd, 0.0);
            assert_eq!(record.daily_alpha_usd, 0.0);
        }
        assert_eq!(usd_factor(&Prices::new(0.5, 20.0)), Some(10.0));
    }

    #[test]
    fn test_counts_partition_the_list() {
        let prices = Prices::new(1.0, 1.0);
        for n in 0..12 {
            let miners: Vec<RawMiner> = (0..n).map(|i| raw(1.0, 1.0, i % 3 == 0)).collect();
            let totals = aggregate(&derive_records(&miners, &prices), &prices);
            assert_eq!(totals.total_miner_num, n);
            assert_eq!(totals.registered_miner_num + totals.deregistered_miner_num, n);
        }
    }

    #[test]
    fn test_empty_list_aggregates_to_zero() {
        let totals = aggregate(&[], &Prices::new(0.5, 20.0));
        assert_eq!(totals, Aggregates::default());
    }

    #[test]
    fn test_aggregate_usd_totals() {
        let prices = Prices::new(0.5, 20.0);
        let records = derive_records(&[raw(10.0, 2.0, false), raw(5.0, 1.0, true)], &prices);
        let totals = aggregate(&records, &prices);
        assert_eq!(totals.daily_earn_usd, 30.0);
        assert_eq!(totals.total_staking_usd, 150.0);
    }

    #[test]
    fn test_display_projections() {
        let mut miner = raw(3.14159, 0.5, true);
        miner.immune = true;
        miner.deregistered_at = Some(json!("2024-05-01T12:30:00Z"));
        let record = derive_record(&miner, &Prices::default());

        assert_eq!(record.stake_display(), "3.14");
        assert_eq!(record.daily_alpha_display(), "0.50");
        assert_eq!(record.immune_display(), "Yes");
        assert_eq!(record.registered_display(), "No");
        assert_eq!(record.in_danger_display(), "No");
        assert_eq!(record.deregistered_display(), "2024-05-01");

        let record = derive_record(&raw(1.0, 1.0, false), &Prices::default());
        assert_eq!(record.deregistered_display(), "No");
    }

    #[test]
    fn test_symbol_key_fallback_chain() {
        let mut miner = raw(0.0, 0.0, false);
        miner.hotkey = "5Hot".to_string();
        let prices = Prices::default();
        assert_eq!(derive_record(&miner, &prices).symbol_key(), "5Hot");

        miner.uid = Some(17);
        assert_eq!(derive_record(&miner, &prices).symbol_key(), "17");

        miner.symbol = Some("ALPHA".to_string());
        assert_eq!(derive_record(&miner, &prices).symbol_key(), "ALPHA");

        miner.symbol = Some("  ".to_string());
        assert_eq!(derive_record(&miner, &prices).symbol_key(), "17");
    }

    #[test]
    fn test_immune_period_format() {
        assert_eq!(format_immune_period(0), "0 (0h, 0m)");
        assert_eq!(format_immune_period(7200), "7200 (24h, 0m)");
        assert_eq!(format_immune_period(4999), "4999 (16h, 39m)");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp(&json!("2024-05-01")), Some(expected));
        assert_eq!(parse_timestamp(&json!(1714521600000i64)), Some(expected));
        assert_eq!(parse_timestamp(&json!("1714521600000")), Some(expected));
        assert_eq!(parse_timestamp(&json!("")), None);
        assert_eq!(parse_timestamp(&json!(false)), None);
    }
}
