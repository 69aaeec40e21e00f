/// Bounded time-series history per miner symbol
///
/// Every `record` appends one sample, trims the series to the retention cap
/// (oldest first) and mirrors the whole mapping to storage so charts survive
/// restarts. Series are independent of each other.
use super::kv::KvStore;
use crate::errors::{MonitorError, MonitorResult};
use crate::logger::{self, LogTag};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

pub const HISTORY_STORAGE_KEY: &str = "dailyAlphaUsdHistory";

/// One sample: client wall-clock milliseconds and value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub t: i64,
    pub v: f64,
}

impl HistoryPoint {
    pub fn new(t: i64, v: f64) -> Self {
        Self { t, v }
    }
}

pub type HistorySeries = VecDeque<HistoryPoint>;

pub struct HistoryStore {
    storage: Arc<dyn KvStore>,
    max_points: usize,
    series: RwLock<BTreeMap<String, HistorySeries>>,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn KvStore>, max_points: usize) -> Self {
        Self {
            storage,
            max_points: max_points.max(1),
            series: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a store and immediately restore persisted series
    pub fn open(storage: Arc<dyn KvStore>, max_points: usize) -> Self {
        let store = Self::new(storage, max_points);
        store.load();
        store
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Restore all series from storage
    ///
    /// Series are re-sorted and trimmed on the way in, so a document written
    /// with a larger cap is still honoured.
    pub fn load(&self) {
        let mut loaded = match self.read_persisted() {
            Ok(series) => series,
            Err(e) => {
                logger::warning(LogTag::Storage, &format!("Ignoring stored history: {}", e));
                BTreeMap::new()
            }
        };

        for points in loaded.values_mut() {
            points.make_contiguous().sort_by_key(|p| p.t);
            trim_front(points, self.max_points);
        }

        logger::debug(
            LogTag::Storage,
            &format!(
                "Loaded history for {} series ({} points)",
                loaded.len(),
                loaded.values().map(|s| s.len()).sum::<usize>()
            ),
        );
        *self.series.write() = loaded;
    }

    fn read_persisted(&self) -> MonitorResult<BTreeMap<String, HistorySeries>> {
        match self.storage.read(HISTORY_STORAGE_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| MonitorError::storage(HISTORY_STORAGE_KEY, e)),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Append a point to `key`, trim, then persist
    pub fn record(&self, key: &str, point: HistoryPoint) {
        self.append(key, point);
        self.persist_or_warn();
    }

    /// Append many points with a single persist at the end
    pub fn record_batch<I>(&self, points: I) -> usize
    where
        I: IntoIterator<Item = (String, HistoryPoint)>,
    {
        let mut count = 0;
        for (key, point) in points {
            self.append(&key, point);
            count += 1;
        }
        if count > 0 {
            self.persist_or_warn();
        }
        count
    }

    fn append(&self, key: &str, point: HistoryPoint) {
        let mut series = self.series.write();
        let points = series.entry(key.to_string()).or_default();
        points.push_back(point);
        trim_front(points, self.max_points);
    }

    fn persist_or_warn(&self) {
        if let Err(e) = self.persist() {
            logger::warning(LogTag::Storage, &format!("Failed to persist history: {}", e));
        }
    }

    pub fn persist(&self) -> MonitorResult<()> {
        let raw = serde_json::to_string(&*self.series.read())
            .map_err(|e| MonitorError::storage(HISTORY_STORAGE_KEY, e))?;
        self.storage.write(HISTORY_STORAGE_KEY, &raw)
    }

    pub fn get(&self, key: &str) -> Option<Vec<HistoryPoint>> {
        self.series
            .read()
            .get(key)
            .map(|points| points.iter().copied().collect())
    }

    pub fn keys(&self) -> Vec<String> {
        self.series.read().keys().cloned().collect()
    }

    /// Copy of every series, ordered by key
    pub fn snapshot(&self) -> BTreeMap<String, Vec<HistoryPoint>> {
        self.series
            .read()
            .iter()
            .map(|(key, points)| (key.clone(), points.iter().copied().collect()))
            .collect()
    }
}

fn trim_front(points: &mut HistorySeries, max_points: usize) {
    while points.len() > max_points {
        points.pop_front();
    }
}
