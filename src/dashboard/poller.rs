/// Polling controller
///
/// One `refresh()` is one data cycle:
/// 1. clear the transient error banner
/// 2. fetch subnet, settings, coldkeys, miners, subnet price, base price
///    (in that order, each independent of the others)
/// 3. rebuild display records and aggregates from the latest state
/// 4. if the miner list arrived this cycle, append one history point per miner
///
/// Failures never clear what is already displayed; they only set the banner
/// and wait for the next tick. Operator actions (watchlist and subnet
/// changes) also live here since they share the banners and the backend.
use super::generations::{FetchKind, RequestGenerations};
use super::state::{DashboardState, DashboardSummary};
use crate::apis::backend::BackendApi;
use crate::errors::{MonitorError, MonitorResult};
use crate::logger::{self, LogTag};
use crate::miners::{aggregate, derive_records, usd_factor, MinerRecord};
use crate::storage::{HistoryPoint, HistoryStore, NoteStore};
use crate::views::{build_charts, ChartOptions, ChartView, TableView};
use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch data. Please try again.";
pub const ADD_COLDKEY_ERROR: &str = "Failed to register coldkey.";
pub const REMOVE_COLDKEY_ERROR: &str = "Failed to delete coldkey.";
pub const INVALID_COLDKEY_MESSAGE: &str = "Please enter a valid coldkey.";
pub const INVALID_SUBNET_MESSAGE: &str = "Please enter a valid subnet.";
pub const SUBNET_UPDATE_ERROR: &str =
    "Failed to update subnet. Please check the value and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchOutcome {
    Applied,
    Failed,
    Stale,
}

/// What happened during one refresh cycle
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub applied: Vec<FetchKind>,
    pub failed: Vec<FetchKind>,
    pub stale: Vec<FetchKind>,
    pub history_points: usize,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn note(&mut self, kind: FetchKind, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Applied => self.applied.push(kind),
            FetchOutcome::Failed => self.failed.push(kind),
            FetchOutcome::Stale => self.stale.push(kind),
        }
    }
}

pub struct PollingController {
    backend: Arc<dyn BackendApi>,
    notes: Arc<NoteStore>,
    history: Arc<HistoryStore>,
    generations: RequestGenerations,
    state: RwLock<DashboardState>,
}

impl PollingController {
    pub fn new(
        backend: Arc<dyn BackendApi>,
        notes: Arc<NoteStore>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            backend,
            notes,
            history,
            generations: RequestGenerations::new(),
            state: RwLock::new(DashboardState::default()),
        }
    }

    pub fn backend(&self) -> &Arc<dyn BackendApi> {
        &self.backend
    }

    pub fn notes(&self) -> &Arc<NoteStore> {
        &self.notes
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn summary(&self) -> DashboardSummary {
        self.state.read().summary()
    }

    pub fn records(&self) -> Vec<MinerRecord> {
        self.state.read().records.clone()
    }

    pub fn coldkeys(&self) -> Vec<String> {
        self.state.read().coldkeys.clone()
    }

    pub fn error_banner(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn success_banner(&self) -> Option<String> {
        self.state.read().success.clone()
    }

    /// Run one data cycle
    pub async fn refresh(&self) -> CycleReport {
        {
            let mut state = self.state.write();
            state.error = None;
            state.loading = true;
        }

        let mut report = CycleReport::default();
        let backend = Arc::clone(&self.backend);

        let outcome = self
            .fetch(FetchKind::Subnet, backend.fetch_subnet(), |state, subnet| {
                state.settings.subnet_id = subnet;
            })
            .await;
        report.note(FetchKind::Subnet, outcome);

        let outcome = self
            .fetch(FetchKind::Settings, backend.fetch_settings(), |state, settings| {
                state.settings.apply(settings);
            })
            .await;
        report.note(FetchKind::Settings, outcome);

        let outcome = self
            .fetch(FetchKind::Coldkeys, backend.fetch_coldkeys(), |state, coldkeys| {
                state.coldkeys = coldkeys;
            })
            .await;
        report.note(FetchKind::Coldkeys, outcome);

        let miners_outcome = self
            .fetch(FetchKind::Miners, backend.fetch_miners(), |state, miners| {
                state.raw_miners = miners;
                state.miners_received_at = Some(Utc::now());
            })
            .await;
        report.note(FetchKind::Miners, miners_outcome);

        let outcome = self
            .fetch(FetchKind::SubnetPrice, backend.fetch_subnet_price(), |state, price| {
                state.prices.subnet_price = price;
            })
            .await;
        report.note(FetchKind::SubnetPrice, outcome);

        let outcome = self
            .fetch(FetchKind::BasePrice, backend.fetch_base_price(), |state, price| {
                state.prices.base_price = price;
            })
            .await;
        report.note(FetchKind::BasePrice, outcome);

        let points = self.recompute(miners_outcome == FetchOutcome::Applied);
        report.history_points = self.history.record_batch(points);

        logger::debug(
            LogTag::Poller,
            &format!(
                "Refresh cycle done: applied={} failed={} stale={} history_points={}",
                report.applied.len(),
                report.failed.len(),
                report.stale.len(),
                report.history_points
            ),
        );

        report
    }

    /// Issue a generation, await the request and apply the result if it is
    /// still the latest of its kind
    async fn fetch<T, Fut, Apply>(&self, kind: FetchKind, request: Fut, apply: Apply) -> FetchOutcome
    where
        Fut: Future<Output = MonitorResult<T>>,
        Apply: FnOnce(&mut DashboardState, T),
    {
        let generation = self.generations.issue(kind);
        let result = request.await;

        let mut state = self.state.write();
        if !self.generations.is_current(kind, generation) {
            logger::debug(
                LogTag::Poller,
                &format!(
                    "Discarding stale {} response (generation {} < {})",
                    kind.as_str(),
                    generation,
                    self.generations.current(kind)
                ),
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(value) => {
                apply(&mut state, value);
                FetchOutcome::Applied
            }
            Err(e) => {
                logger::warning(
                    LogTag::Poller,
                    &format!("Failed to fetch {}: {}", kind.as_str(), e),
                );
                state.error = Some(FETCH_ERROR_MESSAGE.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Rebuild records and aggregates; returns the history points to record
    fn recompute(&self, miners_fetched: bool) -> Vec<(String, HistoryPoint)> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        state.records = derive_records(&state.raw_miners, &state.prices);
        state.aggregates = aggregate(&state.records, &state.prices);
        state.loading = false;
        state.last_updated = Some(Utc::now());

        if !miners_fetched || usd_factor(&state.prices).is_none() {
            return Vec::new();
        }
        let Some(received_at) = state.miners_received_at else {
            return Vec::new();
        };

        let t = received_at.timestamp_millis();
        state
            .records
            .iter()
            .map(|record| (record.symbol_key(), HistoryPoint::new(t, record.daily_alpha_usd)))
            .collect()
    }

    /// Table over the current records, reading notes from the shared store
    pub fn table_view(&self) -> TableView {
        TableView::new(self.records(), Arc::clone(&self.notes))
    }

    pub fn chart_view(&self, options: &ChartOptions) -> ChartView {
        build_charts(&self.history, &self.notes, options)
    }

    fn set_error(&self, message: &str) {
        self.state.write().error = Some(message.to_string());
    }

    /// Register a coldkey on the backend and add it to the watchlist
    ///
    /// Returns `Ok(false)` when the key is already present (no request sent).
    pub async fn add_coldkey(&self, input: &str) -> MonitorResult<bool> {
        let coldkey = input.trim();
        if coldkey.is_empty() {
            self.set_error(INVALID_COLDKEY_MESSAGE);
            return Err(MonitorError::Validation(INVALID_COLDKEY_MESSAGE.to_string()));
        }
        if self.state.read().coldkeys.iter().any(|k| k == coldkey) {
            logger::debug(
                LogTag::Poller,
                &format!("Coldkey {} already registered, skipping", coldkey),
            );
            return Ok(false);
        }

        if let Err(e) = self.backend.add_coldkey(coldkey).await {
            logger::error(LogTag::Poller, &format!("Failed to add coldkey {}: {}", coldkey, e));
            self.set_error(ADD_COLDKEY_ERROR);
            return Err(e);
        }

        let mut state = self.state.write();
        if !state.coldkeys.iter().any(|k| k == coldkey) {
            state.coldkeys.push(coldkey.to_string());
        }
        logger::info(LogTag::Poller, &format!("Registered coldkey {}", coldkey));
        Ok(true)
    }

    pub async fn remove_coldkey(&self, input: &str) -> MonitorResult<()> {
        let coldkey = input.trim();
        if coldkey.is_empty() {
            self.set_error(INVALID_COLDKEY_MESSAGE);
            return Err(MonitorError::Validation(INVALID_COLDKEY_MESSAGE.to_string()));
        }

        if let Err(e) = self.backend.remove_coldkey(coldkey).await {
            logger::error(
                LogTag::Poller,
                &format!("Failed to delete coldkey {}: {}", coldkey, e),
            );
            self.set_error(REMOVE_COLDKEY_ERROR);
            return Err(e);
        }

        self.state.write().coldkeys.retain(|k| k != coldkey);
        logger::info(LogTag::Poller, &format!("Deleted coldkey {}", coldkey));
        Ok(())
    }

    /// Change the tracked subnet, then refresh immediately
    pub async fn change_subnet(&self, input: &str) -> MonitorResult<CycleReport> {
        let subnet = input.trim();
        if subnet.is_empty() {
            self.set_error(INVALID_SUBNET_MESSAGE);
            return Err(MonitorError::Validation(INVALID_SUBNET_MESSAGE.to_string()));
        }

        if let Err(e) = self.backend.set_subnet(subnet).await {
            logger::error(LogTag::Poller, &format!("Failed to update subnet: {}", e));
            {
                let mut state = self.state.write();
                state.error = Some(SUBNET_UPDATE_ERROR.to_string());
                state.success = None;
            }
            return Err(e);
        }

        {
            let mut state = self.state.write();
            state.settings.subnet_id = Some(subnet.to_string());
            state.success = Some(format!("Subnet updated to \"{}\" successfully!", subnet));
            state.error = None;
        }
        logger::info(LogTag::Poller, &format!("Tracked subnet changed to {}", subnet));

        Ok(self.refresh().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::backend::types::{RawMiner, SettingsResponse};
    use crate::storage::MemoryKvStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeBackend {
        subnet: Mutex<Option<String>>,
        coldkeys: Mutex<Vec<String>>,
        miners: Mutex<Vec<RawMiner>>,
        subnet_price: Mutex<f64>,
        base_price: Mutex<f64>,
        failing: Mutex<HashSet<&'static str>>,
        write_calls: AtomicUsize,
        miners_calls: AtomicUsize,
        /// First miners call waits here and then returns `slow_miners`
        miners_gate: Option<Arc<Notify>>,
        slow_miners: Vec<RawMiner>,
    }

    impl FakeBackend {
        fn check(&self, name: &'static str) -> MonitorResult<()> {
            if self.failing.lock().contains(name) {
                Err(MonitorError::network(name, "connection refused"))
            } else {
                Ok(())
            }
        }

        fn fail(&self, name: &'static str) {
            self.failing.lock().insert(name);
        }

        fn heal(&self) {
            self.failing.lock().clear();
        }
    }

    #[async_trait]
    impl BackendApi for FakeBackend {
        async fn fetch_subnet(&self) -> MonitorResult<Option<String>> {
            self.check("subnet")?;
            Ok(self.subnet.lock().clone())
        }

        async fn fetch_settings(&self) -> MonitorResult<SettingsResponse> {
            self.check("settings")?;
            Ok(SettingsResponse {
                immune_period: 7200,
                ..SettingsResponse::default()
            })
        }

        async fn fetch_coldkeys(&self) -> MonitorResult<Vec<String>> {
            self.check("coldkeys")?;
            Ok(self.coldkeys.lock().clone())
        }

        async fn fetch_miners(&self) -> MonitorResult<Vec<RawMiner>> {
            let call = self.miners_calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                if let Some(gate) = &self.miners_gate {
                    gate.notified().await;
                    return Ok(self.slow_miners.clone());
                }
            }
            self.check("miners")?;
            Ok(self.miners.lock().clone())
        }

        async fn fetch_subnet_price(&self) -> MonitorResult<f64> {
            self.check("price")?;
            Ok(*self.subnet_price.lock())
        }

        async fn fetch_base_price(&self) -> MonitorResult<f64> {
            self.check("taoPrice")?;
            Ok(*self.base_price.lock())
        }

        async fn fetch_notifications(&self) -> MonitorResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn add_coldkey(&self, coldkey: &str) -> MonitorResult<()> {
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            self.check("add_coldkey")?;
            self.coldkeys.lock().push(coldkey.to_string());
            Ok(())
        }

        async fn remove_coldkey(&self, coldkey: &str) -> MonitorResult<()> {
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            self.check("remove_coldkey")?;
            self.coldkeys.lock().retain(|k| k != coldkey);
            Ok(())
        }

        async fn set_subnet(&self, subnet: &str) -> MonitorResult<()> {
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            self.check("set_subnet")?;
            *self.subnet.lock() = Some(subnet.to_string());
            Ok(())
        }
    }

    fn miner(symbol: &str, staking: f64, daily_alpha: f64, deregistered: bool) -> RawMiner {
        RawMiner {
            coldkey: "5Cold".to_string(),
            hotkey: format!("5Hot{}", symbol),
            symbol: Some(symbol.to_string()),
            staking,
            daily_alpha,
            deregistered,
            ..RawMiner::default()
        }
    }

    fn scenario_backend() -> FakeBackend {
        let backend = FakeBackend::default();
        *backend.subnet.lock() = Some("42".to_string());
        *backend.coldkeys.lock() = vec!["5Cold".to_string()];
        *backend.miners.lock() = vec![miner("A", 10.0, 5.0, false), miner("B", 0.0, 0.0, true)];
        *backend.subnet_price.lock() = 0.5;
        *backend.base_price.lock() = 20.0;
        backend
    }

    fn controller(backend: FakeBackend) -> (Arc<FakeBackend>, PollingController) {
        let backend = Arc::new(backend);
        let storage = Arc::new(MemoryKvStore::new());
        let notes = Arc::new(NoteStore::new(storage.clone()));
        let history = Arc::new(HistoryStore::new(storage, 10));
        let controller = PollingController::new(backend.clone(), notes, history);
        (backend, controller)
    }

    #[tokio::test]
    async fn test_refresh_applies_every_fetch() {
        let (_backend, controller) = controller(scenario_backend());

        let report = controller.refresh().await;
        assert!(report.is_success());
        assert_eq!(report.applied, FetchKind::POLL_ORDER.to_vec());

        let summary = controller.summary();
        assert_eq!(summary.settings.subnet_id.as_deref(), Some("42"));
        assert_eq!(summary.immune_period_display, "7200 (24h, 0m)");
        assert_eq!(summary.coldkeys, vec!["5Cold".to_string()]);
        assert_eq!(summary.aggregates.total_staking_alpha, 10.0);
        assert_eq!(summary.aggregates.total_daily_alpha, 5.0);
        assert_eq!(summary.aggregates.total_miner_num, 2);
        assert_eq!(summary.aggregates.registered_miner_num, 1);
        assert_eq!(summary.aggregates.deregistered_miner_num, 1);
        assert!(!summary.loading);
        assert!(summary.error.is_none());

        let records = controller.records();
        assert_eq!(records[0].stake_usd, 100.0);
    }

    #[tokio::test]
    async fn test_history_recorded_with_miner_arrival_time() {
        let (_backend, controller) = controller(scenario_backend());
        let before = Utc::now().timestamp_millis();
        let report = controller.refresh().await;
        let after = Utc::now().timestamp_millis();

        assert_eq!(report.history_points, 2);
        let points = controller.history().get("A").unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].v, 50.0);
        assert!(points[0].t >= before && points[0].t <= after);
    }

    #[tokio::test]
    async fn test_no_history_without_valid_prices() {
        let backend = scenario_backend();
        *backend.base_price.lock() = 0.0;
        let (backend, controller) = controller(backend);

        let report = controller.refresh().await;
        assert_eq!(report.history_points, 0);
        assert!(controller.history().keys().is_empty());

        // Price fetch failing at startup must not record zeros either
        *backend.base_price.lock() = 20.0;
        backend.fail("taoPrice");
        let report = controller.refresh().await;
        assert_eq!(report.history_points, 0);
        assert_eq!(controller.records()[0].stake_usd, 0.0);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_displayed_data() {
        let (backend, controller) = controller(scenario_backend());
        controller.refresh().await;

        backend.fail("miners");
        let report = controller.refresh().await;
        assert_eq!(report.failed, vec![FetchKind::Miners]);
        assert_eq!(controller.error_banner().as_deref(), Some(FETCH_ERROR_MESSAGE));
        assert_eq!(controller.records().len(), 2);
        // No new miner list this cycle, so no new points
        assert_eq!(report.history_points, 0);
        assert_eq!(controller.history().get("A").unwrap().len(), 1);

        backend.heal();
        let report = controller.refresh().await;
        assert!(report.is_success());
        assert!(controller.error_banner().is_none());
    }

    #[tokio::test]
    async fn test_fetches_are_independent() {
        let backend = scenario_backend();
        backend.fail("subnet");
        backend.fail("settings");
        let (_backend, controller) = controller(backend);

        let report = controller.refresh().await;
        assert_eq!(report.failed, vec![FetchKind::Subnet, FetchKind::Settings]);
        assert_eq!(controller.records().len(), 2);
        assert_eq!(controller.coldkeys().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_miner_response_is_discarded() {
        let gate = Arc::new(Notify::new());
        let mut backend = scenario_backend();
        backend.miners_gate = Some(gate.clone());
        backend.slow_miners = vec![miner("OLD", 1.0, 1.0, false)];
        let (backend, controller) = controller(backend);
        let controller = Arc::new(controller);

        let slow = tokio::spawn({
            let controller = controller.clone();
            async move { controller.refresh().await }
        });
        while backend.miners_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let fresh = controller.refresh().await;
        assert!(fresh.applied.contains(&FetchKind::Miners));

        gate.notify_one();
        let slow = slow.await.unwrap();
        assert!(slow.stale.contains(&FetchKind::Miners));

        let records = controller.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.symbol_key() != "OLD"));
        assert!(controller.history().get("OLD").is_none());
    }

    #[tokio::test]
    async fn test_empty_miner_list() {
        let backend = scenario_backend();
        backend.miners.lock().clear();
        let (_backend, controller) = controller(backend);

        let report = controller.refresh().await;
        assert_eq!(report.history_points, 0);
        assert!(controller.records().is_empty());
        assert_eq!(controller.summary().aggregates, crate::miners::Aggregates::default());
    }

    #[tokio::test]
    async fn test_add_coldkey_validation_and_duplicates() {
        let (backend, controller) = controller(scenario_backend());
        controller.refresh().await;

        let err = controller.add_coldkey("   ").await.unwrap_err();
        assert!(matches!(err, MonitorError::Validation(_)));
        assert_eq!(backend.write_calls.load(Ordering::SeqCst), 0);

        assert!(!controller.add_coldkey("5Cold").await.unwrap());
        assert_eq!(backend.write_calls.load(Ordering::SeqCst), 0);

        assert!(controller.add_coldkey(" 5New ").await.unwrap());
        assert_eq!(controller.coldkeys(), vec!["5Cold".to_string(), "5New".to_string()]);
    }

    #[tokio::test]
    async fn test_coldkey_failures_set_banners() {
        let (backend, controller) = controller(scenario_backend());
        controller.refresh().await;

        backend.fail("add_coldkey");
        assert!(controller.add_coldkey("5New").await.is_err());
        assert_eq!(controller.error_banner().as_deref(), Some(ADD_COLDKEY_ERROR));
        assert_eq!(controller.coldkeys().len(), 1);

        backend.fail("remove_coldkey");
        assert!(controller.remove_coldkey("5Cold").await.is_err());
        assert_eq!(controller.error_banner().as_deref(), Some(REMOVE_COLDKEY_ERROR));
        assert_eq!(controller.coldkeys().len(), 1);

        backend.heal();
        controller.remove_coldkey("5Cold").await.unwrap();
        assert!(controller.coldkeys().is_empty());
    }

    #[tokio::test]
    async fn test_change_subnet() {
        let (backend, controller) = controller(scenario_backend());

        let err = controller.change_subnet("  ").await.unwrap_err();
        assert!(matches!(err, MonitorError::Validation(_)));
        assert_eq!(controller.error_banner().as_deref(), Some(INVALID_SUBNET_MESSAGE));
        assert_eq!(backend.write_calls.load(Ordering::SeqCst), 0);

        let report = controller.change_subnet("7").await.unwrap();
        assert!(report.is_success());
        assert_eq!(
            controller.success_banner().as_deref(),
            Some("Subnet updated to \"7\" successfully!")
        );
        assert_eq!(controller.summary().settings.subnet_id.as_deref(), Some("7"));

        backend.fail("set_subnet");
        assert!(controller.change_subnet("8").await.is_err());
        assert_eq!(controller.error_banner().as_deref(), Some(SUBNET_UPDATE_ERROR));
        assert!(controller.success_banner().is_none());
    }
}
