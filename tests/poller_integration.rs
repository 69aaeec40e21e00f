//! Drives the real HTTP client against an in-process backend

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use subnet_monitor::{
    apis::backend::{BackendApi, BackendClient},
    config::ApiConfig,
    dashboard::{PollingController, FETCH_ERROR_MESSAGE},
    errors::MonitorError,
    notifications::{ConsoleNotifier, NotificationBridge, Notifier},
    storage::{HistoryStore, KvStore, MemoryKvStore, NoteStore},
};

#[derive(Default)]
struct Backend {
    subnet: String,
    coldkeys: Vec<String>,
    deleted: Vec<String>,
    fail_miners: bool,
}

type Shared = Arc<Mutex<Backend>>;

async fn get_subnet(State(db): State<Shared>) -> Json<Value> {
    Json(json!({ "subnet": db.lock().subnet }))
}

async fn post_subnet(State(db): State<Shared>, Json(body): Json<Value>) -> StatusCode {
    match body.get("subnet").and_then(Value::as_str) {
        Some(subnet) => {
            db.lock().subnet = subnet.to_string();
            StatusCode::OK
        }
        None => StatusCode::BAD_REQUEST,
    }
}

async fn get_settings() -> Json<Value> {
    Json(json!({
        "alphaPrice": "0.05",
        "regCost": 1.2,
        "reg_allowed": 0,
        "immunePeriod": 7200
    }))
}

async fn get_coldkeys(State(db): State<Shared>) -> Json<Vec<String>> {
    Json(db.lock().coldkeys.clone())
}

async fn post_coldkey(State(db): State<Shared>, Json(body): Json<Value>) -> StatusCode {
    match body.get("coldkey").and_then(Value::as_str) {
        Some(key) => {
            db.lock().coldkeys.push(key.to_string());
            StatusCode::CREATED
        }
        None => StatusCode::BAD_REQUEST,
    }
}

async fn delete_coldkey(State(db): State<Shared>, Path(key): Path<String>) -> StatusCode {
    let mut db = db.lock();
    db.deleted.push(key.clone());
    db.coldkeys.retain(|k| *k != key);
    StatusCode::NO_CONTENT
}

async fn get_miners(State(db): State<Shared>) -> Result<Json<Value>, StatusCode> {
    if db.lock().fail_miners {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!([
        {
            "coldkey": "5Cold",
            "hotkey": "5HotA",
            "uid": 3,
            "ranking": "1",
            "staking": "100.5",
            "dailyAlpha": "0.5",
            "immune": false,
            "deregistered": false,
            "inDanger": 0,
            "symbol": "ALPHA"
        },
        {
            "coldkey": "5Cold",
            "hotkey": "5HotB",
            "uid": "9",
            "staking": 20,
            "dailyAlpha": 1.25,
            "immune": 1,
            "deregistered": true,
            "deregisteredAt": "2024-05-01T12:00:00Z"
        }
    ])))
}

async fn get_price() -> Json<Value> {
    Json(json!({ "price": "20" }))
}

async fn get_base_price() -> Json<Value> {
    Json(json!({ "price": 10 }))
}

async fn get_notifications() -> Json<Value> {
    Json(json!({ "messages": ["Miner uid 9 was deregistered"] }))
}

async fn spawn_backend(db: Shared) -> String {
    let api = Router::new()
        .route("/subnet", get(get_subnet).post(post_subnet))
        .route("/settings", get(get_settings))
        .route("/coldkeys", get(get_coldkeys).post(post_coldkey))
        .route("/coldkeys/:key", delete(delete_coldkey))
        .route("/miners", get(get_miners))
        .route("/price", get(get_price))
        .route("/taoPrice", get(get_base_price))
        .route("/notifications", get(get_notifications))
        .with_state(db);
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

async fn setup(db: Shared) -> (PollingController, Arc<dyn BackendApi>) {
    let base_url = spawn_backend(db).await;
    let backend: Arc<dyn BackendApi> = Arc::new(
        BackendClient::new(&ApiConfig {
            base_url,
            timeout_secs: 5,
        })
        .unwrap(),
    );
    let storage: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
    let notes = Arc::new(NoteStore::open(Arc::clone(&storage)));
    let history = Arc::new(HistoryStore::open(storage, 2880));
    (
        PollingController::new(Arc::clone(&backend), notes, history),
        backend,
    )
}

fn seeded() -> Shared {
    Arc::new(Mutex::new(Backend {
        subnet: "42".to_string(),
        coldkeys: vec!["5Cold".to_string()],
        ..Backend::default()
    }))
}

#[tokio::test]
async fn test_refresh_over_http_derives_records_and_history() {
    let (controller, _) = setup(seeded()).await;

    let report = controller.refresh().await;
    assert!(report.is_success(), "failed: {:?}", report.failed);
    assert_eq!(report.history_points, 2);

    let summary = controller.summary();
    assert_eq!(summary.settings.subnet_id.as_deref(), Some("42"));
    assert!(!summary.settings.reg_allowed);
    assert_eq!(summary.immune_period_display, "7200 (24h, 0m)");
    assert_eq!(summary.coldkeys, vec!["5Cold".to_string()]);
    assert_eq!(summary.aggregates.total_miner_num, 2);
    assert_eq!(summary.aggregates.registered_miner_num, 1);
    assert_eq!(summary.aggregates.deregistered_miner_num, 1);
    assert!((summary.aggregates.total_daily_alpha - 1.75).abs() < 1e-9);
    assert!((summary.aggregates.daily_earn_usd - 350.0).abs() < 1e-9);

    let records = controller.records();
    assert_eq!(records[0].symbol_key(), "ALPHA");
    assert!((records[0].daily_alpha_usd - 100.0).abs() < 1e-9);
    assert_eq!(records[1].symbol_key(), "9");
    assert_eq!(records[1].deregistered_display(), "2024-05-01");

    let history = controller.history();
    assert_eq!(history.get("ALPHA").map(|s| s.len()), Some(1));
    assert_eq!(history.get("9").map(|s| s[0].v), Some(250.0));
}

#[tokio::test]
async fn test_failed_miners_endpoint_keeps_previous_rows() {
    let db = seeded();
    let (controller, _) = setup(Arc::clone(&db)).await;
    controller.refresh().await;

    db.lock().fail_miners = true;
    let report = controller.refresh().await;

    assert!(!report.is_success());
    assert_eq!(report.history_points, 0);
    assert_eq!(controller.records().len(), 2);
    assert_eq!(controller.error_banner().as_deref(), Some(FETCH_ERROR_MESSAGE));
}

#[tokio::test]
async fn test_coldkey_round_trip_encodes_path() {
    let db = seeded();
    let (controller, _) = setup(Arc::clone(&db)).await;
    controller.refresh().await;

    assert!(!controller.add_coldkey("5Cold").await.unwrap());
    assert!(controller.add_coldkey(" 5New/Key ").await.unwrap());
    assert!(db.lock().coldkeys.contains(&"5New/Key".to_string()));

    controller.remove_coldkey("5New/Key").await.unwrap();
    assert_eq!(db.lock().deleted, vec!["5New/Key".to_string()]);
    assert_eq!(controller.coldkeys(), vec!["5Cold".to_string()]);
}

#[tokio::test]
async fn test_change_subnet_posts_and_refreshes() {
    let db = seeded();
    let (controller, _) = setup(Arc::clone(&db)).await;

    let report = controller.change_subnet(" 7 ").await.unwrap();
    assert!(report.is_success());
    assert_eq!(db.lock().subnet, "7");
    assert_eq!(controller.summary().settings.subnet_id.as_deref(), Some("7"));
    assert_eq!(
        controller.success_banner().as_deref(),
        Some("Subnet updated to \"7\" successfully!")
    );

    let err = controller.change_subnet("  ").await.unwrap_err();
    assert!(matches!(err, MonitorError::Validation(_)));
}

#[tokio::test]
async fn test_bridge_reads_feed_over_http() {
    let (_, backend) = setup(seeded()).await;
    let notifiers: Vec<Arc<dyn Notifier>> = vec![Arc::new(ConsoleNotifier::new())];
    let bridge = NotificationBridge::new(backend, notifiers);

    let report = bridge.check().await.unwrap();
    assert_eq!(report.messages, 1);
    assert_eq!(report.delivered, 1);
}
