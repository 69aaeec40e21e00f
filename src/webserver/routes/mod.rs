use crate::views::ChartOptions;
use crate::webserver::{state::AppState, templates};
use axum::{extract::State, response::Html, Router};
use std::sync::Arc;

pub mod charts;
pub mod coldkeys;
pub mod dashboard;
pub mod notes;
pub mod status;
pub mod table;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", axum::routing::get(dashboard_page))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(status::routes())
        .merge(dashboard::routes())
        .merge(table::routes())
        .merge(charts::routes())
        .merge(notes::routes())
        .merge(coldkeys::routes())
}

/// Dashboard page handler
async fn dashboard_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let summary = state.controller.summary();
    let table = state.controller.table_view();
    let rows: Vec<usize> = (0..table.row_count()).collect();
    let charts = state
        .controller
        .chart_view(&ChartOptions::from_config(&state.history));

    Html(templates::dashboard_page(
        &summary,
        &table.snapshot(&rows),
        &charts,
        state.refresh_secs,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::backend::types::{RawMiner, SettingsResponse};
    use crate::apis::BackendApi;
    use crate::config::HistoryConfig;
    use crate::dashboard::PollingController;
    use crate::errors::MonitorResult;
    use crate::storage::{HistoryStore, MemoryKvStore, NoteStore};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct StaticBackend {
        coldkeys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BackendApi for StaticBackend {
        async fn fetch_subnet(&self) -> MonitorResult<Option<String>> {
            Ok(Some("1".to_string()))
        }
        async fn fetch_settings(&self) -> MonitorResult<SettingsResponse> {
            Ok(SettingsResponse::default())
        }
        async fn fetch_coldkeys(&self) -> MonitorResult<Vec<String>> {
            Ok(self.coldkeys.lock().clone())
        }
        async fn fetch_miners(&self) -> MonitorResult<Vec<RawMiner>> {
            Ok(vec![RawMiner {
                coldkey: "5Cold".to_string(),
                hotkey: "5Hot".to_string(),
                uid: Some(4),
                symbol: Some("ALPHA".to_string()),
                staking: 10.0,
                daily_alpha: 1.0,
                ..RawMiner::default()
            }])
        }
        async fn fetch_subnet_price(&self) -> MonitorResult<f64> {
            Ok(0.5)
        }
        async fn fetch_base_price(&self) -> MonitorResult<f64> {
            Ok(20.0)
        }
        async fn fetch_notifications(&self) -> MonitorResult<Vec<String>> {
            Ok(Vec::new())
        }
        async fn add_coldkey(&self, coldkey: &str) -> MonitorResult<()> {
            self.coldkeys.lock().push(coldkey.to_string());
            Ok(())
        }
        async fn remove_coldkey(&self, coldkey: &str) -> MonitorResult<()> {
            self.coldkeys.lock().retain(|k| k != coldkey);
            Ok(())
        }
        async fn set_subnet(&self, _subnet: &str) -> MonitorResult<()> {
            Ok(())
        }
    }

    async fn app() -> Router {
        let backend = Arc::new(StaticBackend {
            coldkeys: Mutex::new(vec!["5Cold".to_string()]),
        });
        let storage = Arc::new(MemoryKvStore::new());
        let controller = Arc::new(PollingController::new(
            backend,
            Arc::new(NoteStore::new(storage.clone())),
            Arc::new(HistoryStore::new(storage, 100)),
        ));
        controller.refresh().await;
        create_router(Arc::new(AppState::new(controller, HistoryConfig::default(), 60)))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_dashboard_and_table() {
        let app = app().await;

        let (status, body) = call(&app, Method::GET, "/api/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["aggregates"]["total_miner_num"], 1);

        let (_, body) = call(&app, Method::GET, "/api/table?hotkey=HOT", None).await;
        assert_eq!(body["rows"].as_array().unwrap().len(), 1);
        assert_eq!(body["rows"][0]["cells"]["staking_usd"], "100");

        let (_, body) = call(&app, Method::GET, "/api/table?hotkey=zzz", None).await;
        assert!(body["rows"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_note_put_returns_refresh_hint() {
        let app = app().await;

        let (status, body) =
            call(&app, Method::PUT, "/api/notes/ALPHA", Some(json!({"note": "rig 1"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["note"], "rig 1");
        assert_eq!(body["refresh"]["columns"], json!(["SymbolNotes"]));

        let (_, body) = call(&app, Method::GET, "/api/notes", None).await;
        assert_eq!(body["ALPHA"], "rig 1");

        let (_, body) = call(&app, Method::GET, "/api/charts?keys=ALPHA", None).await;
        assert_eq!(body["series"][0]["label"], "ALPHA - rig 1");
    }

    #[tokio::test]
    async fn test_coldkey_routes() {
        let app = app().await;

        let (status, body) =
            call(&app, Method::POST, "/api/coldkeys", Some(json!({"coldkey": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_failed");
        assert!(body["error"]["timestamp"].is_string());

        let (_, body) =
            call(&app, Method::POST, "/api/coldkeys", Some(json!({"coldkey": "5New"}))).await;
        assert_eq!(body["added"], true);
        assert_eq!(body["coldkeys"], json!(["5Cold", "5New"]));

        let (status, body) = call(&app, Method::DELETE, "/api/coldkeys/5Cold", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coldkeys"], json!(["5New"]));
    }

    #[tokio::test]
    async fn test_subnet_validation_and_page() {
        let app = app().await;

        let (status, body) =
            call(&app, Method::POST, "/api/subnet", Some(json!({"subnet": " "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please enter a valid subnet.");

        let (status, body) = call(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("5Hot"));
        assert!(html.contains("<svg"));
    }
}
