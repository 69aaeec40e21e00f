use axum::{
    extract::{Path, State},
    response::{Json, Response},
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::webserver::{
    state::AppState,
    utils::{monitor_error_response, success_response},
};

#[derive(Debug, Deserialize)]
pub struct ColdkeyRequest {
    #[serde(default)]
    pub coldkey: String,
}

#[derive(Debug, Serialize)]
pub struct ColdkeysResponse {
    pub coldkeys: Vec<String>,
    /// False when the key was already registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<bool>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/coldkeys", get(list_coldkeys).post(add_coldkey))
        .route("/coldkeys/:key", delete(remove_coldkey))
}

/// GET /api/coldkeys
async fn list_coldkeys(State(state): State<Arc<AppState>>) -> Response {
    success_response(ColdkeysResponse {
        coldkeys: state.controller.coldkeys(),
        added: None,
    })
}

/// POST /api/coldkeys
async fn add_coldkey(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ColdkeyRequest>,
) -> Response {
    match state.controller.add_coldkey(&request.coldkey).await {
        Ok(added) => success_response(ColdkeysResponse {
            coldkeys: state.controller.coldkeys(),
            added: Some(added),
        }),
        Err(e) => monitor_error_response(&e, state.controller.error_banner()),
    }
}

/// DELETE /api/coldkeys/:key
async fn remove_coldkey(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Response {
    match state.controller.remove_coldkey(&key).await {
        Ok(()) => success_response(ColdkeysResponse {
            coldkeys: state.controller.coldkeys(),
            added: None,
        }),
        Err(e) => monitor_error_response(&e, state.controller.error_banner()),
    }
}
