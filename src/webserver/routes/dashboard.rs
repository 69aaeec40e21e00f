use axum::{
    extract::State,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    logger::{self, LogTag},
    webserver::{
        state::AppState,
        utils::{monitor_error_response, success_response},
    },
};

#[derive(Debug, Deserialize)]
pub struct SubnetRequest {
    #[serde(default)]
    pub subnet: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/refresh", post(refresh))
        .route("/subnet", post(change_subnet))
}

/// GET /api/dashboard
async fn get_dashboard(State(state): State<Arc<AppState>>) -> Response {
    success_response(state.controller.summary())
}

/// POST /api/refresh
async fn refresh(State(state): State<Arc<AppState>>) -> Response {
    logger::debug(LogTag::Webserver, "Manual refresh requested");
    success_response(state.controller.refresh().await)
}

/// POST /api/subnet
async fn change_subnet(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubnetRequest>,
) -> Response {
    match state.controller.change_subnet(&request.subnet).await {
        Ok(_) => success_response(state.controller.summary()),
        Err(e) => monitor_error_response(&e, state.controller.error_banner()),
    }
}
