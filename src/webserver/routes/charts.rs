use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    views::ChartOptions,
    webserver::{state::AppState, utils::success_response},
};

#[derive(Debug, Default, Deserialize)]
pub struct ChartsQuery {
    /// Comma separated allow-list of series keys
    pub keys: Option<String>,
}

impl ChartsQuery {
    pub fn key_list(&self) -> Vec<String> {
        self.keys
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/charts", get(get_charts))
}

/// GET /api/charts?keys=a,b
async fn get_charts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartsQuery>,
) -> Response {
    let options = ChartOptions::from_config(&state.history).with_keys(query.key_list());
    success_response(state.controller.chart_view(&options))
}
