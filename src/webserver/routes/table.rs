use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    views::Column,
    webserver::{state::AppState, utils::success_response},
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/table", get(get_table))
}

/// GET /api/table?<column id>=<substring>
///
/// Unknown query keys are ignored.
async fn get_table(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let filters: Vec<(Column, String)> = params
        .into_iter()
        .filter_map(|(key, needle)| Column::from_id(&key).map(|column| (column, needle)))
        .collect();

    let table = state.controller.table_view();
    let rows = table.filter(&filters);
    success_response(table.snapshot(&rows))
}
