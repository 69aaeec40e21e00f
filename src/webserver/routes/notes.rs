use axum::{
    extract::{Path, State},
    response::{Json, Response},
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    logger::{self, LogTag},
    views::CellRefresh,
    webserver::{
        state::AppState,
        utils::{monitor_error_response, success_response},
    },
};

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub key: String,
    pub note: Option<String>,
    /// Cells to redraw; `None` when no current row uses this key
    pub refresh: Option<CellRefresh>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notes", get(list_notes))
        .route("/notes/:key", put(put_note))
}

/// GET /api/notes
async fn list_notes(State(state): State<Arc<AppState>>) -> Response {
    success_response(state.controller.notes().all())
}

/// PUT /api/notes/:key
async fn put_note(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(request): Json<NoteRequest>,
) -> Response {
    let table = state.controller.table_view();
    let row = (0..table.row_count())
        .find(|&row| table.record(row).map(|r| r.symbol_key() == key).unwrap_or(false));

    let refresh = match row {
        Some(row) => match table.commit_note(row, &request.note) {
            Ok(refresh) => Some(refresh),
            Err(e) => return monitor_error_response(&e, None),
        },
        None => {
            state.controller.notes().set(&key, &request.note);
            None
        }
    };

    logger::debug(LogTag::Webserver, &format!("Note updated for {}", key));

    success_response(NoteResponse {
        note: state.controller.notes().get(&key),
        key,
        refresh,
    })
}
