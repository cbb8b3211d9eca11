use crate::interface_adapters::state::AppState;

use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use std::sync::Arc;

#[derive(Debug, serde::Serialize)]
struct StatusResponse {
    // Index of the last completed world tick.
    tick: u64,
    // Open WebSocket sessions waiting on tick notifications.
    sessions: usize,
}

pub async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tick = *state.tick_tx.borrow();
    Json(StatusResponse {
        tick,
        sessions: state.tick_tx.receiver_count(),
    })
}
