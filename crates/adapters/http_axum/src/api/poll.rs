//! Poll trigger endpoint.

use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// `POST /api/poll`
///
/// Forces the poll cycle engine to run a tick out of schedule.
pub async fn trigger(State(state): State<AppState>) -> StatusCode {
    tracing::debug!("poll tick requested over http");
    state.poll_trigger.notify_one();
    StatusCode::ACCEPTED
}
