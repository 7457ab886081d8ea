use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;

use crate::shell::state::AppState;
use crate::shell::timezone::RequestTimezone;

pub async fn handle(State(state): State<AppState>, timezone: RequestTimezone) -> impl IntoResponse {
    match state
        .dashboard
        .dashboard(Utc::now(), timezone.timezone, timezone.chosen)
        .await
    {
        Ok(dashboard) => Json(dashboard).into_response(),
        Err(error) => error.into_response(),
    }
}
