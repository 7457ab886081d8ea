use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Serialize;

use crate::modules::projects::core::filters::ProjectFilter;
use crate::modules::projects::use_cases::list_records::handler::{ChargeQuery, ProjectQuery};
use crate::modules::projects::use_cases::list_records::projection::ChargeView;
use crate::shared::core::primitives::{format_duration, hours};
use crate::shell::state::AppState;
use crate::shell::timezone::RequestTimezone;

#[derive(Serialize)]
pub struct ChargeListResponse {
    pub charges: Vec<ChargeView>,
    pub total_time_charged: String,
    pub total_hours: f64,
}

pub async fn list_projects(
    State(state): State<AppState>,
    timezone: RequestTimezone,
    Query(params): Query<ProjectQuery>,
) -> impl IntoResponse {
    let filter = ProjectFilter::from(params);
    match state.records.projects(&filter, timezone.timezone).await {
        Ok(projects) => Json(projects).into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn list_charges(
    State(state): State<AppState>,
    timezone: RequestTimezone,
    Query(params): Query<ChargeQuery>,
) -> impl IntoResponse {
    let filter = params.into_filter(timezone.timezone);
    let charges = match state.records.charges(&filter, timezone.timezone).await {
        Ok(charges) => charges,
        Err(error) => return error.into_response(),
    };
    match state.records.total_time_charged(&filter).await {
        Ok(total) => Json(ChargeListResponse {
            charges,
            total_time_charged: format_duration(total),
            total_hours: hours(total),
        })
        .into_response(),
        Err(error) => error.into_response(),
    }
}
