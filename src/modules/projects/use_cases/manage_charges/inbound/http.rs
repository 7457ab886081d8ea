use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::modules::projects::core::charge::ChargeId;
use crate::modules::projects::core::project::ProjectId;
use crate::modules::projects::use_cases::manage_charges::command::{
    CloseCharge, CreateCharge, DeleteCharge, UpdateCharge,
};
use crate::modules::projects::use_cases::manage_projects::command::ProjectRef;
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct CreateChargeBody {
    pub project: ProjectId,
    /// Defaults to now.
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Deserialize)]
pub struct UpdateChargeBody {
    pub project: Option<ProjectId>,
    pub start_time: Option<DateTime<Utc>>,
    /// Absent leaves the end time alone, `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub end_time: Option<Option<DateTime<Utc>>>,
    pub closed: Option<bool>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateChargeBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };

    let command = CreateCharge {
        project: ProjectRef::Id(body.project),
        start_time: body.start_time.unwrap_or_else(Utc::now),
        end_time: body.end_time,
        closed: body.closed,
    };
    match state.charges.create(command).await {
        Ok(charge) => (StatusCode::CREATED, Json(charge)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ChargeId>,
    body: Result<Json<UpdateChargeBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };

    let command = UpdateCharge {
        project: body.project,
        start_time: body.start_time,
        end_time: body.end_time,
        closed: body.closed,
    };
    match state.charges.update(id, command).await {
        Ok(charge) => Json(charge).into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn close(State(state): State<AppState>, Path(id): Path<ChargeId>) -> impl IntoResponse {
    match state.charges.close(CloseCharge { charge: Some(id) }).await {
        Ok(charge) => Json(charge).into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<ChargeId>) -> impl IntoResponse {
    match state.charges.delete(DeleteCharge { charge: Some(id) }).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}
