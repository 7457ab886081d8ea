use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::modules::projects::core::project::ProjectId;
use crate::modules::projects::use_cases::manage_projects::command::{
    CreateProject, ProjectRef, UpdateProject,
};
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct UpdateProjectBody {
    pub name: Option<String>,
    pub active: Option<bool>,
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateProject>, JsonRejection>,
) -> impl IntoResponse {
    let Json(command) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };

    match state.projects.create(command).await {
        Ok(project) => (StatusCode::CREATED, Json(project)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    body: Result<Json<UpdateProjectBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };

    let command = UpdateProject {
        project: ProjectRef::Id(id),
        name: body.name,
        active: body.active,
    };
    match state.projects.update(command).await {
        Ok(project) => Json(project).into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<ProjectId>) -> impl IntoResponse {
    match state.projects.delete(ProjectRef::Id(id)).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}
