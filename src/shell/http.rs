use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    extract::{FromRef, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, patch, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::modules::projects::use_cases::dashboard::inbound::http as dashboard_http;
use crate::modules::projects::use_cases::errors::ApplicationError;
use crate::modules::projects::use_cases::list_records::inbound::http as list_http;
use crate::modules::projects::use_cases::manage_charges::inbound::http as charges_http;
use crate::modules::projects::use_cases::manage_projects::inbound::http as projects_http;
use crate::modules::projects::use_cases::monthly_summary::inbound::http as summary_http;
use crate::shell::graphql::{AppSchema, schema};
use crate::shell::state::AppState;
use crate::shell::timezone::{RequestTimezone, set_timezone};

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        match self {
            ApplicationError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": errors })),
            )
                .into_response(),
            ApplicationError::NotFound { .. } | ApplicationError::NoOpenCharge => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": self.to_string() }))).into_response()
            }
            ApplicationError::ProtectedReferenceExists { .. } => {
                (StatusCode::CONFLICT, Json(json!({ "error": self.to_string() }))).into_response()
            }
            ApplicationError::PersistenceFailure(ref message) => {
                tracing::error!(error = %message, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    let schema = schema(state.clone());

    Router::new()
        .route("/dashboard", get(dashboard_http::handle))
        .route("/set-timezone", post(set_timezone))
        .route(
            "/projects",
            get(list_http::list_projects).post(projects_http::create),
        )
        .route(
            "/projects/{id}",
            patch(projects_http::update).delete(projects_http::delete),
        )
        .route(
            "/charges",
            get(list_http::list_charges).post(charges_http::create),
        )
        .route(
            "/charges/{id}",
            patch(charges_http::update).delete(charges_http::delete),
        )
        .route("/charges/{id}/close", post(charges_http::close))
        .route("/reports/monthly-summary", get(summary_http::handle))
        .route("/gql", get(graphiql).post(graphql_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(HttpState { app: state, schema })
}

/// Router state: the application handlers plus the schema built over them.
#[derive(Clone)]
pub struct HttpState {
    pub app: AppState,
    pub schema: AppSchema,
}

impl FromRef<HttpState> for AppState {
    fn from_ref(state: &HttpState) -> Self {
        state.app.clone()
    }
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/gql").finish())
}

async fn graphql_handler(
    State(state): State<HttpState>,
    timezone: RequestTimezone,
    request: GraphQLRequest,
) -> GraphQLResponse {
    state
        .schema
        .execute(request.into_inner().data(timezone))
        .await
        .into()
}
