use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::modules::projects::core::project::ProjectId;
use crate::shell::state::AppState;
use crate::shell::timezone::RequestTimezone;

#[derive(Deserialize)]
pub struct MonthlySummaryParams {
    /// Any day of the month to summarize. Defaults to today.
    pub date: Option<NaiveDate>,
    /// Comma-separated project ids. Absent covers every project.
    pub project: Option<String>,
}

impl MonthlySummaryParams {
    fn project_ids(&self) -> Result<Vec<ProjectId>, uuid::Error> {
        self.project
            .iter()
            .flat_map(|ids| ids.split(','))
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::parse::<ProjectId>)
            .collect()
    }
}

pub async fn handle(
    State(state): State<AppState>,
    timezone: RequestTimezone,
    Query(params): Query<MonthlySummaryParams>,
) -> impl IntoResponse {
    let Ok(project_ids) = params.project_ids() else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let timezone = timezone.timezone;
    let reference = match params.date {
        Some(date) => timezone.make_aware(date, NaiveTime::MIN),
        None => Utc::now(),
    };

    match state
        .reports
        .monthly_summary(reference, timezone, &project_ids)
        .await
    {
        Ok(summary) => Json(summary).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod monthly_summary_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use chrono::{TimeDelta, TimeZone, Utc};
    use http_body_util::BodyExt;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::modules::projects::adapters::outbound::in_memory::InMemoryProjectTimeStore;
    use crate::modules::projects::core::charge::ChargeDraft;
    use crate::modules::projects::core::ports::{ChargeRepository, ProjectRepository};
    use crate::modules::projects::core::project::{Project, ProjectDraft};
    use crate::shared::core::primitives::Timezone;
    use crate::shell::state::AppState;

    use super::handle;

    async fn seeded() -> (Arc<InMemoryProjectTimeStore>, Project, Project) {
        let store = Arc::new(InMemoryProjectTimeStore::new());
        let none = BTreeSet::new();
        let alpha = store.save_project(ProjectDraft::new("Alpha"), &none).await.unwrap();
        let beta = store.save_project(ProjectDraft::new("Beta"), &none).await.unwrap();
        let start_time = Utc.with_ymd_and_hms(2019, 3, 4, 9, 0, 0).unwrap();
        store
            .bulk_insert_charges(&[
                ChargeDraft::new(alpha.id, start_time)
                    .end_time(Some(start_time + TimeDelta::hours(3)))
                    .into_charge(),
                ChargeDraft::new(beta.id, start_time)
                    .end_time(Some(start_time + TimeDelta::hours(1)))
                    .into_charge(),
            ])
            .await
            .unwrap();
        (store, alpha, beta)
    }

    fn app(store: Arc<InMemoryProjectTimeStore>) -> Router {
        Router::new()
            .route("/reports/monthly-summary", get(handle))
            .with_state(AppState::new(store, Timezone::utc()))
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn it_should_summarize_every_project_for_the_given_month() {
        let (store, _, _) = seeded().await;

        let (status, json) = fetch(app(store), "/reports/monthly-summary?date=2019-03-31").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
        assert_eq!(json["month_start"], "2019-03-01T00:00:00+00:00");
        assert_eq!(json["chart"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn it_should_restrict_the_summary_to_the_given_projects() {
        let (store, alpha, _) = seeded().await;

        let uri = format!("/reports/monthly-summary?date=2019-03-01&project={}", alpha.id);
        let (status, json) = fetch(app(store), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rows"].as_array().unwrap().len(), 1);
        assert_eq!(json["rows"][0]["project_name"], "Alpha");
        assert_eq!(json["rows"][0]["value"], 3.0);
    }

    #[tokio::test]
    async fn it_should_be_empty_for_a_month_without_charges() {
        let (store, alpha, beta) = seeded().await;

        let uri = format!(
            "/reports/monthly-summary?date=2019-04-01&project={},{}",
            alpha.id, beta.id
        );
        let (status, json) = fetch(app(store), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["rows"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_should_return_400_on_a_malformed_project_id() {
        let (store, _, _) = seeded().await;

        let (status, _) = fetch(app(store), "/reports/monthly-summary?project=nope").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
