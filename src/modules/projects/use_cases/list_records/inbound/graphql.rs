use async_graphql::{Context, ErrorExtensions, ID, Object, Result as GqlResult, SimpleObject};
use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::modules::projects::use_cases::list_records::handler::{ChargeQuery, ProjectQuery};
use crate::modules::projects::use_cases::list_records::projection::{ChargeView, ProjectView};
use crate::shell::graphql::{parse_id, request_timezone};
use crate::shell::state::AppState;

#[derive(SimpleObject)]
pub struct ProjectObject {
    pub id: ID,
    pub name: String,
    pub active: bool,
    pub latest_charge: Option<DateTime<FixedOffset>>,
    pub display: String,
}

impl From<ProjectView> for ProjectObject {
    fn from(view: ProjectView) -> Self {
        Self {
            id: ID(view.id.to_string()),
            name: view.name,
            active: view.active,
            latest_charge: view.latest_charge,
            display: view.display,
        }
    }
}

#[derive(SimpleObject)]
pub struct ChargeObject {
    pub id: ID,
    pub project_id: ID,
    pub project_name: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: Option<DateTime<FixedOffset>>,
    pub time_charged: String,
    pub hours_charged: f64,
    pub closed: bool,
    pub display: String,
}

impl From<ChargeView> for ChargeObject {
    fn from(view: ChargeView) -> Self {
        Self {
            id: ID(view.id.to_string()),
            project_id: ID(view.project_id.to_string()),
            project_name: view.project_name,
            start_time: view.start_time,
            end_time: view.end_time,
            time_charged: view.time_charged,
            hours_charged: view.hours_charged,
            closed: view.closed,
            display: view.display,
        }
    }
}

#[derive(Default)]
pub struct ListRecordsQuery;

#[Object]
impl ListRecordsQuery {
    /// Projects ordered by name, each with the end of its latest charge.
    async fn projects(
        &self,
        context: &Context<'_>,
        name: Option<String>,
        active: Option<bool>,
    ) -> GqlResult<Vec<ProjectObject>> {
        let state = context.data_unchecked::<AppState>();
        let timezone = request_timezone(context).timezone;

        let projects = state
            .records
            .projects(&ProjectQuery { name, active }.into(), timezone)
            .await
            .map_err(|e| e.extend())?;

        Ok(projects.into_iter().map(ProjectObject::from).collect())
    }

    /// Charges ordered by start time. Dates are read in the request timezone.
    #[allow(clippy::too_many_arguments)]
    async fn charges(
        &self,
        context: &Context<'_>,
        project: Option<ID>,
        project_name: Option<String>,
        project_name_contains: Option<String>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        closed: Option<bool>,
    ) -> GqlResult<Vec<ChargeObject>> {
        let state = context.data_unchecked::<AppState>();
        let timezone = request_timezone(context).timezone;

        let query = ChargeQuery {
            project: project.as_ref().map(parse_id).transpose()?,
            project_name,
            project_name_contains,
            start_date,
            end_date,
            closed,
        };
        let charges = state
            .records
            .charges(&query.into_filter(timezone), timezone)
            .await
            .map_err(|e| e.extend())?;

        Ok(charges.into_iter().map(ChargeObject::from).collect())
    }
}
