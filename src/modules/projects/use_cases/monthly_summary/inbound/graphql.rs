use async_graphql::{Context, ErrorExtensions, ID, Object, Result as GqlResult, SimpleObject};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::modules::projects::core::project::ProjectId;
use crate::modules::projects::use_cases::monthly_summary::handler::MonthlySummary;
use crate::shell::graphql::{parse_id, request_timezone};
use crate::shell::state::AppState;

#[derive(SimpleObject)]
pub struct SummaryRowObject {
    pub project_id: ID,
    pub project_name: String,
    /// Hours charged over the month.
    pub value: f64,
    /// Share of the pie chart, in radians.
    pub angle: f64,
    pub color: Option<String>,
}

#[derive(SimpleObject)]
pub struct MonthlySummaryObject {
    pub month_start: DateTime<FixedOffset>,
    pub month_end: DateTime<FixedOffset>,
    pub rows: Vec<SummaryRowObject>,
}

impl From<MonthlySummary> for MonthlySummaryObject {
    fn from(summary: MonthlySummary) -> Self {
        let rows = summary
            .rows
            .into_iter()
            .zip(summary.chart)
            .map(|(row, slice)| SummaryRowObject {
                project_id: ID(row.project_id.to_string()),
                project_name: row.project_name,
                value: row.value,
                angle: slice.angle,
                color: slice.color.map(str::to_string),
            })
            .collect();
        Self {
            month_start: summary.month_start,
            month_end: summary.month_end,
            rows,
        }
    }
}

#[derive(Default)]
pub struct MonthlySummaryQuery;

#[Object]
impl MonthlySummaryQuery {
    /// Hours per project over the month containing `date`, today when absent.
    async fn monthly_summary(
        &self,
        context: &Context<'_>,
        date: Option<NaiveDate>,
        projects: Option<Vec<ID>>,
    ) -> GqlResult<MonthlySummaryObject> {
        let state = context.data_unchecked::<AppState>();
        let timezone = request_timezone(context).timezone;

        let project_ids = projects
            .unwrap_or_default()
            .iter()
            .map(parse_id)
            .collect::<GqlResult<Vec<ProjectId>>>()?;
        let reference = match date {
            Some(date) => timezone.make_aware(date, NaiveTime::MIN),
            None => Utc::now(),
        };

        let summary = state
            .reports
            .monthly_summary(reference, timezone, &project_ids)
            .await
            .map_err(|e| e.extend())?;

        Ok(summary.into())
    }
}
