use chrono::{NaiveDate, TimeDelta};
use serde::Deserialize;
use std::sync::Arc;

use crate::modules::projects::core::filters::{ChargeFilter, ProjectFilter};
use crate::modules::projects::core::ports::ProjectTimeStore;
use crate::modules::projects::core::project::ProjectId;
use crate::modules::projects::use_cases::errors::ApplicationError;
use crate::modules::projects::use_cases::list_records::projection::{ChargeView, ProjectView};
use crate::shared::core::primitives::Timezone;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectQuery {
    pub name: Option<String>,
    pub active: Option<bool>,
}

impl From<ProjectQuery> for ProjectFilter {
    fn from(query: ProjectQuery) -> Self {
        ProjectFilter {
            name_contains: query.name,
            active: query.active,
        }
    }
}

/// Charge listing criteria as readers state them: dates are calendar days
/// in the reader's timezone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChargeQuery {
    pub project: Option<ProjectId>,
    pub project_name: Option<String>,
    pub project_name_contains: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub closed: Option<bool>,
}

impl ChargeQuery {
    pub fn into_filter(self, timezone: Timezone) -> ChargeFilter {
        ChargeFilter {
            project_id: self.project,
            project_name: self.project_name,
            project_name_contains: self.project_name_contains,
            started_within: self.start_date.map(|date| timezone.day_range(date)),
            ended_within: self.end_date.map(|date| timezone.day_range(date)),
            closed: self.closed,
        }
    }
}

pub struct RecordsHandler<TStore>
where
    TStore: ProjectTimeStore + ?Sized + 'static,
{
    store: Arc<TStore>,
}

impl<TStore> RecordsHandler<TStore>
where
    TStore: ProjectTimeStore + ?Sized + 'static,
{
    pub fn new(store: Arc<TStore>) -> Self {
        Self { store }
    }

    pub async fn projects(
        &self,
        filter: &ProjectFilter,
        timezone: Timezone,
    ) -> Result<Vec<ProjectView>, ApplicationError> {
        let records = self.store.list_projects(filter).await?;
        Ok(records
            .into_iter()
            .map(|record| ProjectView::new(record, timezone))
            .collect())
    }

    pub async fn charges(
        &self,
        filter: &ChargeFilter,
        timezone: Timezone,
    ) -> Result<Vec<ChargeView>, ApplicationError> {
        let records = self.store.list_charges(filter).await?;
        Ok(records
            .into_iter()
            .map(|record| ChargeView::new(record, timezone))
            .collect())
    }

    pub async fn total_time_charged(&self, filter: &ChargeFilter) -> Result<TimeDelta, ApplicationError> {
        Ok(self.store.aggregate_time_charged(filter).await?)
    }
}
