use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::modules::projects::core::filters::{ChargeFilter, ProjectFilter};
use crate::modules::projects::core::ports::ProjectTimeStore;
use crate::modules::projects::use_cases::errors::ApplicationError;
use crate::modules::projects::use_cases::list_records::handler::RecordsHandler;
use crate::modules::projects::use_cases::list_records::projection::{ChargeView, ProjectView};
use crate::modules::projects::use_cases::monthly_summary::handler::{
    MonthlySummary, ReportsHandler,
};
use crate::shared::core::primitives::Timezone;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Ordered by name.
    pub active_projects: Vec<ProjectView>,
    /// Charges not yet closed, ordered by start time.
    pub open_charges: Vec<ChargeView>,
    pub monthly_summary: MonthlySummary,
    pub timezone: Timezone,
    /// False until the reader has picked a timezone of their own.
    pub timezone_chosen: bool,
}

pub struct DashboardHandler<TStore>
where
    TStore: ProjectTimeStore + ?Sized + 'static,
{
    records: RecordsHandler<TStore>,
    reports: ReportsHandler<TStore>,
}

impl<TStore> DashboardHandler<TStore>
where
    TStore: ProjectTimeStore + ?Sized + 'static,
{
    pub fn new(store: Arc<TStore>) -> Self {
        Self {
            records: RecordsHandler::new(store.clone()),
            reports: ReportsHandler::new(store),
        }
    }

    pub async fn dashboard(
        &self,
        now: DateTime<Utc>,
        timezone: Timezone,
        timezone_chosen: bool,
    ) -> Result<Dashboard, ApplicationError> {
        Ok(Dashboard {
            active_projects: self
                .records
                .projects(&ProjectFilter::active_only(), timezone)
                .await?,
            open_charges: self
                .records
                .charges(&ChargeFilter::open_only(), timezone)
                .await?,
            monthly_summary: self.reports.monthly_summary(now, timezone, &[]).await?,
            timezone,
            timezone_chosen,
        })
    }
}
