use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::modules::projects::core::ports::ProjectTimeStore;
use crate::modules::projects::core::project::ProjectId;
use crate::modules::projects::core::reporting::{ChartSlice, MonthlySummaryRow, summary_chart};
use crate::modules::projects::use_cases::errors::ApplicationError;
use crate::shared::core::primitives::Timezone;

/// Hours charged per project over one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month_start: DateTime<FixedOffset>,
    pub month_end: DateTime<FixedOffset>,
    pub rows: Vec<MonthlySummaryRow>,
    pub chart: Vec<ChartSlice>,
}

pub struct ReportsHandler<TStore>
where
    TStore: ProjectTimeStore + ?Sized + 'static,
{
    store: Arc<TStore>,
}

impl<TStore> ReportsHandler<TStore>
where
    TStore: ProjectTimeStore + ?Sized + 'static,
{
    pub fn new(store: Arc<TStore>) -> Self {
        Self { store }
    }

    /// Summarize the month containing `reference`, as the calendar reads in
    /// `timezone`. An empty `project_ids` covers every project.
    pub async fn monthly_summary(
        &self,
        reference: DateTime<Utc>,
        timezone: Timezone,
        project_ids: &[ProjectId],
    ) -> Result<MonthlySummary, ApplicationError> {
        let month = timezone.month_range(reference);
        let rows: Vec<MonthlySummaryRow> = self
            .store
            .monthly_totals(month, project_ids)
            .await?
            .into_iter()
            .map(MonthlySummaryRow::from)
            .collect();
        tracing::debug!(rows = rows.len(), "monthly summary computed");

        Ok(MonthlySummary {
            month_start: timezone.localize(month.start),
            month_end: timezone.localize(month.end),
            chart: summary_chart(&rows),
            rows,
        })
    }
}

#[cfg(test)]
mod reports_handler_tests {
    use super::*;
    use crate::modules::projects::adapters::outbound::in_memory::InMemoryProjectTimeStore;
    use crate::modules::projects::core::charge::ChargeDraft;
    use crate::modules::projects::core::ports::{ChargeRepository, ProjectRepository};
    use crate::modules::projects::core::project::ProjectDraft;
    use chrono::{TimeDelta, TimeZone};
    use rstest::rstest;
    use std::collections::BTreeSet;
    use std::f64::consts::PI;

    #[rstest]
    #[tokio::test]
    async fn it_should_summarize_the_local_month() {
        let store = Arc::new(InMemoryProjectTimeStore::new());
        let project = store
            .save_project(ProjectDraft::new("Test"), &BTreeSet::new())
            .await
            .unwrap();
        // 23:00 UTC on Jan 31 is already February at +02:00.
        let start_time = Utc.with_ymd_and_hms(2019, 1, 31, 23, 0, 0).unwrap();
        store
            .bulk_insert_charges(&[ChargeDraft::new(project.id, start_time)
                .end_time(Some(start_time + TimeDelta::hours(2)))
                .into_charge()])
            .await
            .unwrap();
        let handler = ReportsHandler::new(store);
        let reference = Utc.with_ymd_and_hms(2019, 2, 14, 12, 0, 0).unwrap();

        let utc = handler
            .monthly_summary(reference, Timezone::utc(), &[])
            .await
            .unwrap();
        assert!(utc.rows.is_empty());

        let local = handler
            .monthly_summary(reference, "+02:00".parse().unwrap(), &[])
            .await
            .unwrap();
        assert_eq!(local.rows.len(), 1);
        assert_eq!(local.rows[0].value, 2.0);
        assert_eq!(local.month_start.to_rfc3339(), "2019-02-01T00:00:00+02:00");
        assert!((local.chart[0].angle - 2.0 * PI).abs() < 1e-9);
        assert_eq!(local.chart[0].color, Some("#3182bd"));
    }
}
