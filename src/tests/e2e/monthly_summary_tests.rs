use chrono::{Datelike, Months, NaiveDate, NaiveTime, TimeDelta};
use rstest::rstest;
use std::f64::consts::PI;

use crate::modules::projects::use_cases::manage_projects::command::CreateProject;
use crate::shared::core::primitives::Timezone;
use crate::shell::state::AppState;
use crate::tests::fixtures::commands::create_charge::CreateChargeBuilder;
use crate::tests::fixtures::stores::Backend;

#[rstest]
#[case(Backend::InMemory, "UTC")]
#[case(Backend::Sqlite, "UTC")]
#[case(Backend::InMemory, "-05:00")]
#[case(Backend::Sqlite, "+09:30")]
#[case(Backend::InMemory, "America/New_York")]
#[case(Backend::Sqlite, "Australia/Sydney")]
#[tokio::test]
async fn summarizes_only_the_current_month(#[case] backend: Backend, #[case] timezone: &str) {
    let timezone: Timezone = timezone.parse().unwrap();
    let state = AppState::new(backend.store().await, timezone);
    let project = state.projects.create(CreateProject::named("Test")).await.unwrap();
    let this_month = NaiveDate::from_ymd_opt(2019, 3, 1).unwrap();
    let at_nine = |date: NaiveDate| timezone.make_aware(date, NaiveTime::from_hms_opt(9, 0, 0).unwrap());

    let charges = [
        (this_month, TimeDelta::hours(3)),
        (this_month.with_day(15).unwrap(), TimeDelta::hours(5)),
        (this_month - Months::new(1), TimeDelta::hours(1)),
        (this_month + Months::new(1), TimeDelta::hours(1)),
    ];
    for (date, duration) in charges {
        let command = CreateChargeBuilder::new()
            .start_time(at_nine(date))
            .lasting(duration)
            .build();
        state.charges.create(command).await.unwrap();
    }
    // Open charges count for nothing.
    state
        .charges
        .create(CreateChargeBuilder::new().start_time(at_nine(this_month.with_day(20).unwrap())).build())
        .await
        .unwrap();

    let summary = state
        .reports
        .monthly_summary(at_nine(this_month.with_day(10).unwrap()), timezone, &[])
        .await
        .unwrap();

    assert_eq!(summary.rows.len(), 1);
    assert_eq!(summary.rows[0].project_id, project.id);
    assert_eq!(summary.rows[0].value, 8.0);
    assert!((summary.chart[0].angle - 2.0 * PI).abs() < 1e-9);
}
