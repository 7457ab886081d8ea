use chrono::{TimeDelta, TimeZone, Utc};
use rstest::rstest;

use crate::modules::projects::core::filters::ChargeFilter;
use crate::modules::projects::core::validation::{ErrorKey, Field, ValidationError};
use crate::modules::projects::use_cases::errors::ApplicationError;
use crate::modules::projects::use_cases::manage_charges::command::{CloseCharge, UpdateCharge};
use crate::modules::projects::use_cases::manage_projects::command::{
    CreateProject, ProjectRef, UpdateProject,
};
use crate::shared::core::primitives::Timezone;
use crate::shell::state::AppState;
use crate::tests::fixtures::commands::create_charge::CreateChargeBuilder;
use crate::tests::fixtures::stores::Backend;

#[rstest]
#[case(Backend::InMemory)]
#[case(Backend::Sqlite)]
#[tokio::test]
async fn charges_time_from_open_to_closed(#[case] backend: Backend) {
    let state = AppState::new(backend.store().await, Timezone::utc());
    state.projects.create(CreateProject::named("Test")).await.unwrap();

    let charge = state
        .charges
        .create(CreateChargeBuilder::new().build())
        .await
        .unwrap();
    assert_eq!(charge.time_charged(), TimeDelta::zero());

    let end_time = Utc.with_ymd_and_hms(2019, 1, 1, 8, 30, 0).unwrap();
    let charge = state
        .charges
        .update(
            charge.id,
            UpdateCharge {
                end_time: Some(Some(end_time)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(charge.time_charged(), TimeDelta::minutes(30));

    let closed = state
        .charges
        .close(CloseCharge { charge: None })
        .await
        .unwrap();
    assert!(closed.closed);

    let Err(ApplicationError::Validation(errors)) = state
        .charges
        .update(
            charge.id,
            UpdateCharge {
                end_time: Some(Some(end_time + TimeDelta::minutes(5))),
                ..Default::default()
            },
        )
        .await
    else {
        panic!("a closed charge must stay locked");
    };
    assert!(errors.contains(ErrorKey::Entity, ValidationError::CannotModifyWhenClosed));

    let reopened = state
        .charges
        .update(
            charge.id,
            UpdateCharge {
                closed: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!reopened.closed);
    assert_eq!(reopened.end_time, Some(end_time));
}

#[rstest]
#[case(Backend::InMemory)]
#[case(Backend::Sqlite)]
#[tokio::test]
async fn totals_time_charged_across_charges(#[case] backend: Backend) {
    let state = AppState::new(backend.store().await, Timezone::utc());
    state.projects.create(CreateProject::named("Test")).await.unwrap();
    let start_time = Utc.with_ymd_and_hms(2019, 1, 1, 8, 0, 0).unwrap();

    for (offset, duration) in [
        TimeDelta::seconds(30),
        TimeDelta::minutes(15),
        TimeDelta::hours(1),
    ]
    .into_iter()
    .enumerate()
    {
        let command = CreateChargeBuilder::new()
            .start_time(start_time + TimeDelta::hours(2 * offset as i64))
            .lasting(duration)
            .build();
        state.charges.create(command).await.unwrap();
    }

    let total = state
        .records
        .total_time_charged(&ChargeFilter::default())
        .await
        .unwrap();
    assert_eq!(total, TimeDelta::seconds(75 * 60 + 30));
}

#[rstest]
#[case(Backend::InMemory)]
#[case(Backend::Sqlite)]
#[tokio::test]
async fn guards_inactive_projects_and_their_charges(#[case] backend: Backend) {
    let state = AppState::new(backend.store().await, Timezone::utc());
    state.projects.create(CreateProject::named("Test")).await.unwrap();
    state
        .charges
        .create(CreateChargeBuilder::new().build())
        .await
        .unwrap();
    state
        .projects
        .update(UpdateProject::set_active(ProjectRef::Name("Test".into()), false))
        .await
        .unwrap();

    let Err(ApplicationError::Validation(errors)) = state
        .charges
        .create(CreateChargeBuilder::new().build())
        .await
    else {
        panic!("an inactive project takes no charges");
    };
    assert!(errors.contains(ErrorKey::Field(Field::Project), ValidationError::ProjectMustBeActive));

    let deleted = state.projects.delete(ProjectRef::Name("Test".into())).await;
    assert!(matches!(
        deleted,
        Err(ApplicationError::ProtectedReferenceExists { entity: "project", .. })
    ));
}
