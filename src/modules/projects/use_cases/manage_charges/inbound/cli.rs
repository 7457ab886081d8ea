use crate::modules::projects::core::charge::ChargeId;
use crate::modules::projects::use_cases::errors::ApplicationError;
use crate::modules::projects::use_cases::manage_charges::command::{
    CloseCharge, CommitCharge, CreateCharge, DeleteCharge,
};
use crate::modules::projects::use_cases::manage_projects::command::ProjectRef;
use crate::shared::core::primitives::Timezone;
use crate::shell::cli::{CommandError, CommitArgs, MkchargeArgs};
use crate::shell::state::AppState;

/// Dates and times are read in `timezone` and default to its current time.
pub async fn mkcharge(
    state: &AppState,
    args: MkchargeArgs,
    timezone: Timezone,
) -> Result<String, CommandError> {
    let now = timezone.now();
    let date = args.date.unwrap_or_else(|| now.date_naive());
    let start = args.start.unwrap_or_else(|| now.time());

    let command = CreateCharge {
        project: ProjectRef::Name(args.name),
        start_time: timezone.make_aware(date, start),
        end_time: args.end.map(|end| timezone.make_aware(date, end)),
        closed: args.close,
    };
    state
        .charges
        .create(command)
        .await
        .map_err(|e| CommandError::from_application(e, "create", "charge"))?;

    Ok("Charge was successfully created.".into())
}

/// The end time lands on the charge's own start date, as `timezone` reads it.
pub async fn commit(
    state: &AppState,
    args: CommitArgs,
    timezone: Timezone,
) -> Result<String, CommandError> {
    let command = CommitCharge {
        charge: args.id,
        end: args.end.unwrap_or_else(|| timezone.now().time()),
        close: args.close,
        timezone,
    };
    state.charges.commit(command).await.map_err(|e| match e {
        ApplicationError::PersistenceFailure(_) => {
            CommandError("Failed to update charge end time.".into())
        }
        e => CommandError::from_application(e, "end", "charge"),
    })?;

    Ok("Charge end time was successfully updated.".into())
}

pub async fn close(state: &AppState, id: Option<ChargeId>) -> Result<String, CommandError> {
    state
        .charges
        .close(CloseCharge { charge: id })
        .await
        .map_err(|e| match e {
            ApplicationError::NoOpenCharge => {
                CommandError("There are no opened charges to close.".into())
            }
            e => CommandError::from_application(e, "close", "charge"),
        })?;

    Ok("Charge was successfully closed.".into())
}

pub async fn rmcharge(state: &AppState, id: Option<ChargeId>) -> Result<String, CommandError> {
    state
        .charges
        .delete(DeleteCharge { charge: id })
        .await
        .map_err(|e| match e {
            ApplicationError::NoOpenCharge => {
                CommandError("There are no opened charges to delete.".into())
            }
            e => CommandError::from_application(e, "delete", "charge"),
        })?;

    Ok("Charge was successfully deleted.".into())
}
