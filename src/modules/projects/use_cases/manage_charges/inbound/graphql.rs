use async_graphql::{Context, ErrorExtensions, ID, Object, Result as GqlResult};
use chrono::{DateTime, Utc};

use crate::modules::projects::use_cases::manage_charges::command::{
    CloseCharge, CreateCharge, DeleteCharge,
};
use crate::modules::projects::use_cases::manage_projects::command::ProjectRef;
use crate::shell::graphql::parse_id;
use crate::shell::state::AppState;

#[derive(Default)]
pub struct ManageChargesMutation;

#[Object]
impl ManageChargesMutation {
    /// `startTime` defaults to now.
    async fn create_charge(
        &self,
        context: &Context<'_>,
        project: ID,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
        closed: Option<bool>,
    ) -> GqlResult<ID> {
        let state = context.data_unchecked::<AppState>();

        let command = CreateCharge {
            project: ProjectRef::Id(parse_id(&project)?),
            start_time: start_time.unwrap_or_else(Utc::now),
            end_time,
            closed: closed.unwrap_or(false),
        };
        let charge = state
            .charges
            .create(command)
            .await
            .map_err(|e| e.extend())?;

        Ok(ID(charge.id.to_string()))
    }

    /// Closes the given charge, or the latest open one.
    async fn close_charge(&self, context: &Context<'_>, id: Option<ID>) -> GqlResult<ID> {
        let state = context.data_unchecked::<AppState>();

        let command = CloseCharge {
            charge: id.as_ref().map(parse_id).transpose()?,
        };
        let charge = state
            .charges
            .close(command)
            .await
            .map_err(|e| e.extend())?;

        Ok(ID(charge.id.to_string()))
    }

    async fn delete_charge(&self, context: &Context<'_>, id: Option<ID>) -> GqlResult<ID> {
        let state = context.data_unchecked::<AppState>();

        let command = DeleteCharge {
            charge: id.as_ref().map(parse_id).transpose()?,
        };
        let charge = state
            .charges
            .delete(command)
            .await
            .map_err(|e| e.extend())?;

        Ok(ID(charge.id.to_string()))
    }
}
