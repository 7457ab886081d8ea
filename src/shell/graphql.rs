use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, FieldError, ID, MergedObject, Schema,
};
use std::str::FromStr;

use crate::modules::projects::use_cases::errors::ApplicationError;
use crate::modules::projects::use_cases::list_records::inbound::graphql::ListRecordsQuery;
use crate::modules::projects::use_cases::manage_charges::inbound::graphql::ManageChargesMutation;
use crate::modules::projects::use_cases::manage_projects::inbound::graphql::ManageProjectsMutation;
use crate::modules::projects::use_cases::monthly_summary::inbound::graphql::MonthlySummaryQuery;
pub use crate::shell::state::AppState;
use crate::shell::timezone::RequestTimezone;

#[derive(MergedObject, Default)]
pub struct QueryRoot(ListRecordsQuery, MonthlySummaryQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(ManageProjectsMutation, ManageChargesMutation);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn schema(state: AppState) -> AppSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(state)
        .finish()
}

/// The timezone the HTTP layer attached to the request, else the default.
pub fn request_timezone(context: &Context<'_>) -> RequestTimezone {
    context
        .data_opt::<RequestTimezone>()
        .copied()
        .unwrap_or_else(|| RequestTimezone {
            timezone: context.data_unchecked::<AppState>().default_timezone,
            chosen: false,
        })
}

pub fn parse_id<T: FromStr>(id: &ID) -> Result<T, FieldError> {
    id.parse()
        .map_err(|_| FieldError::new(format!("`{}` is not a valid id", id.as_str())))
}

impl ErrorExtensions for ApplicationError {
    fn extend(&self) -> FieldError {
        FieldError::new(self.to_string()).extend_with(|_, extensions| match self {
            ApplicationError::Validation(errors) => {
                extensions.set("code", "VALIDATION");
                if let Ok(errors) = async_graphql::to_value(errors) {
                    extensions.set("errors", errors);
                }
            }
            ApplicationError::NotFound { .. } | ApplicationError::NoOpenCharge => {
                extensions.set("code", "NOT_FOUND")
            }
            ApplicationError::ProtectedReferenceExists { .. } => {
                extensions.set("code", "PROTECTED_REFERENCE")
            }
            ApplicationError::PersistenceFailure(_) => extensions.set("code", "INTERNAL"),
        })
    }
}
