use thiserror::Error;

use crate::modules::projects::core::ports::StoreError;
use crate::modules::projects::core::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("no {entity} `{key}` found")]
    NotFound { entity: &'static str, key: String },

    #[error("there are no open charges")]
    NoOpenCharge,

    #[error("{entity} `{key}` is still referenced")]
    ProtectedReferenceExists { entity: &'static str, key: String },

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

impl From<StoreError> for ApplicationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Validation(errors) => ApplicationError::Validation(errors),
            StoreError::NotFound { entity, key } => ApplicationError::NotFound { entity, key },
            StoreError::ProtectedReference { entity, key } => {
                ApplicationError::ProtectedReferenceExists { entity, key }
            }
            StoreError::ConstraintViolation(message) | StoreError::Backend(message) => {
                ApplicationError::PersistenceFailure(message)
            }
        }
    }
}

#[cfg(test)]
mod application_error_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StoreError::Validation(ValidationErrors::new()), "Validation")]
    #[case(StoreError::NotFound { entity: "project", key: "x".into() }, "NotFound")]
    #[case(StoreError::ProtectedReference { entity: "project", key: "x".into() }, "ProtectedReferenceExists")]
    #[case(StoreError::ConstraintViolation("check".into()), "PersistenceFailure")]
    #[case(StoreError::Backend("offline".into()), "PersistenceFailure")]
    fn it_should_map_store_errors(#[case] error: StoreError, #[case] expected: &str) {
        let mapped = ApplicationError::from(error);
        assert!(format!("{mapped:?}").starts_with(expected));
    }
}
