// Validation rules for projects and charges.
//
// Rules are pure: the store loads the facts they need (previous state, the
// referenced project, name collisions) inside its transaction and hands them
// over through a context. Violations are collected into `ValidationErrors`,
// keyed by field or by the whole entity.
//
// A field listed in `exclude` is not validated on its own. When an excluded
// field takes part in a charge invariant, the violation is reported against
// the whole entity instead, so callers that only validate part of a charge
// still see it.

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

use crate::modules::projects::core::charge::{Charge, ChargeDraft};
use crate::modules::projects::core::project::{NAME_MAX_LENGTH, Project, ProjectDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Active,
    Project,
    StartTime,
    EndTime,
    Closed,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Active => "active",
            Field::Project => "project",
            Field::StartTime => "start_time",
            Field::EndTime => "end_time",
            Field::Closed => "closed",
        }
    }
}

/// Where a violation is reported: against one field, or the entity as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKey {
    Field(Field),
    Entity,
}

impl ErrorKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKey::Field(field) => field.as_str(),
            ErrorKey::Entity => "__all__",
        }
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("This field cannot be blank.")]
    Required,

    #[error("Ensure this value has at most {max} characters (it has {actual}).")]
    ValueTooLong { max: usize, actual: usize },

    #[error("A project with this name already exists.")]
    NotUnique,

    #[error("Cannot modify when marked as inactive.")]
    CannotModifyWhenInactive,

    #[error("The project must be active.")]
    ProjectMustBeActive,

    #[error("The end time must not be before the start time.")]
    EndTimeBeforeStartTime,

    #[error("Cannot mark as closed without end time specified.")]
    CannotCloseWithoutEndTime,

    #[error("Cannot modify when closed for modification.")]
    CannotModifyWhenClosed,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::Required => "required",
            ValidationError::ValueTooLong { .. } => "max_length",
            ValidationError::NotUnique => "unique",
            ValidationError::CannotModifyWhenInactive => "cannot_modify_when_inactive",
            ValidationError::ProjectMustBeActive => "project_must_be_active",
            ValidationError::EndTimeBeforeStartTime => "end_time_must_be_on_or_after_start_time",
            ValidationError::CannotCloseWithoutEndTime => "cannot_close_without_end_time",
            ValidationError::CannotModifyWhenClosed => "cannot_modify_when_closed",
        }
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<ErrorKey, Vec<ValidationError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: ErrorKey, error: ValidationError) {
        self.errors.entry(key).or_default().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, key: ErrorKey) -> &[ValidationError] {
        self.errors.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, key: ErrorKey, error: ValidationError) -> bool {
        self.get(key).contains(&error)
    }

    /// True when `error` was reported under any key.
    pub fn has(&self, error: ValidationError) -> bool {
        self.errors.values().flatten().any(|e| *e == error)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ErrorKey, &ValidationError)> {
        self.errors
            .iter()
            .flat_map(|(key, errors)| errors.iter().map(move |error| (*key, error)))
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, error) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{key}: {error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (key, errors) in &self.errors {
            map.serialize_entry(key.as_str(), errors)?;
        }
        map.end()
    }
}

pub struct ProjectContext<'a> {
    /// Persisted state before this save, `None` for a new project.
    pub previous: Option<&'a Project>,
    /// Whether another project already uses the candidate's name.
    pub name_taken: bool,
}

pub struct ChargeContext<'a> {
    /// The project the candidate references.
    pub project: &'a Project,
    /// Persisted state before this save, `None` for a new charge.
    pub previous: Option<&'a Charge>,
}

pub fn validate_project(
    candidate: &ProjectDraft,
    context: &ProjectContext<'_>,
    exclude: &BTreeSet<Field>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if !exclude.contains(&Field::Name) {
        let length = candidate.name.chars().count();
        let key = ErrorKey::Field(Field::Name);
        if length == 0 {
            errors.add(key, ValidationError::Required);
        } else if length > NAME_MAX_LENGTH {
            errors.add(
                key,
                ValidationError::ValueTooLong {
                    max: NAME_MAX_LENGTH,
                    actual: length,
                },
            );
        }
        if context.name_taken {
            errors.add(key, ValidationError::NotUnique);
        }
    }

    if let Some(previous) = context.previous {
        if !previous.active && !candidate.active {
            errors.add(ErrorKey::Entity, ValidationError::CannotModifyWhenInactive);
        }
    }

    errors.into_result()
}

pub fn validate_charge(
    candidate: &ChargeDraft,
    context: &ChargeContext<'_>,
    exclude: &BTreeSet<Field>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let keyed_unless_excluded = |field: Field| {
        if exclude.contains(&field) {
            ErrorKey::Entity
        } else {
            ErrorKey::Field(field)
        }
    };

    if !context.project.active {
        errors.add(
            ErrorKey::Field(Field::Project),
            ValidationError::ProjectMustBeActive,
        );
    }

    if candidate
        .end_time
        .is_some_and(|end_time| end_time < candidate.start_time)
    {
        errors.add(
            keyed_unless_excluded(Field::EndTime),
            ValidationError::EndTimeBeforeStartTime,
        );
    }

    if candidate.closed && candidate.end_time.is_none() {
        errors.add(
            keyed_unless_excluded(Field::Closed),
            ValidationError::CannotCloseWithoutEndTime,
        );
    }

    if let Some(previous) = context.previous {
        if previous.closed && candidate.closed {
            errors.add(ErrorKey::Entity, ValidationError::CannotModifyWhenClosed);
        }
    }

    errors.into_result()
}

/// Entities that can be checked before they are persisted.
pub trait Validate {
    type Context<'a>;

    fn validate(
        &self,
        context: &Self::Context<'_>,
        exclude: &BTreeSet<Field>,
    ) -> Result<(), ValidationErrors>;
}

impl Validate for ProjectDraft {
    type Context<'a> = ProjectContext<'a>;

    fn validate(
        &self,
        context: &ProjectContext<'_>,
        exclude: &BTreeSet<Field>,
    ) -> Result<(), ValidationErrors> {
        validate_project(self, context, exclude)
    }
}

impl Validate for ChargeDraft {
    type Context<'a> = ChargeContext<'a>;

    fn validate(
        &self,
        context: &ChargeContext<'_>,
        exclude: &BTreeSet<Field>,
    ) -> Result<(), ValidationErrors> {
        validate_charge(self, context, exclude)
    }
}
