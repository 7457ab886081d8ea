// Persistence ports for projects and charges.
//
// Every `save_*` validates the candidate against freshly loaded state and
// writes it within one transaction. Adapters also enforce the temporal
// invariants of a charge on every write, validated or not.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::modules::projects::core::aggregation::ProjectTotal;
use crate::modules::projects::core::charge::{Charge, ChargeDraft, ChargeId};
use crate::modules::projects::core::filters::{ChargeFilter, ProjectFilter};
use crate::modules::projects::core::project::{Project, ProjectDraft, ProjectId};
use crate::modules::projects::core::validation::{Field, ValidationErrors};
use crate::shared::core::primitives::TimeRange;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("no {entity} `{key}` found")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} `{key}` is referenced and cannot be deleted")]
    ProtectedReference { entity: &'static str, key: String },

    #[error("constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// A project with the end of its most recent charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRecord {
    pub project: Project,
    pub latest_charge: Option<DateTime<Utc>>,
}

/// A charge with its project's name and the time it charged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRecord {
    pub charge: Charge,
    pub project_name: String,
    pub time_charged: TimeDelta,
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError>;

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, StoreError>;

    /// Projects matching `filter`, ordered by name.
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<ProjectRecord>, StoreError>;

    /// Validate and persist. Fields in `exclude` skip field-level validation.
    async fn save_project(
        &self,
        draft: ProjectDraft,
        exclude: &BTreeSet<Field>,
    ) -> Result<Project, StoreError>;

    /// Fails with `ProtectedReference` while any charge references the project.
    async fn delete_project(&self, id: ProjectId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ChargeRepository: Send + Sync {
    async fn get_charge(&self, id: ChargeId) -> Result<Option<Charge>, StoreError>;

    /// The not yet closed charge with the latest start time.
    async fn latest_open_charge(&self) -> Result<Option<Charge>, StoreError>;

    /// Charges matching `filter`, ordered by start time.
    async fn list_charges(&self, filter: &ChargeFilter) -> Result<Vec<ChargeRecord>, StoreError>;

    async fn save_charge(
        &self,
        draft: ChargeDraft,
        exclude: &BTreeSet<Field>,
    ) -> Result<Charge, StoreError>;

    async fn delete_charge(&self, id: ChargeId) -> Result<(), StoreError>;

    /// Insert charges without running validation. The store's own
    /// constraints still apply and the batch is all or nothing.
    async fn bulk_insert_charges(&self, charges: &[Charge]) -> Result<(), StoreError>;

    async fn aggregate_time_charged(&self, filter: &ChargeFilter) -> Result<TimeDelta, StoreError>;

    /// Per project, the time charged by ended charges starting within
    /// `month`. An empty `project_ids` selects every project.
    async fn monthly_totals(
        &self,
        month: TimeRange,
        project_ids: &[ProjectId],
    ) -> Result<Vec<ProjectTotal>, StoreError>;
}

/// Both repositories over one backing store.
pub trait ProjectTimeStore: ProjectRepository + ChargeRepository {}

impl<T: ProjectRepository + ChargeRepository> ProjectTimeStore for T {}

pub type DynStore = dyn ProjectTimeStore;
