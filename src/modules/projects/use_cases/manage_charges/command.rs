use chrono::{DateTime, NaiveTime, Utc};

use crate::modules::projects::core::charge::ChargeId;
use crate::modules::projects::core::project::ProjectId;
use crate::modules::projects::use_cases::manage_projects::command::ProjectRef;
use crate::shared::core::primitives::Timezone;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCharge {
    pub project: ProjectRef,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub closed: bool,
}

/// Set the end time of a charge from a wall-clock time on the charge's
/// local start date. Without an id the latest open charge is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitCharge {
    pub charge: Option<ChargeId>,
    pub end: NaiveTime,
    pub close: bool,
    pub timezone: Timezone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseCharge {
    pub charge: Option<ChargeId>,
}

/// Partial update. `None` leaves a field alone and skips its field-level
/// validation; `end_time: Some(None)` clears the end time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCharge {
    pub project: Option<ProjectId>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<Option<DateTime<Utc>>>,
    pub closed: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteCharge {
    pub charge: Option<ChargeId>,
}
