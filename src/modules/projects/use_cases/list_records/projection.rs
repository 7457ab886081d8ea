use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::modules::projects::core::charge::ChargeId;
use crate::modules::projects::core::ports::{ChargeRecord, ProjectRecord};
use crate::modules::projects::core::project::ProjectId;
use crate::shared::core::primitives::{Timezone, format_duration, hours};

/// A project as presented to readers, times in their timezone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    pub id: ProjectId,
    pub name: String,
    pub active: bool,
    pub latest_charge: Option<DateTime<FixedOffset>>,
    pub display: String,
}

impl ProjectView {
    pub fn new(record: ProjectRecord, timezone: Timezone) -> Self {
        Self {
            display: record.project.to_string(),
            id: record.project.id,
            name: record.project.name,
            active: record.project.active,
            latest_charge: record.latest_charge.map(|instant| timezone.localize(instant)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeView {
    pub id: ChargeId,
    pub project_id: ProjectId,
    pub project_name: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: Option<DateTime<FixedOffset>>,
    /// `H:MM:SS`.
    pub time_charged: String,
    pub hours_charged: f64,
    pub closed: bool,
    pub display: String,
}

impl ChargeView {
    pub fn new(record: ChargeRecord, timezone: Timezone) -> Self {
        let charge = &record.charge;
        Self {
            id: charge.id,
            project_id: charge.project_id,
            start_time: timezone.localize(charge.start_time),
            end_time: charge.end_time.map(|instant| timezone.localize(instant)),
            time_charged: format_duration(record.time_charged),
            hours_charged: hours(record.time_charged),
            closed: charge.closed,
            display: charge.display(&record.project_name, timezone).to_string(),
            project_name: record.project_name,
        }
    }
}
