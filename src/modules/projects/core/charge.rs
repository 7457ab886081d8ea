use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::modules::projects::core::project::ProjectId;
use crate::shared::core::primitives::{Timezone, format_duration};

const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChargeId(Uuid);

impl ChargeId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ChargeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ChargeId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for ChargeId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

impl fmt::Display for ChargeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Time charged between a start and an optional end. An open charge has
/// charged nothing yet.
pub fn time_charged(start_time: DateTime<Utc>, end_time: Option<DateTime<Utc>>) -> TimeDelta {
    end_time.map_or_else(TimeDelta::zero, |end_time| end_time - start_time)
}

/// A persisted charge against a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Charge {
    pub id: ChargeId,
    pub project_id: ProjectId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub closed: bool,
}

impl Charge {
    pub fn time_charged(&self) -> TimeDelta {
        time_charged(self.start_time, self.end_time)
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Render the charge for people, with times in `timezone`.
    pub fn display<'a>(&'a self, project_name: &'a str, timezone: Timezone) -> ChargeDisplay<'a> {
        ChargeDisplay {
            charge: self,
            project_name,
            timezone,
        }
    }
}

pub struct ChargeDisplay<'a> {
    charge: &'a Charge,
    project_name: &'a str,
    timezone: Timezone,
}

impl fmt::Display for ChargeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let charged = self.charge.time_charged();
        let start = self.timezone.localize(self.charge.start_time);
        let end = match self.charge.end_time {
            Some(end) => self
                .timezone
                .localize(end)
                .format(DISPLAY_TIME_FORMAT)
                .to_string(),
            None => "__:__:__".to_string(),
        };

        write!(
            f,
            "{}, {} - {} ({} {}) [{}]",
            self.project_name,
            start.format(DISPLAY_TIME_FORMAT),
            end,
            format_duration(charged),
            if charged >= TimeDelta::hours(1) { "hours" } else { "minutes" },
            if self.charge.closed { "Closed" } else { "Open" },
        )
    }
}

/// Candidate state of a charge about to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeDraft {
    pub id: Option<ChargeId>,
    pub project_id: ProjectId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub closed: bool,
}

impl ChargeDraft {
    pub fn new(project_id: ProjectId, start_time: DateTime<Utc>) -> Self {
        Self {
            id: None,
            project_id,
            start_time,
            end_time: None,
            closed: false,
        }
    }

    pub fn end_time(mut self, end_time: Option<DateTime<Utc>>) -> Self {
        self.end_time = end_time;
        self
    }

    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    pub fn time_charged(&self) -> TimeDelta {
        time_charged(self.start_time, self.end_time)
    }

    pub fn into_charge(self) -> Charge {
        Charge {
            id: self.id.unwrap_or_default(),
            project_id: self.project_id,
            start_time: self.start_time,
            end_time: self.end_time,
            closed: self.closed,
        }
    }
}

impl From<&Charge> for ChargeDraft {
    fn from(charge: &Charge) -> Self {
        Self {
            id: Some(charge.id),
            project_id: charge.project_id,
            start_time: charge.start_time,
            end_time: charge.end_time,
            closed: charge.closed,
        }
    }
}
