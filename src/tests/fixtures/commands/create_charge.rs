use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::modules::projects::use_cases::manage_charges::command::CreateCharge;
use crate::modules::projects::use_cases::manage_projects::command::ProjectRef;

/// Builds `CreateCharge` commands against a named project, starting at
/// 2019-01-01T08:00:00Z and open unless told otherwise.
pub struct CreateChargeBuilder {
    project: String,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    closed: bool,
}

impl Default for CreateChargeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateChargeBuilder {
    pub fn new() -> Self {
        Self {
            project: "Test".into(),
            start_time: Utc.with_ymd_and_hms(2019, 1, 1, 8, 0, 0).unwrap(),
            end_time: None,
            closed: false,
        }
    }

    pub fn project(mut self, name: impl Into<String>) -> Self {
        self.project = name.into();
        self
    }

    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Ends the charge `duration` after its start.
    pub fn lasting(self, duration: TimeDelta) -> Self {
        let end_time = self.start_time + duration;
        self.end_time(end_time)
    }

    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    pub fn build(self) -> CreateCharge {
        CreateCharge {
            project: ProjectRef::Name(self.project),
            start_time: self.start_time,
            end_time: self.end_time,
            closed: self.closed,
        }
    }
}
