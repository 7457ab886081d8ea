// Aggregates over collections of charges. The in-memory store answers its
// queries with these; the SQLite store computes the same values in SQL.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{BTreeMap, HashMap};

use crate::modules::projects::core::charge::Charge;
use crate::modules::projects::core::project::{Project, ProjectId};
use crate::shared::core::primitives::TimeRange;

/// Latest end time over `charges`, ignoring open charges.
pub fn latest_charge<'a>(charges: impl IntoIterator<Item = &'a Charge>) -> Option<DateTime<Utc>> {
    charges.into_iter().filter_map(|charge| charge.end_time).max()
}

pub fn total_time_charged<'a>(charges: impl IntoIterator<Item = &'a Charge>) -> TimeDelta {
    charges
        .into_iter()
        .fold(TimeDelta::zero(), |total, charge| total + charge.time_charged())
}

/// Time charged to one project over some period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTotal {
    pub project_id: ProjectId,
    pub project_name: String,
    pub total: TimeDelta,
}

/// Per project, the time charged by ended charges starting within `month`.
/// An empty `project_ids` means every project. Projects without a qualifying
/// charge are left out; rows are ordered by project id.
pub fn monthly_totals<'a>(
    projects: impl IntoIterator<Item = &'a Project>,
    charges: impl IntoIterator<Item = &'a Charge>,
    month: &TimeRange,
    project_ids: &[ProjectId],
) -> Vec<ProjectTotal> {
    let names: HashMap<ProjectId, &str> = projects
        .into_iter()
        .map(|project| (project.id, project.name.as_str()))
        .collect();

    let mut totals: BTreeMap<ProjectId, TimeDelta> = BTreeMap::new();
    for charge in charges {
        if charge.end_time.is_none() || !month.contains(charge.start_time) {
            continue;
        }
        if !project_ids.is_empty() && !project_ids.contains(&charge.project_id) {
            continue;
        }
        let total = totals.entry(charge.project_id).or_insert_with(TimeDelta::zero);
        *total = *total + charge.time_charged();
    }

    totals
        .into_iter()
        .filter_map(|(project_id, total)| {
            names.get(&project_id).map(|name| ProjectTotal {
                project_id,
                project_name: name.to_string(),
                total,
            })
        })
        .collect()
}
