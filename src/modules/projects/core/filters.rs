use crate::modules::projects::core::charge::Charge;
use crate::modules::projects::core::project::{Project, ProjectId};
use crate::shared::core::primitives::TimeRange;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Case-insensitive substring of the name.
    pub name_contains: Option<String>,
    pub active: Option<bool>,
}

impl ProjectFilter {
    pub fn active_only() -> Self {
        Self {
            active: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, project: &Project) -> bool {
        self.active.is_none_or(|active| project.active == active)
            && self
                .name_contains
                .as_deref()
                .is_none_or(|needle| contains_ignoring_case(&project.name, needle))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChargeFilter {
    pub project_id: Option<ProjectId>,
    /// Exact project name.
    pub project_name: Option<String>,
    /// Case-insensitive substring of the project name.
    pub project_name_contains: Option<String>,
    pub started_within: Option<TimeRange>,
    pub ended_within: Option<TimeRange>,
    pub closed: Option<bool>,
}

impl ChargeFilter {
    pub fn open_only() -> Self {
        Self {
            closed: Some(false),
            ..Self::default()
        }
    }

    pub fn for_project(project_id: ProjectId) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, charge: &Charge, project: &Project) -> bool {
        self.project_id.is_none_or(|id| charge.project_id == id)
            && self
                .project_name
                .as_deref()
                .is_none_or(|name| project.name == name)
            && self
                .project_name_contains
                .as_deref()
                .is_none_or(|needle| contains_ignoring_case(&project.name, needle))
            && self
                .started_within
                .is_none_or(|range| range.contains(charge.start_time))
            && self.ended_within.is_none_or(|range| {
                charge.end_time.is_some_and(|end_time| range.contains(end_time))
            })
            && self.closed.is_none_or(|closed| charge.closed == closed)
    }
}

fn contains_ignoring_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod filters_tests {
    use super::*;
    use crate::modules::projects::core::charge::ChargeDraft;
    use crate::modules::projects::core::project::ProjectDraft;
    use chrono::{TimeDelta, TimeZone, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn project() -> Project {
        ProjectDraft::new("Client Work").into_project()
    }

    fn charge_for(project: &Project) -> Charge {
        let start_time = Utc.with_ymd_and_hms(2019, 1, 1, 8, 0, 0).unwrap();
        ChargeDraft::new(project.id, start_time)
            .end_time(Some(start_time + TimeDelta::hours(1)))
            .into_charge()
    }

    #[rstest]
    #[case(ProjectFilter::default(), true)]
    #[case(ProjectFilter::active_only(), true)]
    #[case(ProjectFilter { active: Some(false), ..Default::default() }, false)]
    #[case(ProjectFilter { name_contains: Some("client".into()), ..Default::default() }, true)]
    #[case(ProjectFilter { name_contains: Some("other".into()), ..Default::default() }, false)]
    fn it_should_filter_projects(project: Project, #[case] filter: ProjectFilter, #[case] expected: bool) {
        assert_eq!(filter.matches(&project), expected);
    }

    #[rstest]
    fn it_should_filter_charges_by_project(project: Project) {
        let charge = charge_for(&project);
        assert!(ChargeFilter::for_project(project.id).matches(&charge, &project));
        assert!(!ChargeFilter::for_project(ProjectId::new()).matches(&charge, &project));

        let by_name = ChargeFilter {
            project_name: Some("Client Work".into()),
            ..Default::default()
        };
        assert!(by_name.matches(&charge, &project));

        let by_partial_name = ChargeFilter {
            project_name_contains: Some("WORK".into()),
            ..Default::default()
        };
        assert!(by_partial_name.matches(&charge, &project));
    }

    #[rstest]
    fn it_should_filter_charges_by_state_and_time(project: Project) {
        let mut charge = charge_for(&project);
        assert!(ChargeFilter::open_only().matches(&charge, &project));
        charge.closed = true;
        assert!(!ChargeFilter::open_only().matches(&charge, &project));

        let january_first = TimeRange::new(
            Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2019, 1, 2, 0, 0, 0).unwrap(),
        );
        let started = ChargeFilter {
            started_within: Some(january_first),
            ..Default::default()
        };
        let ended = ChargeFilter {
            ended_within: Some(january_first),
            ..Default::default()
        };
        assert!(started.matches(&charge, &project));
        assert!(ended.matches(&charge, &project));

        charge.end_time = None;
        assert!(!ended.matches(&charge, &project));
    }
}
