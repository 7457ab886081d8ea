use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const NAME_MAX_LENGTH: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ProjectId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for ProjectId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A persisted project. Inactive projects are closed for modification until
/// they are reactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub active: bool,
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.active {
            f.write_str(" (Inactive)")?;
        }
        Ok(())
    }
}

/// Candidate state of a project about to be saved. `id` is `None` until the
/// project has been persisted once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub id: Option<ProjectId>,
    pub name: String,
    pub active: bool,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            active: true,
        }
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn into_project(self) -> Project {
        Project {
            id: self.id.unwrap_or_default(),
            name: self.name,
            active: self.active,
        }
    }
}

impl From<&Project> for ProjectDraft {
    fn from(project: &Project) -> Self {
        Self {
            id: Some(project.id),
            name: project.name.clone(),
            active: project.active,
        }
    }
}

#[cfg(test)]
mod project_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_describe_active_and_inactive_projects() {
        let mut project = ProjectDraft::new("Test").into_project();
        assert_eq!(project.to_string(), "Test");
        project.active = false;
        assert_eq!(project.to_string(), "Test (Inactive)");
    }

    #[rstest]
    fn it_should_default_new_drafts_to_active() {
        let draft = ProjectDraft::new("Test");
        assert!(draft.active);
        assert_eq!(draft.id, None);
    }

    #[rstest]
    fn it_should_keep_the_identifier_of_a_persisted_project() {
        let project = ProjectDraft::new("Test").into_project();
        let draft = ProjectDraft::from(&project).active(false);
        assert_eq!(draft.id, Some(project.id));
        assert_eq!(draft.into_project().id, project.id);
    }

    #[rstest]
    fn it_should_round_trip_identifiers_through_text() {
        let id = ProjectId::new();
        assert_eq!(id.to_string().parse::<ProjectId>().unwrap(), id);
        assert!("not-a-uuid".parse::<ProjectId>().is_err());
    }
}
