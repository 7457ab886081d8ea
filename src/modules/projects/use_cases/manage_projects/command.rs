use serde::Deserialize;
use std::fmt;

use crate::modules::projects::core::project::ProjectId;

/// How a caller names a project: the HTTP API by id, the CLI by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    Id(ProjectId),
    Name(String),
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectRef::Id(id) => fmt::Display::fmt(id, f),
            ProjectRef::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

impl CreateProject {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
        }
    }
}

/// Partial update. Absent fields keep their value and skip field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProject {
    pub project: ProjectRef,
    pub name: Option<String>,
    pub active: Option<bool>,
}

impl UpdateProject {
    pub fn rename(project: ProjectRef, name: impl Into<String>) -> Self {
        Self {
            project,
            name: Some(name.into()),
            active: None,
        }
    }

    pub fn set_active(project: ProjectRef, active: bool) -> Self {
        Self {
            project,
            name: None,
            active: Some(active),
        }
    }
}
