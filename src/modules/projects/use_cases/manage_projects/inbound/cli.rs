use crate::modules::projects::use_cases::manage_projects::command::{
    CreateProject, ProjectRef, UpdateProject,
};
use crate::shell::cli::CommandError;
use crate::shell::state::AppState;

pub async fn mkproject(state: &AppState, name: String) -> Result<String, CommandError> {
    state
        .projects
        .create(CreateProject::named(name))
        .await
        .map_err(|e| CommandError::from_application(e, "create", "project"))?;

    Ok("Project was successfully created.".into())
}

pub async fn rename(
    state: &AppState,
    current_name: String,
    new_name: String,
) -> Result<String, CommandError> {
    let project = ProjectRef::Name(current_name);
    let current = state
        .projects
        .resolve(&project)
        .await
        .map_err(|e| CommandError::from_application(e, "rename", "project"))?;
    if current.name == new_name {
        return Ok("The new name is the same as the current name.".into());
    }

    state
        .projects
        .update(UpdateProject::rename(project, new_name))
        .await
        .map_err(|e| CommandError::from_application(e, "rename", "project"))?;

    Ok("Project was successfully renamed.".into())
}

pub async fn set_active(state: &AppState, name: String, active: bool) -> Result<String, CommandError> {
    let verb = if active { "activate" } else { "deactivate" };
    let project = ProjectRef::Name(name);
    let current = state
        .projects
        .resolve(&project)
        .await
        .map_err(|e| CommandError::from_application(e, verb, "project"))?;
    if current.active == active {
        return Ok(if active {
            "Project is already active."
        } else {
            "Project is already inactive."
        }
        .into());
    }

    state
        .projects
        .update(UpdateProject::set_active(project, active))
        .await
        .map_err(|e| CommandError::from_application(e, verb, "project"))?;

    Ok(if active {
        "Project was successfully activated."
    } else {
        "Project was successfully deactivated."
    }
    .into())
}

pub async fn rm(state: &AppState, name: String) -> Result<String, CommandError> {
    state
        .projects
        .delete(ProjectRef::Name(name))
        .await
        .map_err(|e| CommandError::from_application(e, "delete", "project"))?;

    Ok("Project was successfully deleted.".into())
}
