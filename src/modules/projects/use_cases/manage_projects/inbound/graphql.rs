use async_graphql::{Context, ErrorExtensions, ID, Object, Result as GqlResult};

use crate::modules::projects::use_cases::manage_projects::command::{
    CreateProject, ProjectRef, UpdateProject,
};
use crate::shell::graphql::parse_id;
use crate::shell::state::AppState;

#[derive(Default)]
pub struct ManageProjectsMutation;

#[Object]
impl ManageProjectsMutation {
    async fn create_project(
        &self,
        context: &Context<'_>,
        name: String,
        active: Option<bool>,
    ) -> GqlResult<ID> {
        let state = context.data_unchecked::<AppState>();

        let command = CreateProject {
            name,
            active: active.unwrap_or(true),
        };
        let project = state
            .projects
            .create(command)
            .await
            .map_err(|e| e.extend())?;

        Ok(ID(project.id.to_string()))
    }

    /// Omitted arguments keep their value.
    async fn update_project(
        &self,
        context: &Context<'_>,
        id: ID,
        name: Option<String>,
        active: Option<bool>,
    ) -> GqlResult<ID> {
        let state = context.data_unchecked::<AppState>();

        let command = UpdateProject {
            project: ProjectRef::Id(parse_id(&id)?),
            name,
            active,
        };
        state
            .projects
            .update(command)
            .await
            .map_err(|e| e.extend())?;

        Ok(id)
    }

    async fn delete_project(&self, context: &Context<'_>, id: ID) -> GqlResult<ID> {
        let state = context.data_unchecked::<AppState>();

        state
            .projects
            .delete(ProjectRef::Id(parse_id(&id)?))
            .await
            .map_err(|e| e.extend())?;

        Ok(id)
    }
}
