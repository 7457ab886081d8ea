use std::collections::BTreeSet;
use std::sync::Arc;

use crate::modules::projects::core::ports::ProjectTimeStore;
use crate::modules::projects::core::project::{Project, ProjectDraft};
use crate::modules::projects::core::validation::Field;
use crate::modules::projects::use_cases::errors::ApplicationError;
use crate::modules::projects::use_cases::manage_projects::command::{
    CreateProject, ProjectRef, UpdateProject,
};

pub async fn resolve_project<TStore>(
    store: &TStore,
    project: &ProjectRef,
) -> Result<Project, ApplicationError>
where
    TStore: ProjectTimeStore + ?Sized,
{
    let found = match project {
        ProjectRef::Id(id) => store.get_project(*id).await?,
        ProjectRef::Name(name) => store.find_project_by_name(name).await?,
    };
    found.ok_or_else(|| ApplicationError::NotFound {
        entity: "project",
        key: project.to_string(),
    })
}

pub struct ProjectsHandler<TStore>
where
    TStore: ProjectTimeStore + ?Sized + 'static,
{
    store: Arc<TStore>,
}

impl<TStore> ProjectsHandler<TStore>
where
    TStore: ProjectTimeStore + ?Sized + 'static,
{
    pub fn new(store: Arc<TStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, project: &ProjectRef) -> Result<Project, ApplicationError> {
        resolve_project(&*self.store, project).await
    }

    pub async fn create(&self, command: CreateProject) -> Result<Project, ApplicationError> {
        let draft = ProjectDraft::new(command.name).active(command.active);
        let project = self.store.save_project(draft, &BTreeSet::new()).await?;
        tracing::info!(project_id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    /// Always validates and saves, so an inactive project saved as is still
    /// fails with `CannotModifyWhenInactive`.
    pub async fn update(&self, command: UpdateProject) -> Result<Project, ApplicationError> {
        let current = self.resolve(&command.project).await?;
        let mut draft = ProjectDraft::from(&current);
        let mut exclude = BTreeSet::from([Field::Name, Field::Active]);

        if let Some(name) = command.name {
            draft.name = name;
            exclude.remove(&Field::Name);
        }
        if let Some(active) = command.active {
            draft.active = active;
            exclude.remove(&Field::Active);
        }

        let project = self.store.save_project(draft, &exclude).await?;
        tracing::info!(project_id = %project.id, active = project.active, "project updated");
        Ok(project)
    }

    pub async fn delete(&self, project: ProjectRef) -> Result<Project, ApplicationError> {
        let project = self.resolve(&project).await?;
        self.store.delete_project(project.id).await?;
        tracing::info!(project_id = %project.id, "project deleted");
        Ok(project)
    }
}

#[cfg(test)]
mod projects_handler_tests {
    use super::*;
    use crate::modules::projects::adapters::outbound::in_memory::InMemoryProjectTimeStore;
    use crate::modules::projects::core::charge::ChargeDraft;
    use crate::modules::projects::core::ports::ChargeRepository;
    use crate::modules::projects::core::validation::{ErrorKey, ValidationError};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn handler() -> ProjectsHandler<InMemoryProjectTimeStore> {
        ProjectsHandler::new(Arc::new(InMemoryProjectTimeStore::new()))
    }

    fn by_name(name: &str) -> ProjectRef {
        ProjectRef::Name(name.to_string())
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_create_an_active_project(handler: ProjectsHandler<InMemoryProjectTimeStore>) {
        let project = handler.create(CreateProject::named("Test")).await.unwrap();
        assert!(project.active);
        assert_eq!(handler.resolve(&ProjectRef::Id(project.id)).await.unwrap(), project);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_duplicate_name(handler: ProjectsHandler<InMemoryProjectTimeStore>) {
        handler.create(CreateProject::named("Test")).await.unwrap();
        match handler.create(CreateProject::named("Test")).await {
            Err(ApplicationError::Validation(errors)) => {
                assert!(errors.contains(ErrorKey::Field(Field::Name), ValidationError::NotUnique))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_rename_a_project(handler: ProjectsHandler<InMemoryProjectTimeStore>) {
        handler.create(CreateProject::named("Test")).await.unwrap();

        let same = handler
            .update(UpdateProject::rename(by_name("Test"), "Test"))
            .await
            .unwrap();
        assert_eq!(same.name, "Test");

        let renamed = handler
            .update(UpdateProject::rename(by_name("Test"), "Renamed"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Renamed");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_refuse_to_modify_an_inactive_project_until_reactivated(
        handler: ProjectsHandler<InMemoryProjectTimeStore>,
    ) {
        handler.create(CreateProject::named("Test")).await.unwrap();
        handler
            .update(UpdateProject::set_active(by_name("Test"), false))
            .await
            .unwrap();

        let rename = handler
            .update(UpdateProject::rename(by_name("Test"), "Renamed"))
            .await;
        match rename {
            Err(ApplicationError::Validation(errors)) => assert_eq!(
                errors.get(ErrorKey::Entity),
                &[ValidationError::CannotModifyWhenInactive]
            ),
            other => panic!("unexpected result: {other:?}"),
        }

        let reactivated = handler
            .update(UpdateProject::set_active(by_name("Test"), true))
            .await
            .unwrap();
        assert!(reactivated.active);
        let again = handler
            .update(UpdateProject::set_active(by_name("Test"), true))
            .await
            .unwrap();
        assert!(again.active);
    }

    #[rstest]
    #[case(UpdateProject { project: by_name("Test"), name: None, active: None })]
    #[case(UpdateProject::set_active(by_name("Test"), false))]
    #[case(UpdateProject::rename(by_name("Test"), "Test"))]
    #[tokio::test]
    async fn it_should_fail_to_save_an_inactive_project_unchanged(
        handler: ProjectsHandler<InMemoryProjectTimeStore>,
        #[case] command: UpdateProject,
    ) {
        handler
            .create(CreateProject { name: "Test".into(), active: false })
            .await
            .unwrap();

        match handler.update(command).await {
            Err(ApplicationError::Validation(errors)) => assert_eq!(
                errors.get(ErrorKey::Entity),
                &[ValidationError::CannotModifyWhenInactive]
            ),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_not_find_unknown_projects(handler: ProjectsHandler<InMemoryProjectTimeStore>) {
        let result = handler.delete(by_name("Missing")).await;
        assert!(matches!(
            result,
            Err(ApplicationError::NotFound { entity: "project", ref key }) if key == "Missing"
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_protect_projects_with_charges() {
        let store = Arc::new(InMemoryProjectTimeStore::new());
        let handler = ProjectsHandler::new(store.clone());
        let project = handler.create(CreateProject::named("Test")).await.unwrap();
        store
            .save_charge(ChargeDraft::new(project.id, Utc::now()), &BTreeSet::new())
            .await
            .unwrap();

        let result = handler.delete(by_name("Test")).await;
        assert!(matches!(result, Err(ApplicationError::ProtectedReferenceExists { .. })));
    }
}
