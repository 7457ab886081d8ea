// In memory implementation of the project and charge repositories.
//
// Purpose
// - Support handler tests and `DATABASE_URL=memory` runs without a database.
//
// Responsibilities
// - Hold one lock across load, validate and write so a save is atomic.
// - Mirror the SQLite constraints: unique names, restricted deletes and the
//   temporal invariants of a charge.

use async_trait::async_trait;
use chrono::TimeDelta;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

use crate::modules::projects::core::aggregation::{
    ProjectTotal, latest_charge, monthly_totals, total_time_charged,
};
use crate::modules::projects::core::charge::{Charge, ChargeDraft, ChargeId};
use crate::modules::projects::core::filters::{ChargeFilter, ProjectFilter};
use crate::modules::projects::core::ports::{
    ChargeRecord, ChargeRepository, ProjectRecord, ProjectRepository, StoreError,
};
use crate::modules::projects::core::project::{NAME_MAX_LENGTH, Project, ProjectDraft, ProjectId};
use crate::modules::projects::core::validation::{
    ChargeContext, Field, ProjectContext, Validate,
};
use crate::shared::core::primitives::TimeRange;

#[derive(Default)]
struct Tables {
    projects: BTreeMap<ProjectId, Project>,
    charges: BTreeMap<ChargeId, Charge>,
}

impl Tables {
    fn name_taken(&self, name: &str, id: Option<ProjectId>) -> bool {
        self.projects
            .values()
            .any(|project| project.name == name && Some(project.id) != id)
    }

    fn charges_of(&self, project_id: ProjectId) -> impl Iterator<Item = &Charge> {
        self.charges
            .values()
            .filter(move |charge| charge.project_id == project_id)
    }

    fn matching_charges<'a>(
        &'a self,
        filter: &'a ChargeFilter,
    ) -> impl Iterator<Item = (&'a Charge, &'a Project)> {
        self.charges.values().filter_map(move |charge| {
            self.projects
                .get(&charge.project_id)
                .filter(|project| filter.matches(charge, project))
                .map(|project| (charge, project))
        })
    }
}

#[derive(Default)]
pub struct InMemoryProjectTimeStore {
    tables: Mutex<Tables>,
    offline: bool,
}

impl InMemoryProjectTimeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.offline = !self.offline;
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Backend("Project time store offline".into()));
        }
        Ok(())
    }
}

fn check_project_constraints(project: &Project, tables: &Tables) -> Result<(), StoreError> {
    let length = project.name.chars().count();
    if length == 0 || length > NAME_MAX_LENGTH {
        return Err(StoreError::ConstraintViolation(
            "project_name_length".into(),
        ));
    }
    if tables.name_taken(&project.name, Some(project.id)) {
        return Err(StoreError::ConstraintViolation(
            "UNIQUE constraint failed: projects.name".into(),
        ));
    }
    Ok(())
}

fn check_charge_constraints(charge: &Charge, tables: &Tables) -> Result<(), StoreError> {
    if !tables.projects.contains_key(&charge.project_id) {
        return Err(StoreError::ConstraintViolation(
            "FOREIGN KEY constraint failed: charges.project_id".into(),
        ));
    }
    if charge
        .end_time
        .is_some_and(|end_time| end_time < charge.start_time)
    {
        return Err(StoreError::ConstraintViolation(
            "end_time_must_be_on_or_after_start_time".into(),
        ));
    }
    if charge.closed && charge.end_time.is_none() {
        return Err(StoreError::ConstraintViolation(
            "cannot_close_without_end_time".into(),
        ));
    }
    Ok(())
}

#[async_trait]
impl ProjectRepository for InMemoryProjectTimeStore {
    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        self.ensure_online()?;
        Ok(self.tables.lock().await.projects.get(&id).cloned())
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<Project>, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .projects
            .values()
            .find(|project| project.name == name)
            .cloned())
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<ProjectRecord>, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        let mut records: Vec<ProjectRecord> = tables
            .projects
            .values()
            .filter(|project| filter.matches(project))
            .map(|project| ProjectRecord {
                project: project.clone(),
                latest_charge: latest_charge(tables.charges_of(project.id)),
            })
            .collect();
        records.sort_by(|a, b| a.project.name.cmp(&b.project.name));
        Ok(records)
    }

    async fn save_project(
        &self,
        draft: ProjectDraft,
        exclude: &BTreeSet<Field>,
    ) -> Result<Project, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;

        let previous = draft.id.and_then(|id| tables.projects.get(&id).cloned());
        let context = ProjectContext {
            previous: previous.as_ref(),
            name_taken: tables.name_taken(&draft.name, draft.id),
        };
        draft.validate(&context, exclude)?;

        let project = draft.into_project();
        check_project_constraints(&project, &tables)?;
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        if !tables.projects.contains_key(&id) {
            return Err(StoreError::NotFound {
                entity: "project",
                key: id.to_string(),
            });
        }
        if tables.charges_of(id).next().is_some() {
            return Err(StoreError::ProtectedReference {
                entity: "project",
                key: id.to_string(),
            });
        }
        tables.projects.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ChargeRepository for InMemoryProjectTimeStore {
    async fn get_charge(&self, id: ChargeId) -> Result<Option<Charge>, StoreError> {
        self.ensure_online()?;
        Ok(self.tables.lock().await.charges.get(&id).cloned())
    }

    async fn latest_open_charge(&self) -> Result<Option<Charge>, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .charges
            .values()
            .filter(|charge| !charge.closed)
            .max_by_key(|charge| (charge.start_time, charge.id))
            .cloned())
    }

    async fn list_charges(&self, filter: &ChargeFilter) -> Result<Vec<ChargeRecord>, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        let mut records: Vec<ChargeRecord> = tables
            .matching_charges(filter)
            .map(|(charge, project)| ChargeRecord {
                charge: charge.clone(),
                project_name: project.name.clone(),
                time_charged: charge.time_charged(),
            })
            .collect();
        records.sort_by_key(|record| (record.charge.start_time, record.charge.id));
        Ok(records)
    }

    async fn save_charge(
        &self,
        draft: ChargeDraft,
        exclude: &BTreeSet<Field>,
    ) -> Result<Charge, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;

        let project = tables
            .projects
            .get(&draft.project_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "project",
                key: draft.project_id.to_string(),
            })?;
        let previous = draft.id.and_then(|id| tables.charges.get(&id));
        let context = ChargeContext { project, previous };
        draft.validate(&context, exclude)?;

        let charge = draft.into_charge();
        check_charge_constraints(&charge, &tables)?;
        tables.charges.insert(charge.id, charge.clone());
        Ok(charge)
    }

    async fn delete_charge(&self, id: ChargeId) -> Result<(), StoreError> {
        self.ensure_online()?;
        self.tables
            .lock()
            .await
            .charges
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                entity: "charge",
                key: id.to_string(),
            })
    }

    async fn bulk_insert_charges(&self, charges: &[Charge]) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.lock().await;
        let mut batch = BTreeSet::new();
        for charge in charges {
            if tables.charges.contains_key(&charge.id) || !batch.insert(charge.id) {
                return Err(StoreError::ConstraintViolation(
                    "UNIQUE constraint failed: charges.id".into(),
                ));
            }
            check_charge_constraints(charge, &tables)?;
        }
        for charge in charges {
            tables.charges.insert(charge.id, charge.clone());
        }
        Ok(())
    }

    async fn aggregate_time_charged(&self, filter: &ChargeFilter) -> Result<TimeDelta, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        Ok(total_time_charged(
            tables.matching_charges(filter).map(|(charge, _)| charge),
        ))
    }

    async fn monthly_totals(
        &self,
        month: TimeRange,
        project_ids: &[ProjectId],
    ) -> Result<Vec<ProjectTotal>, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.lock().await;
        Ok(monthly_totals(
            tables.projects.values(),
            tables.charges.values(),
            &month,
            project_ids,
        ))
    }
}

#[cfg(test)]
mod in_memory_project_time_store_tests {
    use super::*;
    use crate::modules::projects::core::validation::{ErrorKey, ValidationError};
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 1, 1, 8, 0, 0).unwrap()
    }

    fn validate_all() -> BTreeSet<Field> {
        BTreeSet::new()
    }

    async fn store_with_project() -> (InMemoryProjectTimeStore, Project) {
        let store = InMemoryProjectTimeStore::new();
        let project = store
            .save_project(ProjectDraft::new("Test"), &validate_all())
            .await
            .expect("save project failed");
        (store, project)
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_save_and_load_a_project() {
        let (store, project) = store_with_project().await;
        assert_eq!(store.get_project(project.id).await.unwrap(), Some(project.clone()));
        assert_eq!(store.find_project_by_name("Test").await.unwrap(), Some(project));
        assert_eq!(store.find_project_by_name("test").await.unwrap(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_duplicate_project_name() {
        let (store, _) = store_with_project().await;
        let result = store
            .save_project(ProjectDraft::new("Test"), &validate_all())
            .await;
        match result {
            Err(StoreError::Validation(errors)) => {
                assert!(errors.contains(ErrorKey::Field(Field::Name), ValidationError::NotUnique))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_enforce_unique_names_when_the_name_is_excluded() {
        let (store, _) = store_with_project().await;
        let result = store
            .save_project(ProjectDraft::new("Test"), &BTreeSet::from([Field::Name]))
            .await;
        assert!(matches!(result, Err(StoreError::ConstraintViolation(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_protect_projects_with_charges(start_time: DateTime<Utc>) {
        let (store, project) = store_with_project().await;
        let charge = store
            .save_charge(ChargeDraft::new(project.id, start_time), &validate_all())
            .await
            .unwrap();

        let result = store.delete_project(project.id).await;
        assert!(matches!(result, Err(StoreError::ProtectedReference { entity: "project", .. })));

        store.delete_charge(charge.id).await.unwrap();
        store.delete_project(project.id).await.unwrap();
        assert_eq!(store.get_project(project.id).await.unwrap(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_report_missing_records_on_delete() {
        let store = InMemoryProjectTimeStore::new();
        assert!(matches!(
            store.delete_project(ProjectId::new()).await,
            Err(StoreError::NotFound { entity: "project", .. })
        ));
        assert!(matches!(
            store.delete_charge(ChargeId::new()).await,
            Err(StoreError::NotFound { entity: "charge", .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_validate_charges_before_writing(start_time: DateTime<Utc>) {
        let (store, project) = store_with_project().await;
        let draft = ChargeDraft::new(project.id, start_time)
            .end_time(Some(start_time - TimeDelta::minutes(5)));
        let result = store.save_charge(draft, &validate_all()).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(store.list_charges(&ChargeFilter::default()).await.unwrap().is_empty());
    }

    #[rstest]
    #[case(Some(-1), false)]
    #[case(None, true)]
    #[tokio::test]
    async fn it_should_reject_raw_inserts_breaking_charge_invariants(
        start_time: DateTime<Utc>,
        #[case] end_offset_minutes: Option<i64>,
        #[case] closed: bool,
    ) {
        let (store, project) = store_with_project().await;
        let valid = ChargeDraft::new(project.id, start_time).into_charge();
        let invalid = ChargeDraft::new(project.id, start_time)
            .end_time(end_offset_minutes.map(|minutes| start_time + TimeDelta::minutes(minutes)))
            .closed(closed)
            .into_charge();

        let result = store.bulk_insert_charges(&[valid, invalid]).await;
        assert!(matches!(result, Err(StoreError::ConstraintViolation(_))));
        assert!(store.list_charges(&ChargeFilter::default()).await.unwrap().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_raw_inserts_reusing_a_charge_id(start_time: DateTime<Utc>) {
        let (store, project) = store_with_project().await;
        let stored = ChargeDraft::new(project.id, start_time).into_charge();
        store.bulk_insert_charges(&[stored.clone()]).await.unwrap();

        let mut again = stored.clone();
        again.start_time = start_time + TimeDelta::hours(1);
        let result = store.bulk_insert_charges(&[again]).await;
        assert!(matches!(result, Err(StoreError::ConstraintViolation(_))));

        let fresh = ChargeDraft::new(project.id, start_time).into_charge();
        let result = store.bulk_insert_charges(&[fresh.clone(), fresh]).await;
        assert!(matches!(result, Err(StoreError::ConstraintViolation(_))));

        let charges = store.list_charges(&ChargeFilter::default()).await.unwrap();
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].charge, stored);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_find_the_latest_open_charge(start_time: DateTime<Utc>) {
        let (store, project) = store_with_project().await;
        let older = ChargeDraft::new(project.id, start_time).into_charge();
        let newer = ChargeDraft::new(project.id, start_time + TimeDelta::hours(2)).into_charge();
        let closed = ChargeDraft::new(project.id, start_time + TimeDelta::hours(4))
            .end_time(Some(start_time + TimeDelta::hours(5)))
            .closed(true)
            .into_charge();
        store
            .bulk_insert_charges(&[older, newer.clone(), closed])
            .await
            .unwrap();

        assert_eq!(store.latest_open_charge().await.unwrap(), Some(newer));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_annotate_listings(start_time: DateTime<Utc>) {
        let (store, project) = store_with_project().await;
        let charge = ChargeDraft::new(project.id, start_time)
            .end_time(Some(start_time + TimeDelta::minutes(30)))
            .into_charge();
        store.bulk_insert_charges(&[charge.clone()]).await.unwrap();

        let projects = store.list_projects(&ProjectFilter::default()).await.unwrap();
        assert_eq!(projects[0].latest_charge, charge.end_time);

        let charges = store.list_charges(&ChargeFilter::default()).await.unwrap();
        assert_eq!(charges[0].project_name, "Test");
        assert_eq!(charges[0].time_charged, TimeDelta::minutes(30));

        let total = store
            .aggregate_time_charged(&ChargeFilter::for_project(project.id))
            .await
            .unwrap();
        assert_eq!(total, TimeDelta::minutes(30));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_when_offline() {
        let mut store = InMemoryProjectTimeStore::new();
        store.toggle_offline();
        let result = store.list_projects(&ProjectFilter::default()).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            StoreError::Backend("Project time store offline".into()).to_string()
        );
    }
}
