use std::collections::BTreeSet;
use std::sync::Arc;

use crate::modules::projects::core::charge::{Charge, ChargeDraft, ChargeId};
use crate::modules::projects::core::ports::ProjectTimeStore;
use crate::modules::projects::core::validation::Field;
use crate::modules::projects::use_cases::errors::ApplicationError;
use crate::modules::projects::use_cases::manage_charges::command::{
    CloseCharge, CommitCharge, CreateCharge, DeleteCharge, UpdateCharge,
};
use crate::modules::projects::use_cases::manage_projects::handler::resolve_project;

pub struct ChargesHandler<TStore>
where
    TStore: ProjectTimeStore + ?Sized + 'static,
{
    store: Arc<TStore>,
}

impl<TStore> ChargesHandler<TStore>
where
    TStore: ProjectTimeStore + ?Sized + 'static,
{
    pub fn new(store: Arc<TStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: ChargeId) -> Result<Charge, ApplicationError> {
        self.store
            .get_charge(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound {
                entity: "charge",
                key: id.to_string(),
            })
    }

    /// The charge with `id`, or the latest open charge when no id is given.
    pub async fn target(&self, id: Option<ChargeId>) -> Result<Charge, ApplicationError> {
        match id {
            Some(id) => self.get(id).await,
            None => self
                .store
                .latest_open_charge()
                .await?
                .ok_or(ApplicationError::NoOpenCharge),
        }
    }

    pub async fn create(&self, command: CreateCharge) -> Result<Charge, ApplicationError> {
        let project = resolve_project(&*self.store, &command.project).await?;
        let draft = ChargeDraft::new(project.id, command.start_time)
            .end_time(command.end_time)
            .closed(command.closed);
        let charge = self.store.save_charge(draft, &BTreeSet::new()).await?;
        tracing::info!(charge_id = %charge.id, project = %project.name, "charge created");
        Ok(charge)
    }

    pub async fn commit(&self, command: CommitCharge) -> Result<Charge, ApplicationError> {
        let charge = self.target(command.charge).await?;
        let start_date = command.timezone.localize(charge.start_time).date_naive();
        let draft = ChargeDraft::from(&charge)
            .end_time(Some(command.timezone.make_aware(start_date, command.end)))
            .closed(command.close);
        let charge = self.store.save_charge(draft, &BTreeSet::new()).await?;
        tracing::info!(charge_id = %charge.id, closed = charge.closed, "charge committed");
        Ok(charge)
    }

    pub async fn close(&self, command: CloseCharge) -> Result<Charge, ApplicationError> {
        let charge = self.target(command.charge).await?;
        let draft = ChargeDraft::from(&charge).closed(true);
        let charge = self.store.save_charge(draft, &BTreeSet::new()).await?;
        tracing::info!(charge_id = %charge.id, "charge closed");
        Ok(charge)
    }

    pub async fn update(&self, id: ChargeId, command: UpdateCharge) -> Result<Charge, ApplicationError> {
        let current = self.get(id).await?;
        let mut draft = ChargeDraft::from(&current);
        let mut exclude =
            BTreeSet::from([Field::Project, Field::StartTime, Field::EndTime, Field::Closed]);

        if let Some(project_id) = command.project {
            draft.project_id = project_id;
            exclude.remove(&Field::Project);
        }
        if let Some(start_time) = command.start_time {
            draft.start_time = start_time;
            exclude.remove(&Field::StartTime);
        }
        if let Some(end_time) = command.end_time {
            draft.end_time = end_time;
            exclude.remove(&Field::EndTime);
        }
        if let Some(closed) = command.closed {
            draft.closed = closed;
            exclude.remove(&Field::Closed);
        }

        let charge = self.store.save_charge(draft, &exclude).await?;
        tracing::info!(charge_id = %charge.id, "charge updated");
        Ok(charge)
    }

    pub async fn delete(&self, command: DeleteCharge) -> Result<Charge, ApplicationError> {
        let charge = self.target(command.charge).await?;
        self.store.delete_charge(charge.id).await?;
        tracing::info!(charge_id = %charge.id, "charge deleted");
        Ok(charge)
    }
}
