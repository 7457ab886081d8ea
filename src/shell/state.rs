use std::sync::Arc;

use crate::modules::projects::core::ports::DynStore;
use crate::modules::projects::use_cases::dashboard::handler::DashboardHandler;
use crate::modules::projects::use_cases::list_records::handler::RecordsHandler;
use crate::modules::projects::use_cases::manage_charges::handler::ChargesHandler;
use crate::modules::projects::use_cases::manage_projects::handler::ProjectsHandler;
use crate::modules::projects::use_cases::monthly_summary::handler::ReportsHandler;
use crate::shared::core::primitives::Timezone;

#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<ProjectsHandler<DynStore>>,
    pub charges: Arc<ChargesHandler<DynStore>>,
    pub records: Arc<RecordsHandler<DynStore>>,
    pub reports: Arc<ReportsHandler<DynStore>>,
    pub dashboard: Arc<DashboardHandler<DynStore>>,
    /// Used when a request names no timezone of its own.
    pub default_timezone: Timezone,
}

impl AppState {
    pub fn new(store: Arc<DynStore>, default_timezone: Timezone) -> Self {
        Self {
            projects: Arc::new(ProjectsHandler::new(store.clone())),
            charges: Arc::new(ChargesHandler::new(store.clone())),
            records: Arc::new(RecordsHandler::new(store.clone())),
            reports: Arc::new(ReportsHandler::new(store.clone())),
            dashboard: Arc::new(DashboardHandler::new(store)),
            default_timezone,
        }
    }
}
