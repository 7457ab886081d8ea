use std::sync::Arc;

use crate::modules::projects::adapters::outbound::in_memory::InMemoryProjectTimeStore;
use crate::modules::projects::adapters::outbound::sqlite::SqliteProjectTimeStore;
use crate::modules::projects::core::ports::DynStore;

/// Which adapter a scenario runs against.
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    InMemory,
    Sqlite,
}

impl Backend {
    pub async fn store(self) -> Arc<DynStore> {
        match self {
            Backend::InMemory => Arc::new(InMemoryProjectTimeStore::new()),
            Backend::Sqlite => Arc::new(SqliteProjectTimeStore::in_memory().await.unwrap()),
        }
    }
}
