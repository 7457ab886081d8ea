use dotenvy::dotenv;
use serde::Deserialize;

use crate::shared::core::primitives::Timezone;

/// Database URL that selects the in-memory store.
pub const IN_MEMORY_DATABASE: &str = "memory";

/// Application configuration, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// SQLite connection URL, or `memory`.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Timezone the CLI reads and prints times in.
    #[serde(default)]
    pub project_time_cli_timezone: Timezone,
    /// Timezone for HTTP requests that name none.
    #[serde(default)]
    pub project_time_default_timezone: Timezone,
}

fn default_database_url() -> String {
    "sqlite://project_time.db".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    /// Load `.env` when present, then read the process environment.
    pub fn load() -> Result<Self, envy::Error> {
        dotenv().ok();
        envy::from_env::<Config>()
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }

    pub fn uses_in_memory_store(&self) -> bool {
        self.database_url == IN_MEMORY_DATABASE
    }
}
