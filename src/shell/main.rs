use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use project_time::modules::projects::adapters::outbound::in_memory::InMemoryProjectTimeStore;
use project_time::modules::projects::adapters::outbound::sqlite::SqliteProjectTimeStore;
use project_time::modules::projects::core::ports::DynStore;
use project_time::shell::cli::{Cli, Command, execute};
use project_time::shell::config::Config;
use project_time::shell::http::router;
use project_time::shell::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Command::Serve));

    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", format!("{error:#}").red());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(serving: bool) {
    // Commands print their own outcome, so only warnings are logged there.
    let default = if serving {
        "project_time=info,tower_http=info"
    } else {
        "project_time=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::load().context("invalid configuration")?;
    if let Some(database) = cli.database {
        config.database_url = database;
    }

    let store = open_store(&config).await?;
    let state = AppState::new(store, config.project_time_default_timezone);

    if let Command::Serve = cli.command {
        serve(&config, state).await?;
        return Ok(ExitCode::SUCCESS);
    }

    match execute(cli.command, &state, config.project_time_cli_timezone).await {
        Ok(message) => {
            println!("{}", message.green().bold());
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            eprintln!("{}", error.to_string().red().bold());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<DynStore>> {
    if config.uses_in_memory_store() {
        tracing::info!("using the in-memory store");
        return Ok(Arc::new(InMemoryProjectTimeStore::new()));
    }

    let store = SqliteProjectTimeStore::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open `{}`", config.database_url))?;
    tracing::info!(database_url = %config.database_url, "store ready");
    Ok(Arc::new(store))
}

async fn serve(config: &Config, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    tracing::info!(address = %config.bind_address, "listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
