use crate::modules::projects::core::filters::{ChargeFilter, ProjectFilter};
use crate::shared::core::primitives::Timezone;
use crate::shell::cli::{CommandError, markdown_table};
use crate::shell::state::AppState;

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Active projects, or every project with `all`.
pub async fn ls_projects(state: &AppState, all: bool, timezone: Timezone) -> Result<String, CommandError> {
    let filter = if all {
        ProjectFilter::default()
    } else {
        ProjectFilter::active_only()
    };
    let projects = state
        .records
        .projects(&filter, timezone)
        .await
        .map_err(|_| CommandError("Failed to retrieve the project list.".into()))?;

    let rows: Vec<Vec<String>> = projects
        .into_iter()
        .map(|project| {
            vec![
                project.id.to_string(),
                project.name,
                project.active.to_string(),
                project
                    .latest_charge
                    .map(|time| time.format(LOCAL_TIME_FORMAT).to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();

    Ok(markdown_table(&["Id", "Name", "Active", "Latest Charge"], &rows))
}

/// Open charges, or every charge with `all`, optionally for one project.
pub async fn ls_charges(
    state: &AppState,
    all: bool,
    project: Option<String>,
    timezone: Timezone,
) -> Result<String, CommandError> {
    let filter = ChargeFilter {
        project_name: project,
        closed: if all { None } else { Some(false) },
        ..ChargeFilter::default()
    };
    let charges = state
        .records
        .charges(&filter, timezone)
        .await
        .map_err(|_| CommandError("Failed to retrieve the charge list.".into()))?;

    let rows: Vec<Vec<String>> = charges
        .into_iter()
        .map(|charge| {
            vec![
                charge.id.to_string(),
                charge.project_name,
                charge.start_time.format(LOCAL_TIME_FORMAT).to_string(),
                charge
                    .end_time
                    .map(|time| time.format(LOCAL_TIME_FORMAT).to_string())
                    .unwrap_or_default(),
                charge.time_charged,
                charge.closed.to_string(),
            ]
        })
        .collect();

    Ok(markdown_table(
        &["Id", "Project", "Start Time", "End Time", "Time Charged", "Closed"],
        &rows,
    ))
}
