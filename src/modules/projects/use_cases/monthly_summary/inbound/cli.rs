use chrono::NaiveTime;

use crate::modules::projects::use_cases::manage_projects::command::ProjectRef;
use crate::shared::core::primitives::{Timezone, format_duration};
use crate::shell::cli::{CommandError, SummaryArgs, markdown_table};
use crate::shell::state::AppState;

/// Hours per project over the month containing `args.date`, today by default.
pub async fn summary(
    state: &AppState,
    args: SummaryArgs,
    timezone: Timezone,
) -> Result<String, CommandError> {
    let mut project_ids = Vec::with_capacity(args.projects.len());
    for name in args.projects {
        let project = state
            .projects
            .resolve(&ProjectRef::Name(name))
            .await
            .map_err(|e| CommandError::from_application(e, "summarize", "project"))?;
        project_ids.push(project.id);
    }
    let date = args.date.unwrap_or_else(|| timezone.now().date_naive());

    let summary = state
        .reports
        .monthly_summary(
            timezone.make_aware(date, NaiveTime::MIN),
            timezone,
            &project_ids,
        )
        .await
        .map_err(|e| CommandError::from_application(e, "summarize", "month"))?;

    let rows: Vec<Vec<String>> = summary
        .rows
        .iter()
        .map(|row| {
            let seconds = (row.value * 3600.0).round() as i64;
            vec![
                row.project_name.clone(),
                format!("{:.2}", row.value),
                format_duration(chrono::TimeDelta::seconds(seconds)),
            ]
        })
        .collect();

    Ok(format!(
        "{}\n\n{}",
        summary.month_start.format("%B %Y"),
        markdown_table(&["Project", "Hours", "Time Charged"], &rows)
    ))
}
