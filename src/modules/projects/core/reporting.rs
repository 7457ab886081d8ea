use serde::Serialize;
use std::f64::consts::PI;

use crate::modules::projects::core::aggregation::ProjectTotal;
use crate::modules::projects::core::project::ProjectId;
use crate::shared::core::primitives::hours;

/// The Category20c palette. Its N-color variants are the first N entries.
pub const CATEGORY20C: [&str; 20] = [
    "#3182bd", "#6baed6", "#9ecae1", "#c6dbef", "#e6550d", "#fd8d3c", "#fdae6b", "#fdd0a2",
    "#31a354", "#74c476", "#a1d99b", "#c7e9c0", "#756bb1", "#9e9ac8", "#bcbddc", "#dadaeb",
    "#636363", "#969696", "#bdbdbd", "#d9d9d9",
];

/// Colors for `categories` chart slices, or `None` when there are more
/// categories than the palette can tell apart.
pub fn palette(categories: usize) -> Option<&'static [&'static str]> {
    match categories {
        // One or two categories take the head of the 3-color palette.
        0..=2 => Some(&CATEGORY20C[..3][..categories]),
        3..=20 => Some(&CATEGORY20C[..categories]),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummaryRow {
    pub project_id: ProjectId,
    pub project_name: String,
    /// Hours charged in the month.
    pub value: f64,
}

impl From<ProjectTotal> for MonthlySummaryRow {
    fn from(total: ProjectTotal) -> Self {
        Self {
            project_id: total.project_id,
            project_name: total.project_name,
            value: hours(total.total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub project_name: String,
    pub value: f64,
    pub angle: f64,
    pub color: Option<&'static str>,
}

/// Pie chart slices for a monthly summary: each row's share of the total
/// hours as an angle, plus a palette color.
pub fn summary_chart(rows: &[MonthlySummaryRow]) -> Vec<ChartSlice> {
    let sum: f64 = rows.iter().map(|row| row.value).sum();
    let colors = palette(rows.len());

    rows.iter()
        .enumerate()
        .map(|(index, row)| ChartSlice {
            project_name: row.project_name.clone(),
            value: row.value,
            angle: if sum > 0.0 { row.value / sum * (2.0 * PI) } else { 0.0 },
            color: colors.and_then(|colors| colors.get(index).copied()),
        })
        .collect()
}
