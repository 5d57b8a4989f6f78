//! Human-readable reports
//!
//! Deviation blocks per file and a per-tag summary, rendered with
//! `prettytable`. Undefined values are shown as `N/A`.

use prettytable::format::consts::FORMAT_BOX_CHARS;
use prettytable::{Cell, Row, Table};

use crate::core::styles::StyleRole;
use crate::detector::deviation::Deviation;
use crate::pipeline::HistoryRun;

pub const NOT_AVAILABLE: &str = "N/A";
const NO_DEVIATIONS: &str = "No significant deviations found.";

/// 4 decimals, `N/A` for undefined or non-finite values
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.4}", v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn cell(text: impl AsRef<str>, role: StyleRole, color: bool) -> Cell {
    Cell::new(text.as_ref()).style_spec(role.table_spec(color))
}

fn header_row(titles: &[&str], color: bool) -> Row {
    Row::new(
        titles
            .iter()
            .map(|t| cell(t, StyleRole::Header, color))
            .collect(),
    )
}

/// Deviations grouped into one table per file, in report order
pub fn deviation_tables(deviations: &[Deviation], color: bool) -> Vec<(String, Table)> {
    let mut tables = Vec::new();
    let mut start = 0;
    while start < deviations.len() {
        let file = &deviations[start].file_path;
        let end = deviations[start..]
            .iter()
            .position(|d| &d.file_path != file)
            .map_or(deviations.len(), |n| start + n);
        tables.push((file.clone(), file_table(&deviations[start..end], color)));
        start = end;
    }
    tables
}

/// Plain-text deviation report
pub fn render_deviations(deviations: &[Deviation]) -> String {
    if deviations.is_empty() {
        return format!("{}\n", NO_DEVIATIONS);
    }
    let mut out = String::new();
    for (file, table) in deviation_tables(deviations, false) {
        out.push_str(&file);
        out.push('\n');
        out.push_str(&table.to_string());
        out.push('\n');
    }
    out
}

/// Write the deviation report to stdout, coloured when `color` is set
pub fn print_deviations(deviations: &[Deviation], color: bool) {
    if deviations.is_empty() {
        println!("{}", NO_DEVIATIONS);
        return;
    }
    for (file, table) in deviation_tables(deviations, color) {
        println!("{}", StyleRole::FilePath.paint(&file, color));
        if let Err(e) = table.print_tty(color) {
            log::debug!("Falling back to plain table output: {}", e);
            print!("{}", table);
        }
    }
}

fn file_table(deviations: &[Deviation], color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_BOX_CHARS);
    table.set_titles(header_row(
        &[
            "Tags",
            "Metric",
            "Previous",
            "Current",
            "Difference",
            "Mean prior",
            "From mean",
        ],
        color,
    ));

    for d in deviations {
        let tags = format!("{} -> {}", d.previous_tag, d.current_tag);
        table.add_row(Row::new(vec![
            cell(&tags, StyleRole::Value, color),
            cell(&d.metric, StyleRole::Value, color),
            cell(format_value(Some(d.previous_value)), StyleRole::Value, color),
            cell(format_value(Some(d.current_value)), StyleRole::Value, color),
            cell(
                format_value(Some(d.deviation_from_previous)),
                StyleRole::Flagged,
                color,
            ),
            cell(format_value(Some(d.mean_prior)), StyleRole::Value, color),
            cell(
                format_value(Some(d.deviation_from_mean)),
                StyleRole::Flagged,
                color,
            ),
        ]));

        if let Some(context) = &d.context {
            let missing = cell(NOT_AVAILABLE, StyleRole::Missing, color);
            table.add_row(Row::new(vec![
                cell("", StyleRole::Value, color),
                cell(&context.metric, StyleRole::Missing, color),
                cell(format_value(context.previous), StyleRole::Value, color),
                cell(format_value(context.current), StyleRole::Value, color),
                cell(format_value(context.difference()), StyleRole::Value, color),
                missing.clone(),
                missing,
            ]));
        }
    }
    table
}

/// Per-tag counts of a run, skipped tags listed last
pub fn summary_table(run: &HistoryRun, color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_BOX_CHARS);
    table.set_titles(header_row(
        &["Tag", "Files", "Failed", "Anomalies", "High conf.", "Time"],
        color,
    ));

    for result in &run.results {
        table.add_row(Row::new(vec![
            cell(&result.tag_name, StyleRole::Value, color),
            cell(result.files_analyzed.to_string(), StyleRole::Value, color),
            cell(
                result.files_failed.to_string(),
                if result.files_failed > 0 {
                    StyleRole::Invalid
                } else {
                    StyleRole::Value
                },
                color,
            ),
            cell(result.total_anomalies.to_string(), StyleRole::Value, color),
            cell(
                result.high_confidence_anomalies.to_string(),
                StyleRole::Value,
                color,
            ),
            cell(
                format!("{:.2?}", result.processing_time),
                StyleRole::Missing,
                color,
            ),
        ]));
    }
    for skipped in &run.skipped {
        table.add_row(Row::new(vec![
            cell(&skipped.name, StyleRole::Invalid, color),
            cell(format!("skipped: {}", skipped.reason), StyleRole::Invalid, color),
        ]));
    }
    table
}

/// Write the per-tag summary to stdout
pub fn print_summary(run: &HistoryRun, color: bool) {
    let table = summary_table(run, color);
    if let Err(e) = table.print_tty(color) {
        log::debug!("Falling back to plain table output: {}", e);
        print!("{}", table);
    }
}
