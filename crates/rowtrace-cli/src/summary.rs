use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rowtrace_model::Subject;

use crate::config::StepConfig;
use crate::report::RunReport;

pub fn print_report(report: &RunReport, lineage_rows: usize) {
    println!(
        "Run {}: {} steps, {} rows in, {} rows out",
        report.state,
        report.steps.len(),
        report.input_rows,
        report
            .output_rows
            .map_or_else(|| "-".to_string(), |rows| rows.to_string()),
    );
    println!("{}", steps_table(report));
    if report.has_errors() {
        let global = report.errors.len() - report.row_error_count();
        println!(
            "{} row errors, {} step failures",
            report.row_error_count(),
            global
        );
    }
    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        println!("{}", errors_table(report));
    }
    if !report.removed.is_empty() {
        println!();
        println!("Removed rows:");
        println!("{}", removed_table(report));
    }
    if !report.lineage.is_empty() && lineage_rows > 0 {
        println!();
        println!("Lineage:");
        println!("{}", lineage_table(report, lineage_rows));
        let hidden = report.lineage.len().saturating_sub(lineage_rows);
        if hidden > 0 {
            println!("... {hidden} more rows");
        }
    }
    if let Some(failure) = &report.failure {
        eprintln!("error: {failure}");
    }
}

/// One row per logged transformation, plus a total.
pub fn steps_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Transformation"),
        header_cell("Rows"),
        header_cell("Input rows"),
        header_cell("New ids"),
        header_cell("Seconds"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total_secs = 0.0;
    for log in &report.logs {
        total_secs += log.duration_secs;
        let detail = |key: &str| log.details.get(key).and_then(serde_json::Value::as_u64);
        table.add_row(vec![
            Cell::new(&log.transformation)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            optional_cell(detail("row_count")),
            optional_cell(detail("input_rows")),
            optional_cell(detail("new_row_ids")),
            Cell::new(format!("{:.3}", log.duration_secs)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        optional_cell(report.output_rows.map(|rows| rows as u64)),
        Cell::new(report.input_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(format!("{total_secs:.3}")).add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn errors_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Transformation"),
        header_cell("Error"),
    ]);
    apply_table_style(&mut table);
    for record in &report.errors {
        let subject = match &record.subject {
            Subject::Global => Cell::new(record.subject.as_str())
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
            Subject::Row(row_id) => Cell::new(row_id),
        };
        table.add_row(vec![
            subject,
            Cell::new(&record.transformation),
            Cell::new(&record.error).fg(Color::Red),
        ]);
    }
    table
}

pub fn removed_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Transformation"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    for removed in &report.removed {
        table.add_row(vec![
            Cell::new(&removed.row_id),
            Cell::new(&removed.transformation),
            Cell::new(&removed.reason).fg(Color::Yellow),
        ]);
    }
    table
}

/// Lineage of at most `limit` rows, ordered by identifier.
pub fn lineage_table(report: &RunReport, limit: usize) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Row"), header_cell("Lineage")]);
    apply_table_style(&mut table);
    for (row_id, history) in report.lineage.iter().take(limit) {
        let lineage = if history.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(history.join(" -> "))
        };
        table.add_row(vec![Cell::new(row_id), lineage]);
    }
    table
}

pub fn steps_help_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Kind"), header_cell("Description")]);
    apply_table_style(&mut table);
    for (kind, description) in StepConfig::kinds() {
        table.add_row(vec![
            Cell::new(kind)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(description),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn optional_cell(value: Option<u64>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
