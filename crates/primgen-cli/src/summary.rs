use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use primgen_resolve::{Decisions, ResolutionReport};

pub fn print_report(report: &ResolutionReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Instantiation"),
        header_cell("Enabled"),
        header_cell("Disabled"),
        header_cell("Nodes"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let mut total_enabled = 0usize;
    let mut total_nodes = 0usize;
    for decisions in &report.decisions {
        let enabled = decisions.enabled_count();
        total_enabled += enabled;
        total_nodes += decisions.total();
        table.add_row(vec![
            Cell::new(&decisions.instantiation)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            count_cell(enabled, Color::Green),
            count_cell(decisions.total() - enabled, Color::Yellow),
            Cell::new(decisions.total()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        count_cell(total_enabled, Color::Green).add_attribute(Attribute::Bold),
        count_cell(total_nodes - total_enabled, Color::Yellow).add_attribute(Attribute::Bold),
        Cell::new(total_nodes).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    print_diagnostics(&report.diagnostics);
}

/// Per-node decisions of one instantiation.
pub fn print_decisions(decisions: &Decisions) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Node"), header_cell(&decisions.instantiation)]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for (path, enabled) in &decisions.enabled {
        table.add_row(vec![Cell::new(path), decision_cell(*enabled)]);
    }
    println!("{table}");
}

pub fn print_diagnostics(diagnostics: &[String]) {
    if diagnostics.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Conflict")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, message) in diagnostics.iter().enumerate() {
        table.add_row(vec![dim_cell(index + 1), Cell::new(message).fg(Color::Red)]);
    }
    println!();
    println!("Conflicts:");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn decision_cell(enabled: bool) -> Cell {
    if enabled {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
