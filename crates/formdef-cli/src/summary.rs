//! Compilation summary output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use formdef_model::DiagnosticLevel;

use crate::commands::FileSummary;

/// Print the per-form summary table and any diagnostics.
pub fn print_summary(summaries: &[FileSummary]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Form"),
        header_cell("Title"),
        header_cell("Sections"),
        header_cell("Questions"),
        header_cell("Output"),
        header_cell("Warnings"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);

    for summary in summaries {
        let warnings = summary.diagnostics.warning_count();
        for form in &summary.forms {
            table.add_row(vec![
                Cell::new(&form.name),
                Cell::new(&form.title),
                Cell::new(form.sections),
                Cell::new(form.questions),
                match &form.output {
                    Some(path) => Cell::new(path.display()),
                    None => Cell::new("(dry run)").fg(Color::DarkGrey),
                },
                count_cell(warnings),
            ]);
        }
    }
    println!("{table}");

    for summary in summaries {
        if summary.diagnostics.is_empty() {
            continue;
        }
        eprintln!("{}:", summary.input.display());
        for diagnostic in summary.diagnostics.iter() {
            let prefix = match diagnostic.level {
                DiagnosticLevel::Error => "error",
                DiagnosticLevel::Warning => "warning",
                DiagnosticLevel::Info => "note",
            };
            eprintln!("  {prefix}: {diagnostic}");
        }
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize) -> Cell {
    if count == 0 {
        Cell::new(count).fg(Color::Green)
    } else {
        Cell::new(count).fg(Color::Yellow)
    }
}
