use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use polars::prelude::{AnyValue, DataFrame};
use tabalign_model::{Plan, TableId};

use crate::types::{ResultSummary, RunSummary};

pub fn print_summary(summary: &RunSummary) {
    println!("Schema: {}", summary.schema.join(", "));
    println!("{}", match_table(summary));
    print_plan(summary);
    if let Some(outcome) = &summary.outcome {
        print_outcome(outcome);
    }
}

fn match_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Schema column"),
        header_cell("Table"),
        header_cell("Source column"),
        header_cell("Score"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for column_match in &summary.report.matches {
        let row = match &column_match.source {
            Some(source) => vec![
                Cell::new(&column_match.schema_column).add_attribute(Attribute::Bold),
                Cell::new(table_name(summary, source.table)),
                Cell::new(&source.column),
                score_cell(source.score),
            ],
            None => vec![
                Cell::new(&column_match.schema_column).add_attribute(Attribute::Bold),
                dim_cell("-"),
                Cell::new("no match").fg(Color::Red),
                dim_cell("-"),
            ],
        };
        table.add_row(row);
    }
    table
}

fn print_plan(summary: &RunSummary) {
    match &summary.plan {
        Plan::Single(table) => {
            println!("Plan: single table {}", table_name(summary, *table));
        }
        Plan::Join(join) => {
            println!("Plan: join {} tables", join.table_count());
            let mut table = Table::new();
            table.set_header(vec![
                header_cell("Left"),
                header_cell("Right"),
                header_cell("Key candidates"),
            ]);
            apply_table_style(&mut table);
            for edge in join.edges() {
                let candidates = edge
                    .candidates
                    .iter()
                    .map(|c| format!("{} = {} ({:.3})", c.left_column, c.right_column, c.score))
                    .collect::<Vec<_>>()
                    .join("\n");
                table.add_row(vec![
                    Cell::new(join.name(edge.left)),
                    Cell::new(join.name(edge.right)),
                    Cell::new(candidates),
                ]);
            }
            println!("{table}");
        }
    }
}

fn print_outcome(outcome: &ResultSummary) {
    println!("Rows: {}", outcome.rows);
    if outcome.preview.height() > 0 {
        println!("{}", preview_table(&outcome.preview));
    }
    if let Some(path) = &outcome.output {
        println!("Output: {}", path.display());
    }
}

fn preview_table(df: &DataFrame) -> Table {
    let mut table = Table::new();
    table.set_header(
        df.get_column_names()
            .into_iter()
            .map(|name| header_cell(name.as_str()))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for row in 0..df.height() {
        let cells = df
            .get_columns()
            .iter()
            .map(|column| match column.get(row) {
                Ok(AnyValue::Null) | Err(_) => dim_cell("null"),
                Ok(value) => Cell::new(value.str_value()),
            })
            .collect::<Vec<_>>();
        table.add_row(cells);
    }
    table
}

fn table_name(summary: &RunSummary, table: TableId) -> String {
    summary.report.table_name(table)
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

fn score_cell(score: f64) -> Cell {
    let cell = Cell::new(format!("{score:.3}"));
    if score >= 0.9 {
        cell.fg(Color::Green)
    } else if score >= 0.5 {
        cell
    } else {
        cell.fg(Color::Yellow)
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
