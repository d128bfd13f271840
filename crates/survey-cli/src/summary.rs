use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use survey_common::format_numeric;
use survey_model::{NormalizationStats, ScaleSummary};
use survey_cli::pipeline::PipelineResult;

pub fn print_summary(result: &PipelineResult) {
    let manifest = &result.manifest;
    println!("Input: {}", manifest.input.display());
    if let Some(survey) = &manifest.survey {
        println!("Survey: {survey}");
    }
    println!("Manifest: {}", result.manifest_path.display());

    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Input responses"), Cell::new(manifest.input_rows)]);
    table.add_row(vec![Cell::new("Long table"), Cell::new(manifest.output_rows)]);
    table.add_row(vec![Cell::new("Persons"), Cell::new(manifest.persons)]);
    table.add_row(vec![Cell::new("Questions"), Cell::new(manifest.questions)]);
    println!("{table}");

    print_normalization_table(&result.stats);

    let mut outputs = Table::new();
    outputs.set_header(vec![header_cell("Output"), header_cell("Path")]);
    apply_summary_table_style(&mut outputs);
    let paths = &manifest.outputs;
    outputs.add_row(vec![Cell::new("Numeric wide"), path_cell(paths.pivot_numeric.as_deref())]);
    outputs.add_row(vec![Cell::new("Text wide"), path_cell(paths.pivot_text.as_deref())]);
    outputs.add_row(vec![Cell::new("Codebook"), path_cell(paths.codebook.as_deref())]);
    outputs.add_row(vec![Cell::new("Long table"), path_cell(paths.normalized.as_deref())]);
    println!("{outputs}");
}

pub fn print_normalization_table(stats: &NormalizationStats) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Resolved by"), header_cell("Records")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Sentinel table"), Cell::new(stats.sentinel)]);
    table.add_row(vec![Cell::new("Reference key"), Cell::new(stats.reference)]);
    table.add_row(vec![Cell::new("Raw digits"), Cell::new(stats.numeric_fallback)]);
    table.add_row(vec![
        Cell::new("Unmapped"),
        count_cell(stats.unmapped, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(stats.records).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_scale_summary(summary: &ScaleSummary) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Score"),
        header_cell("Min"),
        header_cell("Max"),
        header_cell("Scored"),
        header_cell("Missing"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(&summary.score_name)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        value_cell(summary.min),
        value_cell(summary.max),
        Cell::new(summary.scored),
        count_cell(summary.missing, Color::Yellow),
    ]);
    println!("{table}");
}

pub fn print_surveys(surveys: &[String]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Survey")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, survey) in surveys.iter().enumerate() {
        table.add_row(vec![dim_cell(index + 1), Cell::new(survey)]);
    }
    println!("{table}");
}

pub fn apply_summary_table_style(table: &mut Table) {
    table.load_preset(UTF8_FULL_CONDENSED);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn value_cell(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::new(format_numeric(value)),
        None => dim_cell("-"),
    }
}

fn path_cell(path: Option<&Path>) -> Cell {
    match path {
        Some(path) => Cell::new(path.display()).fg(Color::Green),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
