//! Per-file outcome table printed with --report

use prettytable::{format, Cell, Row, Table};

use crate::image_processing::{FileOutcome, StageOutcome};
use crate::reporter::skip_reason_text;
use crate::utils::{display_name, format_duration};

/// Build the table for one stage: header row plus one row per file
pub fn build_table(outcome: &StageOutcome) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);

    table.add_row(Row::new(vec![
        Cell::new("Input"),
        Cell::new("Output"),
        Cell::new("Mode"),
        Cell::new("Size"),
        Cell::new("Status"),
        Cell::new("Time"),
    ]));

    for result in &outcome.results {
        let input = display_name(&result.input_path);
        let time = format_duration(result.processing_time);

        let cells = match &result.outcome {
            Ok(FileOutcome::Converted {
                output_path,
                color_mode,
                dimensions,
            }) => vec![
                Cell::new(&input),
                Cell::new(&display_name(output_path)),
                Cell::new(&color_mode.to_string()),
                Cell::new(&format!("{}x{}", dimensions.0, dimensions.1)),
                Cell::new("ok"),
                Cell::new(&time),
            ],
            Ok(FileOutcome::Skipped {
                output_path,
                reason,
            }) => vec![
                Cell::new(&input),
                Cell::new(&display_name(output_path)),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(&format!("skipped: {}", skip_reason_text(reason))),
                Cell::new(&time),
            ],
            Err(e) => vec![
                Cell::new(&input),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(&format!("failed: {}", e)),
                Cell::new(&time),
            ],
        };
        table.add_row(Row::new(cells));
    }

    table
}

pub fn print_stage_report(outcome: &StageOutcome) {
    if outcome.results.is_empty() {
        return;
    }

    println!(
        "{} pass: {} file(s)\n",
        outcome.summary.stage,
        outcome.results.len()
    );
    build_table(outcome).printstd();
    println!();
}
