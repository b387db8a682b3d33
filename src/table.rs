//! Plain-text tables for terminal diagnostics.

use std::fmt::Write as _;

const CELL_LIMIT: usize = 60;

pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();
    let clipped = rows
        .iter()
        .map(|row| row.iter().map(|cell| clip(cell)).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    for row in &clipped {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_line(&header_cells, &widths));
    let rule = widths.iter().map(|w| "-".repeat((*w).max(1))).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_line(&rule, &widths));
    for row in &clipped {
        let _ = writeln!(output, "{}", format_line(row, &widths));
    }
    output
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

/// Flattens control characters and shortens long cells such as JSON blobs.
fn clip(cell: &str) -> String {
    let flat = cell.replace(['\n', '\r', '\t'], " ");
    if flat.chars().count() <= CELL_LIMIT {
        return flat;
    }
    let mut short = flat.chars().take(CELL_LIMIT - 3).collect::<String>();
    short.push_str("...");
    short
}
