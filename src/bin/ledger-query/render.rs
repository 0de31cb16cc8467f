use std::fmt::Write;

use ledger_sql::ResultSet;

const NULL_MARKER: &str = "NULL";

/// Render `result` as a psql-style aligned table followed by the row summary.
///
/// Statements without columns render only the affected-row count.
pub(crate) fn render(result: &ResultSet) -> String {
    let mut out = String::new();
    let columns = result.column_count();
    if columns == 0 {
        let _ = writeln!(out, "({} rows affected)", result.rows_affected());
        return out;
    }

    let cell = |row: usize, col: usize| {
        if result.is_null(row, col) {
            NULL_MARKER
        } else {
            result.value(row, col)
        }
    };

    let mut widths: Vec<usize> = (0..columns)
        .map(|col| result.column_name(col).chars().count())
        .collect();
    for row in 0..result.row_count() {
        for (col, width) in widths.iter_mut().enumerate() {
            *width = (*width).max(cell(row, col).chars().count());
        }
    }

    let header: Vec<String> = (0..columns)
        .map(|col| format!("{:<w$}", result.column_name(col), w = widths[col]))
        .collect();
    let _ = writeln!(out, " {} ", header.join(" | "));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "-{}-", rule.join("-+-"));

    for row in 0..result.row_count() {
        let cells: Vec<String> = (0..columns)
            .map(|col| format!("{:<w$}", cell(row, col), w = widths[col]))
            .collect();
        let _ = writeln!(out, " {} ", cells.join(" | "));
    }

    let noun = if result.row_count() == 1 { "row" } else { "rows" };
    let _ = writeln!(out, "({} {noun})", result.row_count());
    out
}
