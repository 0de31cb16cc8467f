use std::sync::Arc;

use super::row::TextRow;

/// A result set from a statement
///
/// Rectangular table of text cells plus the affected-row count reported by the
/// server. A session replaces it wholesale on every statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    /// The rows returned by the statement
    pub results: Vec<TextRow>,
    /// Rows returned (SELECT) or touched (DML); 0 for utility statements
    pub rows_affected: u64,
    column_names: Arc<Vec<String>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            ..ResultSet::default()
        }
    }

    /// Set the column names for this result set (to be shared by all rows)
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_names = column_names;
    }

    /// Get the column names for this result set
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Add a row; its width must match the column names.
    ///
    /// # Panics
    /// Panics if `cells.len()` differs from the number of columns.
    pub fn add_row_cells(&mut self, cells: Vec<Option<String>>) {
        assert_eq!(
            cells.len(),
            self.column_names.len(),
            "row width does not match column count"
        );
        self.results
            .push(TextRow::new(Arc::clone(&self.column_names), cells));
    }

    pub fn set_rows_affected(&mut self, rows_affected: u64) {
        self.rows_affected = rows_affected;
    }

    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    /// Name of column `col`.
    ///
    /// # Panics
    /// Panics if `col >= column_count()`.
    #[must_use]
    pub fn column_name(&self, col: usize) -> &str {
        assert!(
            col < self.column_count(),
            "column {col} out of range for result with {} columns",
            self.column_count()
        );
        &self.column_names[col]
    }

    /// Text of cell (`row`, `col`); NULL reads as the empty string.
    ///
    /// # Panics
    /// Panics if `row >= row_count()` or `col >= column_count()`. Those are caller
    /// bugs, not data conditions, so no default value is returned.
    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> &str {
        self.cell(row, col).as_deref().unwrap_or("")
    }

    /// Whether cell (`row`, `col`) is SQL NULL.
    ///
    /// # Panics
    /// Same bounds rules as [`ResultSet::value`].
    #[must_use]
    pub fn is_null(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_none()
    }

    /// Non-panicking lookup.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.results.get(row).and_then(|r| r.get_by_index(col))
    }

    fn cell(&self, row: usize, col: usize) -> &Option<String> {
        assert!(
            row < self.row_count(),
            "row {row} out of range for result with {} rows",
            self.row_count()
        );
        assert!(
            col < self.column_count(),
            "column {col} out of range for result with {} columns",
            self.column_count()
        );
        &self.results[row].cells[col]
    }
}
