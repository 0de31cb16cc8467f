use std::sync::Arc;

/// A row from a query result
///
/// Cells are text; `None` marks SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The cells for this row
    pub cells: Vec<Option<String>>,
}

impl TextRow {
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, cells: Vec<Option<String>>) -> Self {
        Self {
            column_names,
            cells,
        }
    }

    /// Get a cell by column index; NULL reads as `Some("")`.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&str> {
        self.cells
            .get(index)
            .map(|cell| cell.as_deref().unwrap_or(""))
    }

    /// Whether the cell at `index` is SQL NULL (`None` if the index is out of bounds).
    #[must_use]
    pub fn is_null(&self, index: usize) -> Option<bool> {
        self.cells.get(index).map(Option::is_none)
    }
}
