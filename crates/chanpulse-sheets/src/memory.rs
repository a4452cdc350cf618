//! In-process spreadsheet store.
//!
//! Test double for the pipeline. Behaves like a real sheet where it matters:
//! 1-indexed addressing, rows pushed down on insert, grids grown on
//! out-of-bounds writes.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::{SheetStore, SheetsError};

type Grid = Vec<Vec<String>>;

/// Worksheets keyed by `(spreadsheet id, sheet title)`.
#[derive(Default)]
pub struct MemorySheets {
    sheets: Mutex<HashMap<(String, String), Grid>>,
}

impl MemorySheets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a worksheet's contents wholesale (test setup).
    pub fn seed(&self, spreadsheet_id: &str, sheet: &str, rows: &[&[&str]]) {
        let grid = rows
            .iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect();
        self.sheets
            .lock()
            .expect("sheet store lock poisoned")
            .insert(key(spreadsheet_id, sheet), grid);
    }

    /// Current contents of a worksheet (empty if it was never written).
    #[must_use]
    pub fn snapshot(&self, spreadsheet_id: &str, sheet: &str) -> Grid {
        self.sheets
            .lock()
            .expect("sheet store lock poisoned")
            .get(&key(spreadsheet_id, sheet))
            .cloned()
            .unwrap_or_default()
    }

    /// One cell, 1-indexed; empty string when out of bounds.
    #[must_use]
    pub fn cell(&self, spreadsheet_id: &str, sheet: &str, row: usize, col: usize) -> String {
        self.snapshot(spreadsheet_id, sheet)
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .cloned()
            .unwrap_or_default()
    }
}

fn key(spreadsheet_id: &str, sheet: &str) -> (String, String) {
    (spreadsheet_id.to_string(), sheet.to_string())
}

fn grow_to(grid: &mut Grid, rows: usize, cols: usize) {
    if grid.len() < rows {
        grid.resize(rows, Vec::new());
    }
    if cols > 0 {
        for row in grid.iter_mut().take(rows) {
            if row.len() < cols {
                row.resize(cols, String::new());
            }
        }
    }
}

impl SheetStore for MemorySheets {
    async fn read_all(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        Ok(self.snapshot(spreadsheet_id, sheet))
    }

    async fn update_rows(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        start_row: usize,
        rows: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        let mut sheets = self.sheets.lock().expect("sheet store lock poisoned");
        let grid = sheets.entry(key(spreadsheet_id, sheet)).or_default();
        grow_to(grid, start_row - 1 + rows.len(), 0);
        for (offset, row) in rows.iter().enumerate() {
            grid[start_row - 1 + offset] = row.clone();
        }
        Ok(())
    }

    async fn update_cell(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), SheetsError> {
        let mut sheets = self.sheets.lock().expect("sheet store lock poisoned");
        let grid = sheets.entry(key(spreadsheet_id, sheet)).or_default();
        grow_to(grid, row, col);
        grid[row - 1][col - 1] = value.to_string();
        Ok(())
    }

    async fn insert_rows_at(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        at_row: usize,
        rows: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        let mut sheets = self.sheets.lock().expect("sheet store lock poisoned");
        let grid = sheets.entry(key(spreadsheet_id, sheet)).or_default();
        grow_to(grid, at_row - 1, 0);
        for (offset, row) in rows.iter().enumerate() {
            grid.insert(at_row - 1 + offset, row.clone());
        }
        Ok(())
    }

    async fn clear(&self, spreadsheet_id: &str, sheet: &str) -> Result<(), SheetsError> {
        let mut sheets = self.sheets.lock().expect("sheet store lock poisoned");
        sheets.insert(key(spreadsheet_id, sheet), Vec::new());
        Ok(())
    }

    async fn ensure_columns(
        &self,
        _spreadsheet_id: &str,
        _sheet: &str,
        _min_cols: usize,
    ) -> Result<(), SheetsError> {
        // Rows grow on write; there is no fixed column count to extend.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_cell_grows_grid() {
        let store = MemorySheets::new();
        store.update_cell("s", "Main", 3, 4, "x").await.unwrap();
        assert_eq!(store.cell("s", "Main", 3, 4), "x");
        assert_eq!(store.cell("s", "Main", 1, 1), "");
        assert_eq!(store.snapshot("s", "Main").len(), 3);
    }

    #[tokio::test]
    async fn insert_rows_pushes_existing_rows_down() {
        let store = MemorySheets::new();
        store.seed("s", "Log", &[&["header"], &["old"]]);
        store
            .insert_rows_at("s", "Log", 2, &[vec!["new".to_string()]])
            .await
            .unwrap();
        let grid = store.snapshot("s", "Log");
        assert_eq!(grid[0][0], "header");
        assert_eq!(grid[1][0], "new");
        assert_eq!(grid[2][0], "old");
    }

    #[tokio::test]
    async fn repeated_inserts_keep_newest_at_row_two() {
        let store = MemorySheets::new();
        store.seed("s", "Log", &[&["header"]]);
        for entry in ["first", "second", "third"] {
            store
                .insert_rows_at("s", "Log", 2, &[vec![entry.to_string()]])
                .await
                .unwrap();
        }
        let grid = store.snapshot("s", "Log");
        assert_eq!(grid[1][0], "third", "row 2 must hold the newest entry");
        assert_eq!(grid[3][0], "first", "row N+1 must hold the oldest entry");
    }

    #[tokio::test]
    async fn clear_empties_the_sheet() {
        let store = MemorySheets::new();
        store.seed("s", "Каналы", &[&["link"], &["@channel"]]);
        store.clear("s", "Каналы").await.unwrap();
        assert!(store.snapshot("s", "Каналы").is_empty());
    }

    #[tokio::test]
    async fn update_rows_overwrites_block() {
        let store = MemorySheets::new();
        store.seed("s", "Main", &[&["h"], &["a"], &["b"]]);
        store
            .update_rows(
                "s",
                "Main",
                2,
                &[vec!["x".to_string()], vec!["y".to_string()]],
            )
            .await
            .unwrap();
        let grid = store.snapshot("s", "Main");
        assert_eq!(grid[1][0], "x");
        assert_eq!(grid[2][0], "y");
    }
}
