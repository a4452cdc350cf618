use crate::SheetsError;

/// Worksheet read/write primitives used by the pipeline.
///
/// All row and column numbers are 1-indexed, matching sheet semantics; row 1
/// is the header row. Implementations are free to grow a sheet when a write
/// lands outside its current bounds.
#[allow(async_fn_in_trait)]
pub trait SheetStore {
    /// Read every populated row of a worksheet. Trailing empty cells may be
    /// omitted per row, exactly as the Sheets API returns them.
    async fn read_all(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Overwrite a block of rows starting at `start_row`.
    async fn update_rows(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        start_row: usize,
        rows: &[Vec<String>],
    ) -> Result<(), SheetsError>;

    /// Overwrite a single cell.
    async fn update_cell(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), SheetsError>;

    /// Insert `rows` at `at_row`, pushing existing rows down.
    ///
    /// `insert_rows_at(.., 2, ..)` is the audit-log append: the newest entry
    /// lands directly under the header and prior entries shift toward the
    /// bottom.
    async fn insert_rows_at(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        at_row: usize,
        rows: &[Vec<String>],
    ) -> Result<(), SheetsError>;

    /// Remove every value from a worksheet, leaving its dimensions intact.
    async fn clear(&self, spreadsheet_id: &str, sheet: &str) -> Result<(), SheetsError>;

    /// Grow the worksheet to at least `min_cols` columns.
    async fn ensure_columns(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        min_cols: usize,
    ) -> Result<(), SheetsError>;
}
