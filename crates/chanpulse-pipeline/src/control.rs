//! Control-table schema and tenant row parsing.
//!
//! The control sheet is the tenant registry: one row per client, a header in
//! row 1. Column positions are resolved once per run into a [`ControlSchema`]
//! instead of re-scanning header text on every access.

use chanpulse_sheets::{SheetStore, SheetsError};

use crate::error::PipelineError;

/// Persistent scheduler status driven by the orchestrator.
///
/// `Start` marks a freshly onboarded tenant (wide lookback window); the first
/// successful run moves it to `In progress` (rolling window). Anything else
/// parks the row outside the scheduler entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerStatus {
    Start,
    InProgress,
    Other(String),
}

impl SchedulerStatus {
    #[must_use]
    pub fn parse(cell: &str) -> Self {
        match cell.trim() {
            "Start" => Self::Start,
            "In progress" => Self::InProgress,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_cell(&self) -> &str {
        match self {
            Self::Start => "Start",
            Self::InProgress => "In progress",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Rows outside {Start, In progress} are never selected.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Start | Self::InProgress)
    }
}

/// Run-local processing marker, distinct from [`SchedulerStatus`].
///
/// Lifecycle within one run: blank → waiting → running → done/error. Done
/// rows are wiped back to blank in cleanup; error rows stay marked for the
/// operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processing {
    Blank,
    Waiting,
    Running,
    Done,
    Error,
}

impl Processing {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Blank => "",
            Self::Waiting => "ожидание",
            Self::Running => "выполняется",
            Self::Done => "готово",
            Self::Error => "ошибка",
        }
    }

    #[must_use]
    pub fn parse(cell: &str) -> Self {
        match cell.trim() {
            "ожидание" => Self::Waiting,
            "выполняется" => Self::Running,
            "готово" => Self::Done,
            "ошибка" => Self::Error,
            _ => Self::Blank,
        }
    }
}

/// Column positions (0-indexed into a row) resolved from the header once.
#[derive(Debug, Clone, Copy)]
pub struct ControlSchema {
    pub id: usize,
    pub name: usize,
    pub url: usize,
    pub status: usize,
    pub processing: usize,
}

impl ControlSchema {
    /// Resolve the five named columns, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingColumn`] naming the first absent
    /// column.
    pub fn from_header(sheet: &str, header: &[String]) -> Result<Self, PipelineError> {
        let find = |column: &'static str| -> Result<usize, PipelineError> {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
                .ok_or_else(|| PipelineError::MissingColumn {
                    sheet: sheet.to_string(),
                    column,
                })
        };
        Ok(Self {
            id: find("id")?,
            name: find("name")?,
            url: find("url")?,
            status: find("scheduler status")?,
            processing: find("processing")?,
        })
    }
}

/// A control row that passed phase-1 validation.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// 1-indexed sheet row, kept for per-cell updates.
    pub row_number: usize,
    pub id: i64,
    pub name: String,
    pub url: String,
    pub status: SchedulerStatus,
}

/// Why a status-eligible row was rejected in phase 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDefect {
    /// The id cell is empty, non-numeric, or not positive.
    BadId(String),
    /// The name or url cell is empty.
    MissingField(&'static str),
}

impl RowDefect {
    /// Operator-facing audit message for the defect.
    #[must_use]
    pub fn audit_message(&self) -> String {
        match self {
            Self::BadId(raw) => format!("Ошибка в таблице клиентов: некорректный id «{raw}»"),
            Self::MissingField(field) => {
                format!("Ошибка в таблице клиентов: не заполнено поле «{field}»")
            }
        }
    }
}

/// Validate one status-eligible control row into a [`Candidate`].
///
/// # Errors
///
/// Returns the [`RowDefect`] that excludes the row from phase 2.
pub fn validate_row(
    schema: ControlSchema,
    row_number: usize,
    cells: &[String],
    status: SchedulerStatus,
) -> Result<Candidate, RowDefect> {
    let cell = |idx: usize| cells.get(idx).map(String::as_str).unwrap_or("").trim();

    let raw_id = cell(schema.id);
    let id: i64 = raw_id
        .parse()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| RowDefect::BadId(raw_id.to_string()))?;

    let name = cell(schema.name);
    if name.is_empty() {
        return Err(RowDefect::MissingField("name"));
    }
    let url = cell(schema.url);
    if url.is_empty() {
        return Err(RowDefect::MissingField("url"));
    }

    Ok(Candidate {
        row_number,
        id,
        name: name.to_string(),
        url: url.to_string(),
        status,
    })
}

/// Handle on the control worksheet with the schema already resolved.
pub struct ControlTable<'a, S: SheetStore> {
    store: &'a S,
    spreadsheet_id: &'a str,
    sheet: &'a str,
    pub schema: ControlSchema,
}

impl<'a, S: SheetStore> ControlTable<'a, S> {
    /// Read the control sheet and resolve its schema.
    ///
    /// Returns the handle plus all raw rows (header included).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingColumn`] on a bad header and any
    /// [`SheetsError`] from the read.
    pub async fn load(
        store: &'a S,
        spreadsheet_id: &'a str,
        sheet: &'a str,
    ) -> Result<(Self, Vec<Vec<String>>), PipelineError> {
        let rows = store.read_all(spreadsheet_id, sheet).await?;
        let header = rows.first().cloned().unwrap_or_default();
        let schema = ControlSchema::from_header(sheet, &header)?;
        Ok((
            Self {
                store,
                spreadsheet_id,
                sheet,
                schema,
            },
            rows,
        ))
    }

    /// Overwrite one row's processing marker.
    ///
    /// # Errors
    ///
    /// Propagates the [`SheetsError`] from the cell update.
    pub async fn set_processing(
        &self,
        row_number: usize,
        marker: Processing,
    ) -> Result<(), SheetsError> {
        self.store
            .update_cell(
                self.spreadsheet_id,
                self.sheet,
                row_number,
                self.schema.processing + 1,
                marker.label(),
            )
            .await
    }

    /// Overwrite one row's scheduler status.
    ///
    /// # Errors
    ///
    /// Propagates the [`SheetsError`] from the cell update.
    pub async fn set_status(
        &self,
        row_number: usize,
        status: &SchedulerStatus,
    ) -> Result<(), SheetsError> {
        self.store
            .update_cell(
                self.spreadsheet_id,
                self.sheet,
                row_number,
                self.schema.status + 1,
                status.as_cell(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        ["id", "Name", "URL", "Scheduler status", "Processing"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn schema() -> ControlSchema {
        ControlSchema::from_header("Main", &header()).unwrap()
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn schema_resolves_columns_case_insensitively() {
        let s = schema();
        assert_eq!(s.id, 0);
        assert_eq!(s.name, 1);
        assert_eq!(s.url, 2);
        assert_eq!(s.status, 3);
        assert_eq!(s.processing, 4);
    }

    #[test]
    fn schema_reports_first_missing_column() {
        let header: Vec<String> = ["id", "name"].into_iter().map(str::to_string).collect();
        let result = ControlSchema::from_header("Main", &header);
        assert!(
            matches!(result, Err(PipelineError::MissingColumn { ref column, .. }) if *column == "url"),
            "expected MissingColumn(url), got: {result:?}"
        );
    }

    #[test]
    fn scheduler_status_parses_known_values() {
        assert_eq!(SchedulerStatus::parse("Start"), SchedulerStatus::Start);
        assert_eq!(
            SchedulerStatus::parse(" In progress "),
            SchedulerStatus::InProgress
        );
        assert!(matches!(
            SchedulerStatus::parse("Paused"),
            SchedulerStatus::Other(_)
        ));
        assert!(!SchedulerStatus::parse("Paused").is_eligible());
        assert!(SchedulerStatus::parse("Start").is_eligible());
    }

    #[test]
    fn processing_labels_round_trip() {
        for marker in [
            Processing::Blank,
            Processing::Waiting,
            Processing::Running,
            Processing::Done,
            Processing::Error,
        ] {
            assert_eq!(Processing::parse(marker.label()), marker);
        }
    }

    #[test]
    fn validate_row_accepts_well_formed_row() {
        let candidate = validate_row(
            schema(),
            2,
            &cells(&["7", "Агрохолдинг", "https://docs.google.com/spreadsheets/d/x", "Start", ""]),
            SchedulerStatus::Start,
        )
        .unwrap();
        assert_eq!(candidate.id, 7);
        assert_eq!(candidate.name, "Агрохолдинг");
        assert_eq!(candidate.row_number, 2);
    }

    #[test]
    fn validate_row_rejects_non_numeric_id() {
        let result = validate_row(
            schema(),
            2,
            &cells(&["seven", "Имя", "url", "Start", ""]),
            SchedulerStatus::Start,
        );
        assert!(matches!(result, Err(RowDefect::BadId(ref raw)) if raw == "seven"));
    }

    #[test]
    fn validate_row_rejects_zero_and_negative_ids() {
        for bad in ["0", "-4"] {
            let result = validate_row(
                schema(),
                2,
                &cells(&[bad, "Имя", "url", "Start", ""]),
                SchedulerStatus::Start,
            );
            assert!(matches!(result, Err(RowDefect::BadId(_))), "id {bad} must be rejected");
        }
    }

    #[test]
    fn validate_row_rejects_missing_name_and_url() {
        let no_name = validate_row(
            schema(),
            2,
            &cells(&["1", " ", "url", "Start", ""]),
            SchedulerStatus::Start,
        );
        assert!(matches!(no_name, Err(RowDefect::MissingField("name"))));

        let no_url = validate_row(
            schema(),
            2,
            &cells(&["1", "Имя", "", "Start", ""]),
            SchedulerStatus::Start,
        );
        assert!(matches!(no_url, Err(RowDefect::MissingField("url"))));
    }

    #[test]
    fn validate_row_tolerates_short_rows() {
        // A row may omit trailing cells entirely.
        let result = validate_row(
            schema(),
            3,
            &cells(&["5"]),
            SchedulerStatus::InProgress,
        );
        assert!(matches!(result, Err(RowDefect::MissingField("name"))));
    }
}
