//! Append-only audit log in the control spreadsheet.
//!
//! Entries are inserted at row 2 so the newest message sits directly under
//! the header and the sheet reads newest-first. Nothing is ever updated or
//! deleted.

use chrono::{SecondsFormat, Utc};

use chanpulse_sheets::{SheetStore, SheetsError};

const HEADER: [&str; 4] = ["ID", "Клиент", "Сообщение", "Время (UTC)"];

/// Writer for the audit worksheet.
pub struct AuditLog<'a, S: SheetStore> {
    store: &'a S,
    spreadsheet_id: &'a str,
    sheet: &'a str,
}

impl<'a, S: SheetStore> AuditLog<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, spreadsheet_id: &'a str, sheet: &'a str) -> Self {
        Self {
            store,
            spreadsheet_id,
            sheet,
        }
    }

    /// Write the header row if the sheet is empty.
    ///
    /// # Errors
    ///
    /// Propagates the [`SheetsError`] from the read or write.
    pub async fn ensure_header(&self) -> Result<(), SheetsError> {
        let rows = self.store.read_all(self.spreadsheet_id, self.sheet).await?;
        if rows.is_empty() {
            let header = HEADER.iter().map(|h| (*h).to_string()).collect();
            self.store
                .update_rows(self.spreadsheet_id, self.sheet, 1, &[header])
                .await?;
        }
        Ok(())
    }

    /// Insert one entry at the top of the log.
    ///
    /// # Errors
    ///
    /// Propagates the [`SheetsError`] from the insert.
    pub async fn record(
        &self,
        tenant_id: i64,
        tenant_name: &str,
        message: &str,
    ) -> Result<(), SheetsError> {
        let entry = vec![
            tenant_id.to_string(),
            tenant_name.to_string(),
            message.to_string(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        ];
        self.store
            .insert_rows_at(self.spreadsheet_id, self.sheet, 2, &[entry])
            .await
    }

    /// [`record`](Self::record), but a failing audit write only warns.
    ///
    /// The audit log is observability, not state: a logging failure must not
    /// change a tenant's outcome.
    pub async fn record_or_warn(&self, tenant_id: i64, tenant_name: &str, message: &str) {
        if let Err(e) = self.record(tenant_id, tenant_name, message).await {
            tracing::warn!(
                tenant_id,
                tenant = tenant_name,
                error = %e,
                "audit log write failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use chanpulse_sheets::MemorySheets;

    use super::*;

    #[tokio::test]
    async fn ensure_header_writes_header_once() {
        let store = MemorySheets::new();
        let log = AuditLog::new(&store, "control", "Log");
        log.ensure_header().await.unwrap();
        log.ensure_header().await.unwrap();
        let grid = store.snapshot("control", "Log");
        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0][0], "ID");
    }

    #[tokio::test]
    async fn record_inserts_newest_first() {
        let store = MemorySheets::new();
        let log = AuditLog::new(&store, "control", "Log");
        log.ensure_header().await.unwrap();
        log.record(1, "Ферма", "первое сообщение").await.unwrap();
        log.record(2, "Сад", "второе сообщение").await.unwrap();

        let grid = store.snapshot("control", "Log");
        assert_eq!(grid[1][2], "второе сообщение", "row 2 holds the newest entry");
        assert_eq!(grid[2][2], "первое сообщение");
        assert_eq!(grid[1][0], "2");
        assert_eq!(grid[1][1], "Сад");
    }

    #[tokio::test]
    async fn record_writes_rfc3339_timestamp() {
        let store = MemorySheets::new();
        let log = AuditLog::new(&store, "control", "Log");
        log.ensure_header().await.unwrap();
        log.record(1, "Ферма", "сообщение").await.unwrap();
        let stamp = store.cell("control", "Log", 2, 4);
        assert!(
            stamp.parse::<chrono::DateTime<chrono::Utc>>().is_ok(),
            "timestamp must be RFC 3339: {stamp}"
        );
    }
}
