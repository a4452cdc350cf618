//! Channel resolution for one tenant.

use crate::context::RunContext;
use crate::control::Candidate;
use crate::error::PipelineError;
use crate::AuditLog;
use chanpulse_sheets::SheetStore;

/// Header of the channels sheet after a resolve pass.
pub const CHANNELS_HEADER: [&str; 4] = [
    "Название канала",
    "link",
    "ID",
    "Количество подписчиков",
];

/// A channel with provider metadata attached.
#[derive(Debug, Clone)]
pub struct ChannelRecord {
    pub title: String,
    pub link: String,
    pub id: i64,
    pub subscribers: i64,
}

impl ChannelRecord {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.link.clone(),
            self.id.to_string(),
            self.subscribers.to_string(),
        ]
    }
}

/// Resolve every channel entry in the tenant's channels sheet.
///
/// Reads the trimmed, non-empty values of the `link` column, asks the
/// analytics provider for metadata entry by entry, and overwrites the sheet
/// wholesale with the resolved records. A single entry's failure is audited
/// and skipped; the rest of the entries continue.
///
/// # Errors
///
/// - [`PipelineError::MissingColumn`] when the sheet has no `link` column.
/// - [`PipelineError::NoChannels`] when nothing resolves — fatal at tenant
///   scope.
/// - [`PipelineError::Sheets`] on read/write failures.
pub async fn resolve_channels<S: SheetStore>(
    ctx: &RunContext<'_, S>,
    audit: &AuditLog<'_, S>,
    tenant: &Candidate,
    spreadsheet_id: &str,
) -> Result<Vec<ChannelRecord>, PipelineError> {
    let sheet = &ctx.config.channels_sheet;
    let rows = ctx.store.read_all(spreadsheet_id, sheet).await?;

    let header = rows.first().cloned().unwrap_or_default();
    let link_col = header
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("link"))
        .ok_or_else(|| PipelineError::MissingColumn {
            sheet: sheet.clone(),
            column: "link",
        })?;

    let entries: Vec<String> = rows
        .iter()
        .skip(1)
        .filter_map(|row| row.get(link_col))
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
        .collect();

    let mut resolved = Vec::new();
    for entry in &entries {
        match ctx.analytics.channel_info(entry).await {
            Ok(info) => {
                resolved.push(ChannelRecord {
                    link: info.canonical_link(entry),
                    title: info.title,
                    id: info.id,
                    subscribers: info.participants_count,
                });
            }
            Err(e) => {
                audit
                    .record_or_warn(
                        tenant.id,
                        &tenant.name,
                        &format!("Канал «{entry}» пропущен: {e}"),
                    )
                    .await;
            }
        }
    }

    if resolved.is_empty() {
        return Err(PipelineError::NoChannels);
    }

    // Overwrite the sheet wholesale; no historical retention.
    ctx.store.clear(spreadsheet_id, sheet).await?;
    let mut grid: Vec<Vec<String>> =
        vec![CHANNELS_HEADER.iter().map(|h| (*h).to_string()).collect()];
    grid.extend(resolved.iter().map(ChannelRecord::to_row));
    ctx.store
        .update_rows(spreadsheet_id, sheet, 1, &grid)
        .await?;

    Ok(resolved)
}
