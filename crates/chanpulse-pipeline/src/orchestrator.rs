//! Tenant state machine and batch orchestration.
//!
//! Three strictly sequential phases over the control table:
//!
//! 1. **Selection** — validate status-eligible rows; good rows are marked
//!    waiting, defective ones are marked error and excluded.
//! 2. **Execution** — one tenant at a time: mark running, run the pipeline,
//!    then mark done (advancing `Start` → `In progress`) or error. A failed
//!    tenant never halts its siblings.
//! 3. **Cleanup** — done markers are wiped back to blank; error markers stay
//!    visible for the operator.
//!
//! Status only advances on success, so a crash mid-run leaves the tenant
//! selectable again: the next invocation reprocesses it from the beginning.

use chanpulse_sheets::{spreadsheet_id_from_url, SheetStore};

use crate::audit::AuditLog;
use crate::context::RunContext;
use crate::control::{
    validate_row, Candidate, ControlTable, Processing, SchedulerStatus,
};
use crate::enrich::enrich_rows;
use crate::error::{FailureKind, PipelineError};
use crate::ranker::{collect_ranked_rows, persist_rows};
use crate::resolver::resolve_channels;

/// Lookback window for a tenant still at `Start` (first full analysis).
const LOOKBACK_START_DAYS: i64 = 60;
/// Rolling window once a tenant is `In progress`.
const LOOKBACK_ROLLING_DAYS: i64 = 7;

/// Counters for one batch invocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunReport {
    /// Rows that passed phase-1 validation.
    pub selected: usize,
    /// Status-eligible rows rejected in phase 1.
    pub rejected: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Run the full batch over every eligible tenant in the control table.
///
/// # Errors
///
/// Returns [`PipelineError`] only for failures of the batch itself — an
/// unreadable control table or a broken schema. Per-tenant failures are
/// contained, audited, and counted in the report.
pub async fn run_batch<S: SheetStore>(
    ctx: &RunContext<'_, S>,
) -> Result<RunReport, PipelineError> {
    let audit = AuditLog::new(
        ctx.store,
        &ctx.config.control_spreadsheet_id,
        &ctx.config.log_sheet,
    );
    audit.ensure_header().await?;

    let (control, rows) = ControlTable::load(
        ctx.store,
        &ctx.config.control_spreadsheet_id,
        &ctx.config.control_sheet,
    )
    .await?;

    let mut report = RunReport::default();

    // Phase 1: selection.
    let mut candidates: Vec<Candidate> = Vec::new();
    for (idx, cells) in rows.iter().enumerate().skip(1) {
        let row_number = idx + 1;
        let status = SchedulerStatus::parse(
            cells
                .get(control.schema.status)
                .map(String::as_str)
                .unwrap_or(""),
        );
        if !status.is_eligible() {
            continue;
        }

        match validate_row(control.schema, row_number, cells, status) {
            Ok(candidate) => {
                control
                    .set_processing(row_number, Processing::Waiting)
                    .await?;
                candidates.push(candidate);
            }
            Err(defect) => {
                let name = cells
                    .get(control.schema.name)
                    .map(String::as_str)
                    .unwrap_or("");
                tracing::error!(row = row_number, defect = ?defect, "control row rejected");
                audit.record_or_warn(0, name, &defect.audit_message()).await;
                control.set_processing(row_number, Processing::Error).await?;
                report.rejected += 1;
            }
        }
    }
    report.selected = candidates.len();

    // Phase 2: strictly sequential execution.
    for tenant in &candidates {
        control
            .set_processing(tenant.row_number, Processing::Running)
            .await?;

        let lookback_days = match tenant.status {
            SchedulerStatus::Start => LOOKBACK_START_DAYS,
            _ => LOOKBACK_ROLLING_DAYS,
        };
        audit
            .record_or_warn(
                tenant.id,
                &tenant.name,
                &format!("Запуск анализа (окно {lookback_days} дн.)"),
            )
            .await;

        match process_tenant(ctx, &audit, tenant, lookback_days).await {
            Ok(row_count) => {
                if tenant.status == SchedulerStatus::Start {
                    control
                        .set_status(tenant.row_number, &SchedulerStatus::InProgress)
                        .await?;
                }
                control
                    .set_processing(tenant.row_number, Processing::Done)
                    .await?;
                audit
                    .record_or_warn(
                        tenant.id,
                        &tenant.name,
                        &format!("Анализ завершён: {row_count} постов"),
                    )
                    .await;
                report.succeeded += 1;
            }
            Err(e) => {
                let kind = FailureKind::classify(&e);
                let message = match kind {
                    FailureKind::NoChannels | FailureKind::NoPosts => {
                        kind.audit_message().to_string()
                    }
                    _ => format!("{}: {e}", kind.audit_message()),
                };
                tracing::error!(
                    tenant = %tenant.name,
                    kind = ?kind,
                    error = %e,
                    "tenant run failed"
                );
                audit.record_or_warn(tenant.id, &tenant.name, &message).await;
                control
                    .set_processing(tenant.row_number, Processing::Error)
                    .await?;
                report.failed += 1;
            }
        }
    }

    // Phase 3: cleanup. Done markers become blank; error markers stay.
    let rows = ctx
        .store
        .read_all(
            &ctx.config.control_spreadsheet_id,
            &ctx.config.control_sheet,
        )
        .await?;
    for (idx, cells) in rows.iter().enumerate().skip(1) {
        let row_number = idx + 1;
        let marker = Processing::parse(
            cells
                .get(control.schema.processing)
                .map(String::as_str)
                .unwrap_or(""),
        );
        if marker == Processing::Done {
            control.set_processing(row_number, Processing::Blank).await?;
        }
    }

    Ok(report)
}

/// Run the full pipeline for one tenant; returns the persisted row count.
async fn process_tenant<S: SheetStore>(
    ctx: &RunContext<'_, S>,
    audit: &AuditLog<'_, S>,
    tenant: &Candidate,
    lookback_days: i64,
) -> Result<usize, PipelineError> {
    let spreadsheet_id = spreadsheet_id_from_url(&tenant.url)?;

    let brand_context = load_brand_context(ctx, &spreadsheet_id).await?;

    let channels = resolve_channels(ctx, audit, tenant, &spreadsheet_id).await?;
    audit
        .record_or_warn(
            tenant.id,
            &tenant.name,
            &format!("Каналы обновлены: {}", channels.len()),
        )
        .await;

    let ranked = collect_ranked_rows(ctx, audit, tenant, &channels, lookback_days).await?;
    persist_rows(ctx, &spreadsheet_id, &ranked).await?;
    audit
        .record_or_warn(
            tenant.id,
            &tenant.name,
            &format!("Отобрано постов: {}", ranked.len()),
        )
        .await;

    enrich_rows(ctx, tenant, &spreadsheet_id, &brand_context, &ranked).await?;

    Ok(ranked.len())
}

/// Brand context lives in cell (1,1) of the profile sheet.
async fn load_brand_context<S: SheetStore>(
    ctx: &RunContext<'_, S>,
    spreadsheet_id: &str,
) -> Result<String, PipelineError> {
    let rows = ctx
        .store
        .read_all(spreadsheet_id, &ctx.config.profile_sheet)
        .await?;
    let context = rows
        .first()
        .and_then(|row| row.first())
        .map(|cell| cell.trim().to_string())
        .unwrap_or_default();
    if context.is_empty() {
        return Err(PipelineError::EmptyContext);
    }
    Ok(context)
}
