//! One-shot batch invocation.
//!
//! Wires the Sheets backend and the three provider clients into a
//! [`RunContext`] and hands control to the pipeline. `--dry-run` only reads
//! the control table and prints the tenants phase 1 would select.

use chanpulse_core::{AppConfig, Prompts};
use chanpulse_pipeline::{
    build_clients, run_batch, validate_row, ControlSchema, RunContext, SchedulerStatus,
};
use chanpulse_sheets::{GoogleSheets, SheetStore};

/// Run one batch (or preview it with `dry_run`).
///
/// # Errors
///
/// Returns an error when configuration, prompts, clients, or the control
/// table cannot be loaded. Per-tenant failures are contained inside the
/// pipeline and only counted in the printed report.
pub(crate) async fn run_once(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let store = GoogleSheets::with_base_url(
        &config.sheets_token,
        config.request_timeout_secs,
        &config.sheets_base_url,
    )?;

    if dry_run {
        return print_candidates(config, &store).await;
    }

    let prompts = Prompts::load(config)?;
    let (analytics, text_ai, video_ai) = build_clients(config)?;
    let ctx = RunContext {
        config,
        prompts: &prompts,
        store: &store,
        analytics: &analytics,
        text_ai: &text_ai,
        video_ai: &video_ai,
        today: chrono::Utc::now().date_naive(),
    };

    let report = run_batch(&ctx).await?;
    println!(
        "processed {} tenants: {} succeeded, {} failed, {} rejected in selection",
        report.selected, report.succeeded, report.failed, report.rejected
    );
    Ok(())
}

/// Phase-1 preview without any writes.
async fn print_candidates(config: &AppConfig, store: &GoogleSheets) -> anyhow::Result<()> {
    let rows = store
        .read_all(&config.control_spreadsheet_id, &config.control_sheet)
        .await?;
    let header = rows.first().cloned().unwrap_or_default();
    let schema = ControlSchema::from_header(&config.control_sheet, &header)?;

    let mut names: Vec<String> = Vec::new();
    for (idx, cells) in rows.iter().enumerate().skip(1) {
        let status = SchedulerStatus::parse(
            cells.get(schema.status).map(String::as_str).unwrap_or(""),
        );
        if !status.is_eligible() {
            continue;
        }
        match validate_row(schema, idx + 1, cells, status) {
            Ok(candidate) => names.push(format!("{} (id {})", candidate.name, candidate.id)),
            Err(defect) => println!("row {}: would be rejected — {defect:?}", idx + 1),
        }
    }

    println!(
        "dry-run: would process {} tenants: [{}]",
        names.len(),
        names.join(", ")
    );
    Ok(())
}
