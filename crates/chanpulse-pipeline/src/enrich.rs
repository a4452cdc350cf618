//! AI enrichment of persisted suggestion rows.
//!
//! Each row gets, in order: a structured analysis, a brand-context rewrite,
//! and (when a video is attached) an indexing-and-summary flow turned into a
//! production brief. Analysis, rewrite, and video failures are contained at
//! row granularity and leave their columns blank; provider quota/auth
//! failures abort the tenant instead.

use chanpulse_ai::{prompts, AiError, PollPolicy, PostAnalysis};
use chanpulse_sheets::SheetStore;

use crate::context::RunContext;
use crate::control::Candidate;
use crate::error::{ai_error_is_tenant_fatal, PipelineError};
use crate::ranker::{RankedPost, BASE_HEADER};

/// Enrichment columns appended after the 13 base columns.
pub const ENRICHMENT_HEADER: [&str; 13] = [
    "Предложение по посту",
    "Предложение по видео",
    "Тема поста",
    "Формат",
    "Стиль",
    "CTA",
    "Заголовок",
    "Длина заголовка",
    "Научный факт/исследование",
    "Конкретная польза",
    "Призыв комментировать",
    "Инсайт/заметка",
    "Фильтр",
];

const BASE_COLS: usize = BASE_HEADER.len();

const COL_REWRITE: usize = BASE_COLS;
const COL_VIDEO: usize = BASE_COLS + 1;
const COL_TEMA: usize = BASE_COLS + 2;

const ANALYSIS_TEMPERATURE: f32 = 0.4;
const REWRITE_TEMPERATURE: f32 = 0.8;
const TRANSLATE_TEMPERATURE: f32 = 0.8;
const BRIEF_TEMPERATURE: f32 = 0.7;

/// Run the enrichment stage over all persisted rows.
///
/// Extends the header with the enrichment columns, grows the sheet to fit,
/// processes every row sequentially, and rewrites the whole block in one
/// bulk update.
///
/// # Errors
///
/// Returns [`PipelineError`] on sheet failures or tenant-fatal provider
/// errors (quota, auth, permission). Row-scoped AI failures never surface
/// here.
pub async fn enrich_rows<S: SheetStore>(
    ctx: &RunContext<'_, S>,
    tenant: &Candidate,
    spreadsheet_id: &str,
    brand_context: &str,
    rows: &[RankedPost],
) -> Result<(), PipelineError> {
    let sheet = &ctx.config.suggestions_sheet;

    let full_header: Vec<String> = BASE_HEADER
        .iter()
        .chain(ENRICHMENT_HEADER.iter())
        .map(|h| (*h).to_string())
        .collect();
    ctx.store
        .ensure_columns(spreadsheet_id, sheet, full_header.len())
        .await?;
    ctx.store
        .update_rows(spreadsheet_id, sheet, 1, &[full_header.clone()])
        .await?;

    let poll = PollPolicy::new(ctx.config.poll_interval_secs, ctx.config.poll_max_attempts);

    let mut enhanced: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for (idx, post) in rows.iter().enumerate() {
        let row_number = idx + 2;
        tracing::info!(tenant = %tenant.name, row = row_number, "enriching row");

        let mut row = post.to_row();
        row.resize(full_header.len(), String::new());

        match analyze_post(ctx, &post.text).await {
            Ok(analysis) => fill_analysis(&mut row, &analysis),
            Err(e) if ai_error_is_tenant_fatal(&e) => return Err(e.into()),
            Err(e) => {
                tracing::warn!(
                    row = row_number,
                    error = %e,
                    "post analysis failed, leaving analysis columns blank"
                );
            }
        }

        match rewrite_post(ctx, brand_context, &post.text).await {
            Ok(rewritten) => row[COL_REWRITE] = rewritten,
            Err(e) if ai_error_is_tenant_fatal(&e) => return Err(e.into()),
            Err(e) => {
                tracing::warn!(
                    row = row_number,
                    error = %e,
                    "post rewrite failed, leaving suggestion column blank"
                );
            }
        }

        if let Some(video_url) = post.video_link.as_deref() {
            match suggest_video(ctx, brand_context, video_url, poll).await {
                Ok(brief) => row[COL_VIDEO] = brief,
                Err(e) if ai_error_is_tenant_fatal(&e) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(
                        row = row_number,
                        error = %e,
                        "video enrichment failed, leaving video column blank"
                    );
                }
            }
        }

        enhanced.push(row);
    }

    ctx.store
        .update_rows(spreadsheet_id, sheet, 2, &enhanced)
        .await?;
    Ok(())
}

/// Structured analysis: fixed system role, JSON-dictating instruction.
async fn analyze_post<S: SheetStore>(
    ctx: &RunContext<'_, S>,
    post_text: &str,
) -> Result<PostAnalysis, AiError> {
    let reply = ctx
        .text_ai
        .complete(
            &ctx.config.text_model,
            &ctx.prompts.text_system_role,
            &prompts::analysis(post_text),
            ANALYSIS_TEMPERATURE,
        )
        .await?;
    chanpulse_ai::extract_json(&reply)
}

/// Brand-context rewrite bounded to the prompt's character limit.
async fn rewrite_post<S: SheetStore>(
    ctx: &RunContext<'_, S>,
    brand_context: &str,
    post_text: &str,
) -> Result<String, AiError> {
    ctx.text_ai
        .complete(
            &ctx.config.text_model,
            &ctx.prompts.text_system_role,
            &prompts::rewrite(brand_context, post_text),
            REWRITE_TEMPERATURE,
        )
        .await
}

/// Video flow: index + poll + summarize, translate to Russian, then turn the
/// transcription into a production brief.
async fn suggest_video<S: SheetStore>(
    ctx: &RunContext<'_, S>,
    brand_context: &str,
    video_url: &str,
    poll: PollPolicy,
) -> Result<String, AiError> {
    let summary = ctx
        .video_ai
        .summarize_url(video_url, &ctx.prompts.video_summary, poll)
        .await?;

    let translated = ctx
        .text_ai
        .complete(
            &ctx.config.translate_model,
            &ctx.prompts.text_system_role,
            &prompts::translate(&summary),
            TRANSLATE_TEMPERATURE,
        )
        .await?;

    ctx.text_ai
        .complete(
            &ctx.config.text_model,
            prompts::VIDEO_BRIEF_ROLE,
            &prompts::video_brief(brand_context, &translated),
            BRIEF_TEMPERATURE,
        )
        .await
}

fn fill_analysis(row: &mut [String], analysis: &PostAnalysis) {
    let fields = [
        &analysis.tema,
        &analysis.format,
        &analysis.style,
        &analysis.cta,
        &analysis.zagolovok_5_slov,
        &analysis.zagolovok_len,
        &analysis.fact,
        &analysis.benefit,
        &analysis.comment_call,
        &analysis.insight,
        &analysis.filter,
    ];
    for (offset, value) in fields.into_iter().enumerate() {
        row[COL_TEMA + offset] = value.clone();
    }
}
