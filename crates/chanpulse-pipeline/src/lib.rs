//! Batch pipeline: control-table selection, channel resolution, engagement
//! ranking, AI enrichment, and audit logging.
//!
//! Failure isolation is layered: posts without stats are discarded, failing
//! channels are skipped, failing tenants are marked and passed over, and
//! row-scoped AI failures leave blank cells. Only an unreadable control
//! table aborts the batch itself.

mod audit;
mod context;
mod control;
mod enrich;
mod error;
mod orchestrator;
mod ranker;
mod resolver;

pub use audit::AuditLog;
pub use context::{build_clients, RunContext};
pub use control::{
    validate_row, Candidate, ControlSchema, ControlTable, Processing, RowDefect, SchedulerStatus,
};
pub use enrich::{enrich_rows, ENRICHMENT_HEADER};
pub use error::{ai_error_is_tenant_fatal, FailureKind, PipelineError};
pub use orchestrator::{run_batch, RunReport};
pub use ranker::{
    collect_ranked_rows, engagement_score, format_post_datetime, persist_rows, rank_top,
    RankedPost, BASE_HEADER, POSTS_FETCH_LIMIT, TOP_POSTS_PER_CHANNEL,
};
pub use resolver::{resolve_channels, ChannelRecord, CHANNELS_HEADER};
