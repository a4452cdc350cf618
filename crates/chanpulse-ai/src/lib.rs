//! Generative-AI clients used by the enrichment stage.
//!
//! Two providers: a chat-completions text service (analysis, rewriting,
//! translation, video briefs) and a video-intelligence service (indexing
//! tasks polled to a terminal state, then prompt-guided summaries).

mod analysis;
mod error;
pub mod prompts;
mod text;
mod video;

pub use analysis::{extract_json, PostAnalysis};
pub use error::AiError;
pub use text::TextClient;
pub use video::{index_name_for, PollPolicy, TaskState, VideoClient};
