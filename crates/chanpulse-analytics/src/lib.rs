//! Client for the channel analytics provider.
//!
//! Three read-only endpoints feed the pipeline: channel metadata, recent
//! posts for a date window, and per-post engagement counters. Every response
//! arrives in a `{"status": "ok"|"error", ...}` envelope; API-level errors
//! surface as [`AnalyticsError::ApiError`].

mod client;
mod error;
mod types;

pub use client::AnalyticsClient;
pub use error::AnalyticsError;
pub use types::{ChannelInfo, PostStats, RawMedia, RawPost};
