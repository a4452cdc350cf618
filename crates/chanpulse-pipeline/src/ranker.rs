//! Engagement scoring, per-channel ranking, and base-row persistence.

use chrono::DateTime;

use crate::context::RunContext;
use crate::control::Candidate;
use crate::error::PipelineError;
use crate::resolver::ChannelRecord;
use crate::AuditLog;
use chanpulse_sheets::SheetStore;

/// Ranked posts kept per channel.
pub const TOP_POSTS_PER_CHANNEL: usize = 10;

/// Posts requested per channel from the analytics provider.
pub const POSTS_FETCH_LIMIT: u32 = 50;

/// Fixed base schema of the suggestions sheet.
pub const BASE_HEADER: [&str; 13] = [
    "Название канала",
    "Количество подписчиков",
    "Пост - Текст поста",
    "Ссылка на пост",
    "Ссылка на видео",
    "Дата публикации",
    "Время публикации",
    "Длина поста",
    "Количество просмотров",
    "Количество реакций",
    "Количество комментариев",
    "Количество пересылок",
    "Вовлечённость (%)",
];

/// One post that survived filtering, with its engagement computed.
#[derive(Debug, Clone)]
pub struct RankedPost {
    pub channel_title: String,
    pub subscribers: i64,
    pub text: String,
    pub link: String,
    pub video_link: Option<String>,
    pub date: String,
    pub time: String,
    pub views: i64,
    pub reactions: i64,
    pub comments: i64,
    pub forwards: i64,
    pub engagement: f64,
}

impl RankedPost {
    /// Render the 13 base columns in sheet order.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.channel_title.clone(),
            self.subscribers.to_string(),
            self.text.clone(),
            self.link.clone(),
            self.video_link.clone().unwrap_or_default(),
            self.date.clone(),
            self.time.clone(),
            self.text.chars().count().to_string(),
            self.views.to_string(),
            self.reactions.to_string(),
            self.comments.to_string(),
            self.forwards.to_string(),
            format!("{:.2}", self.engagement),
        ]
    }
}

/// Normalized interaction rate of a post, in percent.
///
/// `(reactions + forwards + comments) / views * 100`, rounded to two
/// decimals. Defined as `0` when there are no views, so the score is always
/// non-negative.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn engagement_score(views: i64, reactions: i64, comments: i64, forwards: i64) -> f64 {
    if views <= 0 {
        return 0.0;
    }
    let raw = (reactions + forwards + comments) as f64 / views as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Unix timestamp to `(DD.MM.YYYY, HH:MM)` in UTC; empty strings when the
/// timestamp does not parse.
#[must_use]
pub fn format_post_datetime(timestamp: i64) -> (String, String) {
    DateTime::from_timestamp(timestamp, 0).map_or_else(
        || (String::new(), String::new()),
        |dt| {
            (
                dt.format("%d.%m.%Y").to_string(),
                dt.format("%H:%M").to_string(),
            )
        },
    )
}

/// Sort by engagement descending and keep the top `top_n`.
///
/// The sort is stable: posts with equal scores keep their fetch order.
#[must_use]
pub fn rank_top(mut posts: Vec<RankedPost>, top_n: usize) -> Vec<RankedPost> {
    posts.sort_by(|a, b| {
        b.engagement
            .partial_cmp(&a.engagement)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    posts.truncate(top_n);
    posts
}

/// Fetch, filter, score, and rank posts for every resolved channel.
///
/// Channel-level failures (fetch error, empty window) are logged and skipped;
/// posts without text, permalink, or retrievable stats are discarded.
///
/// # Errors
///
/// Returns [`PipelineError::NoPosts`] when nothing survives across all
/// channels — fatal at tenant scope.
pub async fn collect_ranked_rows<S: SheetStore>(
    ctx: &RunContext<'_, S>,
    audit: &AuditLog<'_, S>,
    tenant: &Candidate,
    channels: &[ChannelRecord],
    lookback_days: i64,
) -> Result<Vec<RankedPost>, PipelineError> {
    let date_to = ctx.today;
    let date_from = ctx.today - chrono::Duration::days(lookback_days);

    let mut all_rows = Vec::new();
    for channel in channels {
        tracing::info!(tenant = %tenant.name, channel = %channel.title, "ranking channel posts");

        let posts = match ctx
            .analytics
            .channel_posts(channel.id, date_from, date_to, POSTS_FETCH_LIMIT)
            .await
        {
            Ok(posts) => posts,
            Err(e) => {
                audit
                    .record_or_warn(
                        tenant.id,
                        &tenant.name,
                        &format!(
                            "Канал «{}»: не удалось получить посты — {e}",
                            channel.title
                        ),
                    )
                    .await;
                continue;
            }
        };

        if posts.is_empty() {
            audit
                .record_or_warn(
                    tenant.id,
                    &tenant.name,
                    &format!("Канал «{}»: нет постов за период", channel.title),
                )
                .await;
            continue;
        }

        let mut channel_posts = Vec::new();
        for post in posts {
            let text = post.text.trim();
            if text.is_empty() || post.link.is_empty() {
                continue;
            }

            let stats = match ctx.analytics.post_stats(&post.link).await {
                Ok(stats) => stats,
                Err(e) => {
                    tracing::debug!(post = %post.link, error = %e, "stats unavailable, discarding post");
                    continue;
                }
            };

            let engagement =
                engagement_score(stats.views, stats.reactions, stats.comments, stats.forwards);
            let (date, time) = format_post_datetime(post.date);

            channel_posts.push(RankedPost {
                channel_title: channel.title.clone(),
                subscribers: channel.subscribers,
                text: text.to_string(),
                link: post.link.clone(),
                video_link: post.video_link().map(str::to_string),
                date,
                time,
                views: stats.views,
                reactions: stats.reactions,
                comments: stats.comments,
                forwards: stats.forwards,
                engagement,
            });
        }

        all_rows.extend(rank_top(channel_posts, TOP_POSTS_PER_CHANNEL));
    }

    if all_rows.is_empty() {
        return Err(PipelineError::NoPosts);
    }
    Ok(all_rows)
}

/// Overwrite the suggestions sheet with the base header and ranked rows.
///
/// # Errors
///
/// Propagates any [`PipelineError::Sheets`] failure from the writes.
pub async fn persist_rows<S: SheetStore>(
    ctx: &RunContext<'_, S>,
    spreadsheet_id: &str,
    rows: &[RankedPost],
) -> Result<(), PipelineError> {
    let sheet = &ctx.config.suggestions_sheet;
    ctx.store.clear(spreadsheet_id, sheet).await?;

    let mut grid: Vec<Vec<String>> = vec![BASE_HEADER.iter().map(|h| (*h).to_string()).collect()];
    grid.extend(rows.iter().map(RankedPost::to_row));
    ctx.store
        .update_rows(spreadsheet_id, sheet, 1, &grid)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(link: &str, engagement: f64) -> RankedPost {
        RankedPost {
            channel_title: "Канал".to_string(),
            subscribers: 1000,
            text: format!("пост {link}"),
            link: link.to_string(),
            video_link: None,
            date: "01.06.2025".to_string(),
            time: "12:00".to_string(),
            views: 100,
            reactions: 1,
            comments: 1,
            forwards: 1,
            engagement,
        }
    }

    #[test]
    fn engagement_is_zero_without_views() {
        assert_eq!(engagement_score(0, 10, 5, 5), 0.0);
        assert_eq!(engagement_score(0, 9999, 9999, 9999), 0.0);
    }

    #[test]
    fn engagement_formula_matches_definition() {
        assert_eq!(engagement_score(100, 10, 5, 5), 20.0);
        assert_eq!(engagement_score(1000, 10, 5, 5), 2.0);
    }

    #[test]
    fn engagement_rounds_to_two_decimals() {
        // 1/3 * 100 = 33.3333... → 33.33
        assert_eq!(engagement_score(300, 100, 0, 0), 33.33);
        // 2/3 * 100 = 66.6666... → 66.67
        assert_eq!(engagement_score(300, 200, 0, 0), 66.67);
    }

    #[test]
    fn engagement_is_never_negative() {
        assert!(engagement_score(50, 0, 0, 0) >= 0.0);
        assert!(engagement_score(0, 0, 0, 0) >= 0.0);
    }

    #[test]
    fn rank_top_sorts_descending_and_truncates() {
        let posts: Vec<RankedPost> = (0..15)
            .map(|i| post(&format!("p{i}"), f64::from(i)))
            .collect();
        let ranked = rank_top(posts, TOP_POSTS_PER_CHANNEL);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].engagement, 14.0);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].engagement >= w[1].engagement));
    }

    #[test]
    fn rank_top_keeps_fetch_order_for_equal_scores() {
        let posts = vec![post("first", 5.0), post("second", 5.0), post("third", 5.0)];
        let ranked = rank_top(posts, 10);
        assert_eq!(ranked[0].link, "first");
        assert_eq!(ranked[1].link, "second");
        assert_eq!(ranked[2].link, "third");
    }

    #[test]
    fn format_post_datetime_renders_utc() {
        // 2025-06-15 08:30:00 UTC
        let (date, time) = format_post_datetime(1_749_976_200);
        assert_eq!(date, "15.06.2025");
        assert_eq!(time, "08:30");
    }

    #[test]
    fn format_post_datetime_handles_invalid_timestamp() {
        let (date, time) = format_post_datetime(i64::MAX);
        assert_eq!(date, "");
        assert_eq!(time, "");
    }

    #[test]
    fn to_row_has_thirteen_columns_in_schema_order() {
        let row = post("https://t.me/farm/1", 3.0).to_row();
        assert_eq!(row.len(), BASE_HEADER.len());
        assert_eq!(row[0], "Канал");
        assert_eq!(row[3], "https://t.me/farm/1");
        assert_eq!(row[12], "3.00");
    }

    #[test]
    fn to_row_counts_characters_not_bytes() {
        let mut p = post("x", 0.0);
        p.text = "привет".to_string();
        assert_eq!(p.to_row()[7], "6");
    }
}
