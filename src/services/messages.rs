/*
 * Responsibility
 * - チャンネルメッセージの読み書き (Message Store の窓口)
 * - 呼び出し前に AccessEvaluated を通過していることが前提 (handler 側で保証)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::repos::error::RepoResult;
use crate::services::channels::ChannelId;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;
pub const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub channel_id: ChannelId,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Newest first.
    async fn list(&self, channel: &ChannelId, limit: i64) -> RepoResult<Vec<Message>>;

    async fn create(
        &self,
        channel: &ChannelId,
        author_id: &str,
        content: &str,
    ) -> RepoResult<Message>;
}

/// Clamp a client-supplied page size into `1..=MAX_PAGE_SIZE`.
pub fn page_size(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE)
}
