/*
 * Responsibility
 * - messages CRUD (一覧 / 投稿)
 * - channelId は TEXT ("0" = general も同じテーブルに入る)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;
use crate::services::channels::ChannelId;
use crate::services::messages::{Message, MessageStore};

#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    #[sqlx(rename = "messageId")]
    pub message_id: i64,

    #[sqlx(rename = "channelId")]
    pub channel_id: String,

    #[sqlx(rename = "userId")]
    pub user_id: String,

    pub content: String,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.message_id,
            channel_id: ChannelId::new(row.channel_id),
            author_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn list(&self, channel: &ChannelId, limit: i64) -> RepoResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT
                "messageId", "channelId", "userId", content, "createdAt"
            FROM messages
            WHERE "channelId" = $1
            ORDER BY "messageId" DESC
            LIMIT $2
            "#,
        )
        .bind(channel.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn create(
        &self,
        channel: &ChannelId,
        author_id: &str,
        content: &str,
    ) -> RepoResult<Message> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages ("channelId", "userId", content)
            VALUES ($1, $2, $3)
            RETURNING
                "messageId", "channelId", "userId", content, "createdAt"
            "#,
        )
        .bind(channel.as_str())
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
