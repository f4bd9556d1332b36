/*
 * Responsibility
 * - subscriptions テーブルの参照 (userId, sportId, status)
 * - 承認/却下などの書き込みはこの crate の責務外
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;
use crate::services::auth::access::{Subscription, SubscriptionStatus, SubscriptionStore};
use crate::services::channels::ChannelId;

#[derive(Debug, FromRow)]
pub struct SubscriptionRow {
    #[sqlx(rename = "userId")]
    pub user_id: String,
    #[sqlx(rename = "sportId")]
    pub sport_id: i64,
    pub status: String,
}

#[derive(Clone, Debug)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn find_subscription(
        &self,
        user_id: &str,
        channel: &ChannelId,
    ) -> RepoResult<Option<Subscription>> {
        // The general channel and non-numeric ids have no subscription rows.
        let Some(sport_id) = channel.sport_id() else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT "userId", "sportId", status
            FROM subscriptions
            WHERE "userId" = $1 AND "sportId" = $2
            "#,
        )
        .bind(user_id)
        .bind(sport_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| {
            let status = SubscriptionStatus::from_db(&r.status);
            if status.is_none() {
                tracing::warn!(status = %r.status, "unknown subscription status");
            }
            Subscription {
                user_id: r.user_id,
                channel_id: ChannelId::from(r.sport_id),
                status,
            }
        }))
    }
}
