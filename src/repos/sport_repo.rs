/*
 * Responsibility
 * - sports テーブルの参照 (チャンネル = sport 1件)
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;
use crate::services::channels::{Sport, SportCatalog};

#[derive(Debug, FromRow)]
pub struct SportRow {
    #[sqlx(rename = "sportId")]
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct PgSportCatalog {
    pool: PgPool,
}

impl PgSportCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SportCatalog for PgSportCatalog {
    async fn sport_exists(&self, sport_id: i64) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM sports WHERE "sportId" = $1)
            "#,
        )
        .bind(sport_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_sports(&self) -> RepoResult<Vec<Sport>> {
        let rows = sqlx::query_as::<_, SportRow>(
            r#"
            SELECT "sportId", name
            FROM sports
            ORDER BY "sportId" ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Sport {
                id: r.id,
                name: r.name,
            })
            .collect())
    }
}
