/*
 * Responsibility
 * - Messages の request/response DTO
 * - validation (形式チェック) は validate() に持たせる
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::channels::ChannelId;
use crate::services::messages::{MAX_CONTENT_CHARS, Message};

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub content: String,
}

impl CreateMessageRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.content.trim().is_empty() {
            return Err("content is required");
        }
        if self.content.chars().count() > MAX_CONTENT_CHARS {
            return Err("content must be <= 2000 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub channel_id: ChannelId,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            channel_id: m.channel_id,
            author_id: m.author_id,
            content: m.content,
            created_at: m.created_at,
        }
    }
}
