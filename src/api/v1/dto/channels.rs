/*
 * Responsibility
 * - Channels の response DTO
 */
use serde::Serialize;

use crate::services::auth::DecisionReason;
use crate::services::channels::{Channel, ChannelId};

#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub id: ChannelId,
    pub name: String,
    pub general: bool,
}

impl From<Channel> for ChannelResponse {
    fn from(c: Channel) -> Self {
        Self {
            id: c.id,
            name: c.name,
            general: c.general,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub channel_id: ChannelId,
    pub allow: bool,
    pub reason: DecisionReason,
}
