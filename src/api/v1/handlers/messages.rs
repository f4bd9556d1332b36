/*
 * Responsibility
 * - /channels/{channel_id}/messages の読み書き
 * - ChannelCtx は middleware が AccessEvaluated (allow) を通した後にしか存在しない
 *   → ここに来た時点で Message Store に触ってよい
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::messages::{CreateMessageRequest, ListMessagesQuery, MessageResponse},
        extractors::ChannelCtxExtractor,
    },
    error::AppError,
    services::messages::page_size,
    state::AppState,
};

pub async fn list_messages(
    State(state): State<AppState>,
    ChannelCtxExtractor(ctx): ChannelCtxExtractor,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let rows = state
        .messages
        .list(&ctx.access.channel, page_size(query.limit))
        .await?;

    Ok(Json(rows.into_iter().map(MessageResponse::from).collect()))
}

pub async fn post_message(
    State(state): State<AppState>,
    ChannelCtxExtractor(ctx): ChannelCtxExtractor,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_MESSAGE", msg))?;

    let message = state
        .messages
        .create(&ctx.access.channel, &ctx.user.id, req.content.trim())
        .await?;

    tracing::debug!(
        channel = %ctx.access.channel,
        reason = %ctx.access.decision.reason,
        message_id = message.id,
        "message posted"
    );

    Ok((StatusCode::CREATED, Json(message.into())))
}
