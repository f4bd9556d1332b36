/*
 * Responsibility
 * - GET /channels: general + sport チャンネル一覧
 * - GET /channels/{channel_id}/access: 認可判定をデータとして返す (deny でも 200)
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::v1::{
        dto::channels::{AccessResponse, ChannelResponse},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    middleware::auth::access::ChannelPath,
    services::channels::ChannelId,
    state::AppState,
};

pub async fn list_channels(
    State(state): State<AppState>,
    AuthCtxExtractor(_ctx): AuthCtxExtractor,
) -> Result<Json<Vec<ChannelResponse>>, AppError> {
    let channels = state.auth.evaluator().channels().list().await?;

    Ok(Json(channels.into_iter().map(ChannelResponse::from).collect()))
}

pub async fn channel_access(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(path): Path<ChannelPath>,
) -> Result<Json<AccessResponse>, AppError> {
    let channel = ChannelId::new(path.channel_id);
    let cancel = state.shutdown.child_token();

    let decision = state.auth.inspect(&ctx.user, &channel, &cancel).await?;

    Ok(Json(AccessResponse {
        channel_id: channel,
        allow: decision.allow,
        reason: decision.reason,
    }))
}
