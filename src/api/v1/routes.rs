/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証の範囲をここで決める
 *   - user scope:    /me, /channels, /channels/{channel_id}/access
 *   - channel scope: /channels/{channel_id}/messages (読み書きとも AccessEvaluated 必須)
 */
use axum::{Router, routing::get};

use crate::middleware::auth::access::{require_channel, require_user};
use crate::state::AppState;

use crate::api::v1::handlers::{
    channels::{channel_access, list_channels},
    me::me,
    messages::{list_messages, post_message},
};

pub fn routes(state: AppState) -> Router<AppState> {
    let user_scoped = Router::new()
        .route("/me", get(me))
        .route("/channels", get(list_channels))
        .route("/channels/{channel_id}/access", get(channel_access));

    let channel_scoped = Router::new().route(
        "/channels/{channel_id}/messages",
        get(list_messages).post(post_message),
    );

    Router::new()
        .merge(require_user(user_scoped, state.clone()))
        .merge(require_channel(channel_scoped, state))
}
