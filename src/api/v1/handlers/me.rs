/*
 * Responsibility
 * - GET /me ("who am I")
 * - user scope のみ (channel 認可は通らない)
 */
use axum::Json;

use crate::api::v1::{dto::me::MeResponse, extractors::AuthCtxExtractor};

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    let email = ctx.user.email.or(ctx.identity.email);

    Json(MeResponse {
        id: ctx.user.id,
        email,
        role: ctx.user.role,
    })
}
