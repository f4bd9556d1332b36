//! Bearer token → identity → user → (channel scope) access decision.
//!
//! The middleware only drives `AuthPipeline` and hands the result to handlers via
//! request extensions (`AuthCtx`, `ChannelCtx`). Tokens and identity data are never
//! logged or stored anywhere else.

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};
use serde::Deserialize;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::Scope;
use crate::services::channels::ChannelId;
use crate::state::AppState;

/// Routes that only need a resolved user (evaluation stops at `UserResolved`).
///
/// 例：
/// ```ignore
/// let me = Router::new().route("/me", get(me));
/// let me = middleware::auth::access::require_user(me, state.clone());
/// ```
pub fn require_user(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, user_middleware))
}

/// Routes under `/channels/{channel_id}/...` that read or write channel content.
/// `route_layer` so the path parameter is already matched when the middleware runs.
pub fn require_channel(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, channel_middleware))
}

#[derive(Debug, Deserialize)]
pub struct ChannelPath {
    pub channel_id: String,
}

async fn user_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, Scope::User, req, next).await
}

async fn channel_middleware(
    State(state): State<AppState>,
    Path(path): Path<ChannelPath>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let scope = Scope::Channel(ChannelId::new(path.channel_id));
    authorize(&state, scope, req, next).await
}

async fn authorize(
    state: &AppState,
    scope: Scope,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Owned copy: the request body is not Sync, so no borrow of `req` may live across an await.
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    // Shutdown cancels every in-flight pipeline through this child.
    let cancel = state.shutdown.child_token();

    let authorized = match state
        .auth
        .run(authorization.as_deref(), &scope, &cancel)
        .await
    {
        Ok(authorized) => authorized,
        Err(rejection) => {
            tracing::warn!(
                stage = ?rejection.stage,
                error = %rejection.error,
                "request rejected by auth pipeline"
            );
            return Err(rejection.error.into());
        }
    };

    let (auth_ctx, channel_ctx) = AuthCtx::from_authorized(authorized);

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);
    if let Some(channel_ctx) = channel_ctx {
        req.extensions_mut().insert(channel_ctx);
    }

    Ok(next.run(req).await)
}
