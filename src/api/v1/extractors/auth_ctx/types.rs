/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が pipeline を通した結果を request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - token 検証 / user 解決 / channel 認可のロジックは services 側の責務
 * - グローバルな「現在のユーザー」は存在しない。リクエストごとに明示的に渡す
 */
use crate::services::auth::{Authorized, ChannelAccess, User};
use crate::services::auth::identity::Identity;

/// Attached to every request that reached `UserResolved`.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub identity: Identity,
    pub user: User,
}

/// Attached to channel-scoped requests whose access was evaluated and allowed.
#[derive(Debug, Clone)]
pub struct ChannelCtx {
    pub user: User,
    pub access: ChannelAccess,
}

impl AuthCtx {
    /// Split a pipeline result into the contexts handlers can ask for.
    pub fn from_authorized(authorized: Authorized) -> (Self, Option<ChannelCtx>) {
        let Authorized {
            identity,
            user,
            access,
        } = authorized;

        let channel = access.map(|access| ChannelCtx {
            user: user.clone(),
            access,
        });

        (Self { identity, user }, channel)
    }
}
