/*
 * Responsibility
 * - 認証/認可パイプラインが上位 (middleware / handler) に伝える失敗の分類
 * - store / provider の生エラーはここに来る前に正規化する (中身は漏らさない)
 */
use thiserror::Error;

/// Terminal failure of one request's auth pipeline.
///
/// None of these are retried inside the core. `ProviderUnavailable` and
/// `StoreUnavailable` are the only kinds a caller may retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing or malformed bearer token")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("identity provider unavailable")]
    ProviderUnavailable,

    #[error("user not found")]
    UserNotFound,

    #[error("channel not found")]
    ChannelNotFound,

    #[error("access denied")]
    AccessDenied,

    #[error("backing store unavailable")]
    StoreUnavailable,

    #[error("request cancelled")]
    Cancelled,
}

impl AuthError {
    /// Whether a caller may reasonably retry the whole request (with backoff).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable | Self::StoreUnavailable)
    }
}
