/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: AuthPipeline, messages: MessageStore, shutdown: CancellationToken
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - リクエストをまたぐ可変状態は持たない
 */
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::services::auth::AuthPipeline;
use crate::services::messages::MessageStore;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthPipeline>,
    pub messages: Arc<dyn MessageStore>,
    /// Cancelled on shutdown; each request derives a child token from it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthPipeline>,
        messages: Arc<dyn MessageStore>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            auth,
            messages,
            shutdown,
        }
    }
}
