/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - 認証済みリクエストのコンテキスト（AuthCtx / ChannelCtx）を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - AuthCtx, ChannelCtx
 * - AuthCtxExtractor, ChannelCtxExtractor
 */

mod core;
mod types;

pub use core::{AuthCtxExtractor, ChannelCtxExtractor};
pub use types::{AuthCtx, ChannelCtx};
