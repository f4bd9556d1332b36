/*
 * Responsibility
 * - 外部 store (Postgres) の実装を束ねる
 * - trait 自体は services 側に置き、ここは実装だけ
 */
pub mod error;
pub mod message_repo;
pub mod sport_repo;
pub mod subscription_repo;
pub mod user_repo;
