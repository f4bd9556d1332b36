/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - 上位 (services) は RepoError を AuthError などに正規化し、中身は外に出さない
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;
