//! Identity Provider seam.
//!
//! The provider owns signature/expiry validation. The core only sees a verified
//! subject or one of two failure kinds: a definitive rejection, or the provider
//! being unreachable.
use async_trait::async_trait;
use thiserror::Error;

/// Claims the provider vouches for after a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject_id: String,
    pub email: Option<String>,
    /// Unix seconds.
    pub expires_at: u64,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Expired, malformed, wrong signature, revoked... the token will never verify.
    #[error("token rejected: {0}")]
    Rejected(String),

    /// The provider could not be consulted (network, key fetch, etc.).
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<VerifiedToken, ProviderError>;
}

/// Verified identity for the lifetime of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: String,
    pub email: Option<String>,
    pub expires_at: u64,
}

impl From<VerifiedToken> for Identity {
    fn from(v: VerifiedToken) -> Self {
        Self {
            subject_id: v.subject_id,
            email: v.email,
            expires_at: v.expires_at,
        }
    }
}
