//! Bearer extraction + delegation to the Identity Provider.
use std::sync::Arc;

use crate::services::auth::error::AuthError;
use crate::services::auth::identity::{Identity, IdentityProvider, ProviderError};

/// Pull the token out of an `Authorization` header value.
///
/// The value must be exactly two space-separated parts, the first being the
/// literal scheme `Bearer`.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let mut parts = header.ok_or(AuthError::MissingToken)?.split(' ');

    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MissingToken),
    }
}

#[derive(Clone)]
pub struct TokenVerifier {
    provider: Arc<dyn IdentityProvider>,
}

impl TokenVerifier {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// No retries here: a rejection is final for the request, and unavailability is
    /// surfaced separately so a higher layer can decide.
    pub async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        match self.provider.verify_token(token).await {
            Ok(verified) => Ok(verified.into()),
            Err(ProviderError::Rejected(reason)) => {
                tracing::warn!(reason = %reason, "identity token rejected");
                Err(AuthError::InvalidToken)
            }
            Err(ProviderError::Unavailable(reason)) => {
                tracing::error!(reason = %reason, "identity provider unavailable");
                Err(AuthError::ProviderUnavailable)
            }
        }
    }
}
