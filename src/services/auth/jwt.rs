use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::{error::Error as StdError, fmt};

use crate::services::auth::identity::{IdentityProvider, ProviderError, VerifiedToken};

/// Key material used to check identity-token signatures.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub enum IdentityKey {
    /// Asymmetric public key (PEM). Algorithm must be EdDSA, RS256 or ES256.
    PublicPem { algorithm: Algorithm, pem: String },
    /// HS256 shared secret.
    Hs256Secret(String),
}

impl fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicPem { algorithm, .. } => f
                .debug_struct("PublicPem")
                .field("algorithm", algorithm)
                .finish_non_exhaustive(),
            Self::Hs256Secret(_) => f.write_str("Hs256Secret(..)"),
        }
    }
}

#[derive(Debug)]
pub enum JwtSetupError {
    UnsupportedAlgorithm(Algorithm),
    InvalidKey(jsonwebtoken::errors::Error),
}

impl fmt::Display for JwtSetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedAlgorithm(alg) => write!(f, "unsupported identity jwt alg: {:?}", alg),
            Self::InvalidKey(e) => write!(f, "invalid identity jwt key: {}", e),
        }
    }
}

impl StdError for JwtSetupError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidKey(e) => Some(e),
            _ => None,
        }
    }
}

/// Identity token claims.
///
/// `iss`/`aud`/`exp`/`nbf` are checked by `jsonwebtoken::Validation`; `aud` is
/// left to the validator so both string and array forms are accepted.
#[derive(Debug, Clone, Deserialize)]
struct IdentityClaims {
    #[serde(default)]
    sub: String,
    exp: u64,
    #[serde(default)]
    email: Option<String>,
}

/// Verifies identity tokens locally against a configured key.
///
/// Local verification has no remote dependency, so it never reports
/// `ProviderError::Unavailable`.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtIdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("JwtIdentityProvider")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtIdentityProvider {
    pub fn new(
        key: &IdentityKey,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<Self, JwtSetupError> {
        let (algorithm, decoding_key) = match key {
            IdentityKey::PublicPem { algorithm, pem } => {
                let decoding_key = match algorithm {
                    Algorithm::EdDSA => DecodingKey::from_ed_pem(pem.as_bytes()),
                    Algorithm::RS256 => DecodingKey::from_rsa_pem(pem.as_bytes()),
                    Algorithm::ES256 => DecodingKey::from_ec_pem(pem.as_bytes()),
                    other => return Err(JwtSetupError::UnsupportedAlgorithm(*other)),
                }
                .map_err(JwtSetupError::InvalidKey)?;
                (*algorithm, decoding_key)
            }
            IdentityKey::Hs256Secret(secret) => {
                (Algorithm::HS256, DecodingKey::from_secret(secret.as_bytes()))
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.validate_nbf = true;
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
        })
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<VerifiedToken, ProviderError> {
        let data = jsonwebtoken::decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| ProviderError::Rejected(e.to_string()))?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(ProviderError::Rejected("empty 'sub' claim".into()));
        }

        Ok(VerifiedToken {
            subject_id: claims.sub,
            email: claims.email.filter(|e| !e.trim().is_empty()),
            expires_at: claims.exp,
        })
    }
}
