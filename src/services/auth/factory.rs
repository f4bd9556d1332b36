/// Factory: build `AuthPipeline` from application `Config` and the Postgres-backed stores.
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppError;
use crate::repos::{sport_repo::PgSportCatalog, subscription_repo::PgSubscriptionStore, user_repo::PgUserDirectory};
use crate::services::auth::{
    AccessEvaluator, AuthPipeline, jwt::JwtIdentityProvider, resolver::IdentityResolver,
    verifier::TokenVerifier,
};
use crate::services::channels::ChannelRegistry;

pub fn build_auth_pipeline(config: &Config, db: &PgPool) -> Result<Arc<AuthPipeline>, AppError> {
    let provider = JwtIdentityProvider::new(
        &config.identity_key,
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
    )
    .map_err(|e| {
        tracing::error!(error = %e, "failed to build identity token verifier");
        AppError::Internal
    })?;

    let channels = ChannelRegistry::new(Arc::new(PgSportCatalog::new(db.clone())));

    let pipeline = AuthPipeline::new(
        TokenVerifier::new(Arc::new(provider)),
        IdentityResolver::new(Arc::new(PgUserDirectory::new(db.clone()))),
        AccessEvaluator::new(channels, Arc::new(PgSubscriptionStore::new(db.clone()))),
    );

    Ok(Arc::new(pipeline))
}
