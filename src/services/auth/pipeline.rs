//! Per-request authentication/authorization pipeline.
//!
//! ```text
//! Start → TokenExtracted → IdentityVerified → UserResolved → (channel scope) AccessEvaluated → Authorized
//! ```
//!
//! Any failing step ends the run as `Rejection { stage, error }`, where `stage`
//! is the last stage that was reached. Steps are never re-entered or retried.
//! Every awaited step races the caller's cancellation token, so a cancelled run
//! always ends as `Cancelled`, never as a partial `Authorized`.
use std::future::Future;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::services::auth::access::{AccessDecision, AccessEvaluator};
use crate::services::auth::error::AuthError;
use crate::services::auth::identity::Identity;
use crate::services::auth::resolver::{IdentityResolver, User};
use crate::services::auth::verifier::{TokenVerifier, extract_bearer};
use crate::services::channels::ChannelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    TokenExtracted,
    IdentityVerified,
    UserResolved,
    AccessEvaluated,
}

/// How far a request must be authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Stop after `UserResolved` (e.g. "who am I").
    User,
    /// Access to the channel must be evaluated and allowed.
    Channel(ChannelId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAccess {
    pub channel: ChannelId,
    pub decision: AccessDecision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized {
    pub identity: Identity,
    pub user: User,
    /// Present iff the run was channel-scoped.
    pub access: Option<ChannelAccess>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rejected after {stage:?}: {error}")]
pub struct Rejection {
    pub stage: Stage,
    pub error: AuthError,
}

impl Rejection {
    fn new(stage: Stage, error: AuthError) -> Self {
        Self { stage, error }
    }
}

#[derive(Clone)]
pub struct AuthPipeline {
    verifier: TokenVerifier,
    resolver: IdentityResolver,
    evaluator: AccessEvaluator,
}

impl AuthPipeline {
    pub fn new(
        verifier: TokenVerifier,
        resolver: IdentityResolver,
        evaluator: AccessEvaluator,
    ) -> Self {
        Self {
            verifier,
            resolver,
            evaluator,
        }
    }

    pub fn evaluator(&self) -> &AccessEvaluator {
        &self.evaluator
    }

    #[tracing::instrument(name = "auth.pipeline", skip_all, fields(channel_scoped = matches!(scope, Scope::Channel(_))))]
    pub async fn run(
        &self,
        authorization: Option<&str>,
        scope: &Scope,
        cancel: &CancellationToken,
    ) -> Result<Authorized, Rejection> {
        if cancel.is_cancelled() {
            return Err(Rejection::new(Stage::Start, AuthError::Cancelled));
        }

        let token = extract_bearer(authorization).map_err(|e| Rejection::new(Stage::Start, e))?;

        let identity = guarded(cancel, Stage::TokenExtracted, self.verifier.verify(token)).await?;

        let user = guarded(
            cancel,
            Stage::IdentityVerified,
            self.resolver.resolve(&identity),
        )
        .await?;

        let access = match scope {
            Scope::User => None,
            Scope::Channel(channel) => {
                let decision = guarded(
                    cancel,
                    Stage::UserResolved,
                    self.evaluator.can_access(&user, channel),
                )
                .await?;

                if !decision.allow {
                    return Err(Rejection::new(
                        Stage::AccessEvaluated,
                        AuthError::AccessDenied,
                    ));
                }

                Some(ChannelAccess {
                    channel: channel.clone(),
                    decision,
                })
            }
        };

        Ok(Authorized {
            identity,
            user,
            access,
        })
    }

    /// Evaluate access for an already resolved user and return the decision as data,
    /// allow or deny. `ChannelNotFound` still comes back as an error.
    pub async fn inspect(
        &self,
        user: &User,
        channel: &ChannelId,
        cancel: &CancellationToken,
    ) -> Result<AccessDecision, AuthError> {
        guarded(cancel, Stage::UserResolved, self.evaluator.can_access(user, channel))
            .await
            .map_err(|rejection| rejection.error)
    }
}

/// Run one step unless the token fires first. `stage` is the stage reached before
/// the step started.
async fn guarded<T, F>(cancel: &CancellationToken, stage: Stage, step: F) -> Result<T, Rejection>
where
    F: Future<Output = Result<T, AuthError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Rejection::new(stage, AuthError::Cancelled)),
        res = step => res.map_err(|e| Rejection::new(stage, e)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::services::auth::access::{DecisionReason, SubscriptionStatus};
    use crate::services::auth::resolver::Role;
    use crate::services::channels::ChannelRegistry;
    use crate::services::testing::{
        FakeIdentityProvider, FakeSportCatalog, FakeSubscriptionStore, FakeUserDirectory,
    };

    struct Harness {
        pipeline: AuthPipeline,
        provider: Arc<FakeIdentityProvider>,
        directory: Arc<FakeUserDirectory>,
        catalog: Arc<FakeSportCatalog>,
        subscriptions: Arc<FakeSubscriptionStore>,
    }

    fn harness() -> Harness {
        let provider = Arc::new(
            FakeIdentityProvider::default()
                .with_token("fan-token", "fan", Some("fan@example.com"))
                .with_token("admin-token", "boss", None)
                .with_token("orphan-token", "orphan", None)
                .with_unavailable("flaky-token")
                .with_hanging("slow-token"),
        );
        let directory = Arc::new(
            FakeUserDirectory::default()
                .with_user("fan", Role::User)
                .with_user("boss", Role::Admin),
        );
        let catalog = Arc::new(FakeSportCatalog::with_sports(&[(7, "Football"), (9, "Rugby")]));
        let subscriptions = Arc::new(
            FakeSubscriptionStore::default()
                .with("fan", "7", SubscriptionStatus::Accepted)
                .with("fan", "9", SubscriptionStatus::Pending),
        );

        let pipeline = AuthPipeline::new(
            TokenVerifier::new(provider.clone()),
            IdentityResolver::new(directory.clone()),
            AccessEvaluator::new(ChannelRegistry::new(catalog.clone()), subscriptions.clone()),
        );

        Harness {
            pipeline,
            provider,
            directory,
            catalog,
            subscriptions,
        }
    }

    fn channel(id: &str) -> Scope {
        Scope::Channel(ChannelId::new(id))
    }

    #[tokio::test]
    async fn missing_header_rejected_at_start() {
        let h = harness();

        let rejection = h
            .pipeline
            .run(None, &Scope::User, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(rejection, Rejection::new(Stage::Start, AuthError::MissingToken));
        assert_eq!(h.provider.calls(), 0);
    }

    #[tokio::test]
    async fn invalid_token_never_reaches_identity_verified() {
        let h = harness();

        let rejection = h
            .pipeline
            .run(Some("Bearer forged"), &channel("7"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            rejection,
            Rejection::new(Stage::TokenExtracted, AuthError::InvalidToken)
        );
        assert_eq!(h.directory.calls(), 0);
    }

    #[tokio::test]
    async fn provider_outage_is_distinct_from_invalid_token() {
        let h = harness();

        let rejection = h
            .pipeline
            .run(Some("Bearer flaky-token"), &Scope::User, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(rejection.error, AuthError::ProviderUnavailable);
        assert!(rejection.error.is_retryable());
    }

    #[tokio::test]
    async fn unknown_subject_rejected_before_access_evaluation() {
        let h = harness();

        let rejection = h
            .pipeline
            .run(Some("Bearer orphan-token"), &channel("7"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            rejection,
            Rejection::new(Stage::IdentityVerified, AuthError::UserNotFound)
        );
        assert_eq!(h.catalog.exists_calls(), 0);
        assert_eq!(h.subscriptions.calls(), 0);
    }

    #[tokio::test]
    async fn user_scope_stops_after_user_resolved() {
        let h = harness();

        let authorized = h
            .pipeline
            .run(Some("Bearer fan-token"), &Scope::User, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(authorized.user.id, "fan");
        assert_eq!(authorized.identity.email.as_deref(), Some("fan@example.com"));
        assert!(authorized.access.is_none());
        assert_eq!(h.catalog.exists_calls(), 0);
        assert_eq!(h.subscriptions.calls(), 0);
    }

    #[tokio::test]
    async fn accepted_subscription_authorizes_channel() {
        let h = harness();

        let authorized = h
            .pipeline
            .run(Some("Bearer fan-token"), &channel("7"), &CancellationToken::new())
            .await
            .unwrap();

        let access = authorized.access.unwrap();
        assert_eq!(access.channel, ChannelId::new("7"));
        assert!(access.decision.allow);
        assert_eq!(access.decision.reason, DecisionReason::AcceptedSubscription);
        assert_eq!(access.decision.reason.as_str(), "accepted subscription");
    }

    #[tokio::test]
    async fn pending_subscription_is_access_denied() {
        let h = harness();

        let rejection = h
            .pipeline
            .run(Some("Bearer fan-token"), &channel("9"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            rejection,
            Rejection::new(Stage::AccessEvaluated, AuthError::AccessDenied)
        );
    }

    #[tokio::test]
    async fn unknown_channel_is_not_found_not_denied() {
        let h = harness();

        let rejection = h
            .pipeline
            .run(Some("Bearer fan-token"), &channel("404"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            rejection,
            Rejection::new(Stage::UserResolved, AuthError::ChannelNotFound)
        );
    }

    #[tokio::test]
    async fn admin_authorized_without_subscription_lookup() {
        let h = harness();

        let authorized = h
            .pipeline
            .run(Some("Bearer admin-token"), &channel("9"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            authorized.access.unwrap().decision.reason,
            DecisionReason::AdminOverride
        );
        assert_eq!(h.subscriptions.calls(), 0);
    }

    #[tokio::test]
    async fn general_channel_open_to_everyone_resolved() {
        let h = harness();

        let authorized = h
            .pipeline
            .run(Some("Bearer fan-token"), &channel("0"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            authorized.access.unwrap().decision.reason,
            DecisionReason::GeneralChannel
        );
    }

    #[tokio::test]
    async fn cancellation_during_verification_is_cancelled() {
        let h = harness();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let rejection = tokio::time::timeout(
            Duration::from_secs(5),
            h.pipeline.run(Some("Bearer slow-token"), &channel("7"), &cancel),
        )
        .await
        .expect("pipeline must abort promptly on cancellation")
        .unwrap_err();

        assert_eq!(
            rejection,
            Rejection::new(Stage::TokenExtracted, AuthError::Cancelled)
        );
        assert_eq!(h.provider.calls(), 1);
        assert_eq!(h.directory.calls(), 0);
    }

    #[tokio::test]
    async fn inspect_returns_denial_as_data() {
        let h = harness();
        let fan = crate::services::testing::user("fan", Role::User);

        let decision = h
            .pipeline
            .inspect(&fan, &ChannelId::new("9"), &CancellationToken::new())
            .await
            .unwrap();
        assert!(!decision.allow);
        assert_eq!(decision.reason, DecisionReason::NoAcceptedSubscription);

        assert_eq!(
            h.pipeline
                .inspect(&fan, &ChannelId::new("404"), &CancellationToken::new())
                .await,
            Err(AuthError::ChannelNotFound)
        );
    }

    #[tokio::test]
    async fn already_cancelled_does_no_work() {
        let h = harness();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let rejection = h
            .pipeline
            .run(Some("Bearer fan-token"), &channel("7"), &cancel)
            .await
            .unwrap_err();

        assert_eq!(rejection, Rejection::new(Stage::Start, AuthError::Cancelled));
        assert_eq!(h.provider.calls(), 0);
    }
}
