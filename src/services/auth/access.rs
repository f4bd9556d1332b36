//! Channel access evaluation.
//!
//! Rules are an ordered list evaluated first-match-wins:
//!
//! 1. `GeneralChannel`       → allow ("general channel")
//! 2. `ChannelExists`        → unknown channel is `ChannelNotFound`, not a denial
//! 3. `AdminOverride`        → allow ("admin override"), no subscription lookup
//! 4. `AcceptedSubscription` → allow ("accepted subscription") or deny
//!    ("no accepted subscription")
//!
//! Pending, rejected and absent subscriptions produce the same decision; only the
//! debug log tells them apart.
use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;

use crate::repos::error::RepoResult;
use crate::services::auth::error::AuthError;
use crate::services::auth::resolver::User;
use crate::services::channels::{ChannelId, ChannelRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl SubscriptionStatus {
    /// Unknown values are `None`; callers treat them as not accepted.
    pub fn from_db(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub user_id: String,
    pub channel_id: ChannelId,
    pub status: Option<SubscriptionStatus>,
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find_subscription(
        &self,
        user_id: &str,
        channel: &ChannelId,
    ) -> RepoResult<Option<Subscription>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecisionReason {
    #[serde(rename = "general channel")]
    GeneralChannel,
    #[serde(rename = "admin override")]
    AdminOverride,
    #[serde(rename = "accepted subscription")]
    AcceptedSubscription,
    #[serde(rename = "no accepted subscription")]
    NoAcceptedSubscription,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneralChannel => "general channel",
            Self::AdminOverride => "admin override",
            Self::AcceptedSubscription => "accepted subscription",
            Self::NoAcceptedSubscription => "no accepted subscription",
        }
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computed per request, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub allow: bool,
    pub reason: DecisionReason,
}

impl AccessDecision {
    pub fn allow(reason: DecisionReason) -> Self {
        Self {
            allow: true,
            reason,
        }
    }

    pub fn deny(reason: DecisionReason) -> Self {
        Self {
            allow: false,
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    GeneralChannel,
    ChannelExists,
    AdminOverride,
    AcceptedSubscription,
}

/// Evaluation order. The admin override must stay ahead of the subscription lookup.
pub const ACCESS_RULES: [AccessRule; 4] = [
    AccessRule::GeneralChannel,
    AccessRule::ChannelExists,
    AccessRule::AdminOverride,
    AccessRule::AcceptedSubscription,
];

enum RuleOutcome {
    Next,
    Decided(AccessDecision),
}

#[derive(Clone)]
pub struct AccessEvaluator {
    channels: ChannelRegistry,
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl AccessEvaluator {
    pub fn new(channels: ChannelRegistry, subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        Self {
            channels,
            subscriptions,
        }
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    /// `Ok(decision)` for an allow/deny answer; `Err(ChannelNotFound)` when the
    /// channel does not exist at all.
    pub async fn can_access(
        &self,
        user: &User,
        channel: &ChannelId,
    ) -> Result<AccessDecision, AuthError> {
        for rule in ACCESS_RULES {
            if let RuleOutcome::Decided(decision) = self.apply(rule, user, channel).await? {
                tracing::debug!(
                    channel = %channel,
                    rule = ?rule,
                    allow = decision.allow,
                    reason = %decision.reason,
                    "channel access evaluated"
                );
                return Ok(decision);
            }
        }

        // AcceptedSubscription always decides; kept for completeness of the rule list.
        Ok(AccessDecision::deny(DecisionReason::NoAcceptedSubscription))
    }

    async fn apply(
        &self,
        rule: AccessRule,
        user: &User,
        channel: &ChannelId,
    ) -> Result<RuleOutcome, AuthError> {
        match rule {
            AccessRule::GeneralChannel => Ok(if self.channels.is_general(channel) {
                RuleOutcome::Decided(AccessDecision::allow(DecisionReason::GeneralChannel))
            } else {
                RuleOutcome::Next
            }),
            AccessRule::ChannelExists => {
                self.channels.ensure_exists(channel).await?;
                Ok(RuleOutcome::Next)
            }
            AccessRule::AdminOverride => Ok(if user.role.is_admin() {
                RuleOutcome::Decided(AccessDecision::allow(DecisionReason::AdminOverride))
            } else {
                RuleOutcome::Next
            }),
            AccessRule::AcceptedSubscription => {
                let subscription = self
                    .subscriptions
                    .find_subscription(&user.id, channel)
                    .await
                    .map_err(|err| {
                        tracing::error!(error = %err, "subscription lookup failed");
                        AuthError::StoreUnavailable
                    })?;

                match subscription {
                    Some(s) if s.status == Some(SubscriptionStatus::Accepted) => {
                        return Ok(RuleOutcome::Decided(AccessDecision::allow(
                            DecisionReason::AcceptedSubscription,
                        )));
                    }
                    // pending / rejected / unknown
                    Some(s) => tracing::debug!(
                        user_id = %s.user_id,
                        channel = %s.channel_id,
                        subscription = ?s.status,
                        "subscription not accepted"
                    ),
                    None => tracing::debug!(
                        user_id = %user.id,
                        channel = %channel,
                        "no subscription"
                    ),
                }

                Ok(RuleOutcome::Decided(AccessDecision::deny(
                    DecisionReason::NoAcceptedSubscription,
                )))
            }
        }
    }
}
